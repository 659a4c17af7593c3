use async_graphql::{Enum, InputObject, SimpleObject, ID};

use infra::models::CompetitionParticipantRow;
use infra::repos::ParticipantRole as DbRole;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ParticipantRole {
    #[default]
    Player,
    Captain,
    ViceCaptain,
    Coach,
    Manager,
}

impl From<DbRole> for ParticipantRole {
    fn from(r: DbRole) -> Self {
        match r {
            DbRole::Player => ParticipantRole::Player,
            DbRole::Captain => ParticipantRole::Captain,
            DbRole::ViceCaptain => ParticipantRole::ViceCaptain,
            DbRole::Coach => ParticipantRole::Coach,
            DbRole::Manager => ParticipantRole::Manager,
        }
    }
}

impl From<ParticipantRole> for DbRole {
    fn from(r: ParticipantRole) -> Self {
        match r {
            ParticipantRole::Player => DbRole::Player,
            ParticipantRole::Captain => DbRole::Captain,
            ParticipantRole::ViceCaptain => DbRole::ViceCaptain,
            ParticipantRole::Coach => DbRole::Coach,
            ParticipantRole::Manager => DbRole::Manager,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct CompetitionParticipant {
    pub id: ID,
    pub competition_id: ID,
    pub team_id: ID,
    pub member_id: ID,
    pub display_name: String,
    pub role: ParticipantRole,
    pub shirt_number: Option<i32>,
    pub appearances: i32,
    pub goals: i32,
    pub assists: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
}

impl From<CompetitionParticipantRow> for CompetitionParticipant {
    fn from(row: CompetitionParticipantRow) -> Self {
        Self {
            id: row.id.into(),
            competition_id: row.competition_id.into(),
            team_id: row.team_id.into(),
            member_id: row.member_id.into(),
            display_name: row.display_name,
            role: row.role.into(),
            shirt_number: row.shirt_number,
            appearances: row.appearances,
            goals: row.goals,
            assists: row.assists,
            yellow_cards: row.yellow_cards,
            red_cards: row.red_cards,
        }
    }
}

#[derive(InputObject)]
pub struct AddParticipantInput {
    pub team_id: ID,
    pub member_id: ID,
    #[graphql(default)]
    pub role: ParticipantRole,
    pub shirt_number: Option<i32>,
    /// Defaults to the member's name.
    pub display_name: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateParticipantInput {
    pub role: Option<ParticipantRole>,
    pub shirt_number: Option<i32>,
    pub display_name: Option<String>,
}
