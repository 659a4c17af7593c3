use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use infra::models::CompetitionTeamRow;
use infra::repos::TeamStatus as DbStatus;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum TeamStatus {
    Registered,
    Confirmed,
    Withdrawn,
    Disqualified,
    Eliminated,
    Active,
    Champion,
    RunnerUp,
}

impl From<DbStatus> for TeamStatus {
    fn from(s: DbStatus) -> Self {
        match s {
            DbStatus::Registered => TeamStatus::Registered,
            DbStatus::Confirmed => TeamStatus::Confirmed,
            DbStatus::Withdrawn => TeamStatus::Withdrawn,
            DbStatus::Disqualified => TeamStatus::Disqualified,
            DbStatus::Eliminated => TeamStatus::Eliminated,
            DbStatus::Active => TeamStatus::Active,
            DbStatus::Champion => TeamStatus::Champion,
            DbStatus::RunnerUp => TeamStatus::RunnerUp,
        }
    }
}

impl From<TeamStatus> for DbStatus {
    fn from(s: TeamStatus) -> Self {
        match s {
            TeamStatus::Registered => DbStatus::Registered,
            TeamStatus::Confirmed => DbStatus::Confirmed,
            TeamStatus::Withdrawn => DbStatus::Withdrawn,
            TeamStatus::Disqualified => DbStatus::Disqualified,
            TeamStatus::Eliminated => DbStatus::Eliminated,
            TeamStatus::Active => DbStatus::Active,
            TeamStatus::Champion => DbStatus::Champion,
            TeamStatus::RunnerUp => DbStatus::RunnerUp,
        }
    }
}

/// A team entered in a competition. The stat columns are the cached
/// aggregates written by the last standings recalculation.
#[derive(SimpleObject, Clone)]
pub struct CompetitionTeam {
    pub id: ID,
    pub competition_id: ID,
    pub name: String,
    pub status: TeamStatus,
    pub seed_number: Option<i32>,
    pub draw_position: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<ID>,
    pub contact_email: Option<String>,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    pub registered_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub withdrawal_reason: Option<String>,
}

impl From<CompetitionTeamRow> for CompetitionTeam {
    fn from(row: CompetitionTeamRow) -> Self {
        Self {
            id: row.id.into(),
            competition_id: row.competition_id.into(),
            name: row.name,
            status: row.status.into(),
            seed_number: row.seed_number,
            draw_position: row.draw_position,
            group_name: row.group_name,
            captain_member_id: row.captain_member_id.map(Into::into),
            contact_email: row.contact_email,
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goals_for - row.goals_against,
            points: row.points,
            registered_at: row.registered_at,
            approved_at: row.approved_at,
            withdrawn_at: row.withdrawn_at,
            withdrawal_reason: row.withdrawal_reason,
        }
    }
}

#[derive(InputObject)]
pub struct RegisterTeamInput {
    pub competition_id: ID,
    pub name: String,
    pub seed_number: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<ID>,
    pub contact_email: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateTeamInput {
    pub name: Option<String>,
    pub seed_number: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<ID>,
    pub contact_email: Option<String>,
}

#[derive(InputObject)]
pub struct WithdrawTeamInput {
    pub team_id: ID,
    pub reason: Option<String>,
    /// Mark the team's played matches Void so they leave the standings.
    #[graphql(default = false)]
    pub void_played_results: bool,
}
