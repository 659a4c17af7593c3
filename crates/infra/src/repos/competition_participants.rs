use sqlx::{PgExecutor, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::CompetitionParticipantRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "participant_role", rename_all = "snake_case")]
pub enum ParticipantRole {
    Player,
    Captain,
    ViceCaptain,
    Coach,
    Manager,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Player => "player",
            ParticipantRole::Captain => "captain",
            ParticipantRole::ViceCaptain => "vice_captain",
            ParticipantRole::Coach => "coach",
            ParticipantRole::Manager => "manager",
        }
    }

    /// Coaches and managers are attached to a team but never take the field.
    pub fn plays(&self) -> bool {
        matches!(
            self,
            ParticipantRole::Player | ParticipantRole::Captain | ParticipantRole::ViceCaptain
        )
    }
}

impl FromStr for ParticipantRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "player" => Ok(ParticipantRole::Player),
            "captain" => Ok(ParticipantRole::Captain),
            "vice_captain" => Ok(ParticipantRole::ViceCaptain),
            "coach" => Ok(ParticipantRole::Coach),
            "manager" => Ok(ParticipantRole::Manager),
            _ => Err(format!("Unknown participant role: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateParticipant {
    pub competition_id: Uuid,
    pub team_id: Uuid,
    pub member_id: Uuid,
    pub display_name: String,
    pub role: ParticipantRole,
    pub shirt_number: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantTotals {
    pub appearances: i32,
    pub goals: i32,
    pub assists: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<CompetitionParticipantRow>> {
    sqlx::query_as::<_, CompetitionParticipantRow>(
        "SELECT * FROM competition_participants WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> Result<Vec<CompetitionParticipantRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CompetitionParticipantRow>(
        "SELECT * FROM competition_participants WHERE id = ANY($1::uuid[])",
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn list_by_team<'e>(
    executor: impl PgExecutor<'e>,
    team_id: Uuid,
) -> Result<Vec<CompetitionParticipantRow>> {
    sqlx::query_as::<_, CompetitionParticipantRow>(
        r#"
        SELECT * FROM competition_participants
        WHERE team_id = $1
        ORDER BY shirt_number ASC NULLS LAST, display_name ASC
        "#,
    )
    .bind(team_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<CompetitionParticipantRow>> {
    sqlx::query_as::<_, CompetitionParticipantRow>(
        "SELECT * FROM competition_participants WHERE competition_id = $1 ORDER BY display_name ASC",
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn member_registered<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    member_id: Uuid,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM competition_participants
            WHERE competition_id = $1 AND member_id = $2
        )
        "#,
    )
    .bind(competition_id)
    .bind(member_id)
    .fetch_one(executor)
    .await
}

pub async fn shirt_taken<'e>(
    executor: impl PgExecutor<'e>,
    team_id: Uuid,
    shirt_number: i32,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM competition_participants
            WHERE team_id = $1 AND shirt_number = $2
        )
        "#,
    )
    .bind(team_id)
    .bind(shirt_number)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateParticipant,
) -> Result<CompetitionParticipantRow> {
    sqlx::query_as::<_, CompetitionParticipantRow>(
        r#"
        INSERT INTO competition_participants (competition_id, team_id, member_id, display_name,
                                              role, shirt_number)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(data.competition_id)
    .bind(data.team_id)
    .bind(data.member_id)
    .bind(data.display_name)
    .bind(data.role)
    .bind(data.shirt_number)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    role: Option<ParticipantRole>,
    shirt_number: Option<i32>,
    display_name: Option<String>,
) -> Result<Option<CompetitionParticipantRow>> {
    sqlx::query_as::<_, CompetitionParticipantRow>(
        r#"
        UPDATE competition_participants
        SET role = COALESCE($2, role),
            shirt_number = COALESCE($3, shirt_number),
            display_name = COALESCE($4, display_name),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(role)
    .bind(shirt_number)
    .bind(display_name)
    .fetch_optional(executor)
    .await
}

/// Whether any match event or lineup entry points at the participant.
pub async fn has_match_records<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM match_events
            WHERE participant_id = $1 OR assist_participant_id = $1
        ) OR EXISTS(
            SELECT 1 FROM match_lineups WHERE participant_id = $1
        )
        "#,
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn set_totals<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    totals: ParticipantTotals,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE competition_participants
        SET appearances = $2, goals = $3, assists = $4,
            yellow_cards = $5, red_cards = $6, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(totals.appearances)
    .bind(totals.goals)
    .bind(totals.assists)
    .bind(totals.yellow_cards)
    .bind(totals.red_cards)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM competition_participants WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
