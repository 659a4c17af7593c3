use sqlx::{PgExecutor, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::CompetitionTeamRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "team_status", rename_all = "snake_case")]
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

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Registered => "registered",
            TeamStatus::Confirmed => "confirmed",
            TeamStatus::Withdrawn => "withdrawn",
            TeamStatus::Disqualified => "disqualified",
            TeamStatus::Eliminated => "eliminated",
            TeamStatus::Active => "active",
            TeamStatus::Champion => "champion",
            TeamStatus::RunnerUp => "runner_up",
        }
    }

    /// Teams that take part in a fixture draw.
    pub fn is_drawable(&self) -> bool {
        matches!(self, TeamStatus::Confirmed | TeamStatus::Active)
    }

    /// Teams removed from the competition by withdrawal or sanction.
    pub fn has_left(&self) -> bool {
        matches!(self, TeamStatus::Withdrawn | TeamStatus::Disqualified)
    }
}

impl FromStr for TeamStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "registered" => Ok(TeamStatus::Registered),
            "confirmed" => Ok(TeamStatus::Confirmed),
            "withdrawn" => Ok(TeamStatus::Withdrawn),
            "disqualified" => Ok(TeamStatus::Disqualified),
            "eliminated" => Ok(TeamStatus::Eliminated),
            "active" => Ok(TeamStatus::Active),
            "champion" => Ok(TeamStatus::Champion),
            "runner_up" => Ok(TeamStatus::RunnerUp),
            _ => Err(format!("Unknown team status: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub competition_id: Uuid,
    pub name: String,
    pub seed_number: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<Uuid>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub seed_number: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<Uuid>,
    pub contact_email: Option<String>,
}

/// Cached aggregate columns written alongside a standings recalculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamAggregates {
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub points: i32,
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<CompetitionTeamRow>> {
    sqlx::query_as::<_, CompetitionTeamRow>("SELECT * FROM competition_teams WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> Result<Vec<CompetitionTeamRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CompetitionTeamRow>(
        "SELECT * FROM competition_teams WHERE id = ANY($1::uuid[])",
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    status: Option<TeamStatus>,
) -> Result<Vec<CompetitionTeamRow>> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        SELECT * FROM competition_teams
        WHERE competition_id = $1
          AND ($2::team_status IS NULL OR status = $2)
        ORDER BY seed_number ASC NULLS LAST, name ASC, id ASC
        "#,
    )
    .bind(competition_id)
    .bind(status)
    .fetch_all(executor)
    .await
}

/// Confirmed or active teams in registration order. Used both to build a draw and
/// to re-check that the set did not move underneath it.
pub async fn list_drawable<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<CompetitionTeamRow>> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        SELECT * FROM competition_teams
        WHERE competition_id = $1
          AND status IN ('confirmed', 'active')
        ORDER BY registered_at ASC, id ASC
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn count_active_entries<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM competition_teams
        WHERE competition_id = $1 AND status NOT IN ('withdrawn', 'disqualified')
        "#,
    )
    .bind(competition_id)
    .fetch_one(executor)
    .await
}

/// Case-insensitive, whitespace-trimmed name lookup within one competition.
pub async fn name_taken<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    name: &str,
    exclude_team_id: Option<Uuid>,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM competition_teams
            WHERE competition_id = $1
              AND lower(btrim(name)) = lower(btrim($2))
              AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(competition_id)
    .bind(name)
    .bind(exclude_team_id)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateTeam,
) -> Result<CompetitionTeamRow> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        INSERT INTO competition_teams (competition_id, name, seed_number, group_name,
                                       captain_member_id, contact_email)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(data.competition_id)
    .bind(data.name)
    .bind(data.seed_number)
    .bind(data.group_name)
    .bind(data.captain_member_id)
    .bind(data.contact_email)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateTeam,
) -> Result<Option<CompetitionTeamRow>> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        UPDATE competition_teams
        SET name = COALESCE($2, name),
            seed_number = COALESCE($3, seed_number),
            group_name = COALESCE($4, group_name),
            captain_member_id = COALESCE($5, captain_member_id),
            contact_email = COALESCE($6, contact_email),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.name)
    .bind(data.seed_number)
    .bind(data.group_name)
    .bind(data.captain_member_id)
    .bind(data.contact_email)
    .fetch_optional(executor)
    .await
}

pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: TeamStatus,
) -> Result<CompetitionTeamRow> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        UPDATE competition_teams
        SET status = $2,
            approved_at = CASE WHEN $2 = 'confirmed'::team_status THEN NOW() ELSE approved_at END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_one(executor)
    .await
}

pub async fn mark_withdrawn<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: TeamStatus,
    reason: Option<String>,
) -> Result<CompetitionTeamRow> {
    sqlx::query_as::<_, CompetitionTeamRow>(
        r#"
        UPDATE competition_teams
        SET status = $2,
            withdrawn_at = NOW(),
            withdrawal_reason = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(reason)
    .fetch_one(executor)
    .await
}

/// Confirmed teams become active once play starts.
pub async fn activate_confirmed<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE competition_teams
        SET status = 'active', updated_at = NOW()
        WHERE competition_id = $1 AND status = 'confirmed'
        "#,
    )
    .bind(competition_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn set_draw_position<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    draw_position: Option<i32>,
) -> Result<()> {
    sqlx::query("UPDATE competition_teams SET draw_position = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(draw_position)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn set_aggregates<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    totals: TeamAggregates,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE competition_teams
        SET played = $2, won = $3, drawn = $4, lost = $5,
            goals_for = $6, goals_against = $7, points = $8,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(totals.played)
    .bind(totals.won)
    .bind(totals.drawn)
    .bind(totals.lost)
    .bind(totals.goals_for)
    .bind(totals.goals_against)
    .bind(totals.points)
    .execute(executor)
    .await?;

    Ok(())
}
