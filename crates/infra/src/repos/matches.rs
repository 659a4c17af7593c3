use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::{models::MatchRow, pagination::LimitOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Postponed,
    Cancelled,
    Walkover,
    Bye,
    Abandoned,
    Disputed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Confirmed => "confirmed",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
            MatchStatus::Walkover => "walkover",
            MatchStatus::Bye => "bye",
            MatchStatus::Abandoned => "abandoned",
            MatchStatus::Disputed => "disputed",
        }
    }

    /// No further result can be recorded. Postponed matches are still open.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchStatus::Completed
                | MatchStatus::Cancelled
                | MatchStatus::Walkover
                | MatchStatus::Bye
                | MatchStatus::Abandoned
                | MatchStatus::Disputed
        )
    }

    pub fn accepts_result(&self) -> bool {
        matches!(
            self,
            MatchStatus::Scheduled | MatchStatus::Confirmed | MatchStatus::InProgress
        )
    }

    /// Events and lineups may only be attached to a match that kicked off.
    pub fn accepts_events(&self) -> bool {
        matches!(self, MatchStatus::InProgress | MatchStatus::Completed)
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "confirmed" => Ok(MatchStatus::Confirmed),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            "postponed" => Ok(MatchStatus::Postponed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            "walkover" => Ok(MatchStatus::Walkover),
            "bye" => Ok(MatchStatus::Bye),
            "abandoned" => Ok(MatchStatus::Abandoned),
            "disputed" => Ok(MatchStatus::Disputed),
            _ => Err(format!("Unknown match status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "match_result", rename_all = "snake_case")]
pub enum MatchResult {
    NotPlayed,
    HomeWin,
    AwayWin,
    Draw,
    HomeWalkover,
    AwayWalkover,
    Void,
}

impl MatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::NotPlayed => "not_played",
            MatchResult::HomeWin => "home_win",
            MatchResult::AwayWin => "away_win",
            MatchResult::Draw => "draw",
            MatchResult::HomeWalkover => "home_walkover",
            MatchResult::AwayWalkover => "away_walkover",
            MatchResult::Void => "void",
        }
    }
}

impl FromStr for MatchResult {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not_played" => Ok(MatchResult::NotPlayed),
            "home_win" => Ok(MatchResult::HomeWin),
            "away_win" => Ok(MatchResult::AwayWin),
            "draw" => Ok(MatchResult::Draw),
            "home_walkover" => Ok(MatchResult::HomeWalkover),
            "away_walkover" => Ok(MatchResult::AwayWalkover),
            "void" => Ok(MatchResult::Void),
            _ => Err(format!("Unknown match result: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub competition_id: Option<Uuid>,
    pub round_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateMatch {
    pub competition_id: Uuid,
    pub round_id: Option<Uuid>,
    pub leg_number: Option<i32>,
    pub bracket_position: Option<i32>,
    pub group_name: Option<String>,
    pub status: MatchStatus,
    pub scheduled_date_time: DateTime<Utc>,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct RecordResult {
    pub status: MatchStatus,
    pub result: MatchResult,
    pub home_score: i32,
    pub away_score: i32,
    pub notes: Option<String>,
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<MatchRow>> {
    sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Lock a match row until the surrounding transaction ends. Concurrent result
/// submissions for the same match queue here and see the committed status.
pub async fn get_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<MatchRow>> {
    sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &MatchFilter,
    page: Option<LimitOffset>,
) -> Result<Vec<MatchRow>> {
    let p = page.unwrap_or_default();

    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM matches
        WHERE ($1::uuid IS NULL OR competition_id = $1)
          AND ($2::uuid IS NULL OR round_id = $2)
          AND ($3::uuid IS NULL OR home_team_id = $3 OR away_team_id = $3)
          AND ($4::match_status IS NULL OR status = $4)
          AND ($5::timestamptz IS NULL OR scheduled_date_time >= $5)
          AND ($6::timestamptz IS NULL OR scheduled_date_time <= $6)
        ORDER BY scheduled_date_time ASC, bracket_position ASC NULLS LAST, id ASC
        LIMIT $7 OFFSET $8
        "#,
    )
    .bind(filter.competition_id)
    .bind(filter.round_id)
    .bind(filter.team_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(p.limit)
    .bind(p.offset)
    .fetch_all(executor)
    .await
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<MatchRow>> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM matches
        WHERE competition_id = $1
        ORDER BY scheduled_date_time ASC, bracket_position ASC NULLS LAST, id ASC
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_round<'e>(
    executor: impl PgExecutor<'e>,
    round_id: Uuid,
) -> Result<Vec<MatchRow>> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM matches
        WHERE round_id = $1
        ORDER BY bracket_position ASC NULLS LAST, scheduled_date_time ASC, id ASC
        "#,
    )
    .bind(round_id)
    .fetch_all(executor)
    .await
}

/// Matches involving a team that have not been played yet.
pub async fn list_open_for_team<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    team_id: Uuid,
) -> Result<Vec<MatchRow>> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM matches
        WHERE competition_id = $1
          AND (home_team_id = $2 OR away_team_id = $2)
          AND status IN ('scheduled', 'confirmed', 'postponed')
        ORDER BY scheduled_date_time ASC
        "#,
    )
    .bind(competition_id)
    .bind(team_id)
    .fetch_all(executor)
    .await
}

pub async fn list_completed_for_team<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    team_id: Uuid,
) -> Result<Vec<MatchRow>> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM matches
        WHERE competition_id = $1
          AND (home_team_id = $2 OR away_team_id = $2)
          AND status IN ('completed', 'walkover')
        "#,
    )
    .bind(competition_id)
    .bind(team_id)
    .fetch_all(executor)
    .await
}

pub async fn count_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM matches WHERE competition_id = $1")
        .bind(competition_id)
        .fetch_one(executor)
        .await
}

/// Matches that are neither finished nor written off.
pub async fn count_open<'e>(executor: impl PgExecutor<'e>, competition_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM matches
        WHERE competition_id = $1
          AND status IN ('scheduled', 'confirmed', 'in_progress', 'postponed')
        "#,
    )
    .bind(competition_id)
    .fetch_one(executor)
    .await
}

/// Matches whose status forbids a schedule regeneration.
pub async fn count_played<'e>(executor: impl PgExecutor<'e>, competition_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM matches
        WHERE competition_id = $1 AND status NOT IN ('scheduled', 'bye')
        "#,
    )
    .bind(competition_id)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateMatch) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        INSERT INTO matches (competition_id, round_id, leg_number, bracket_position, group_name,
                             status, scheduled_date_time, home_team_id, away_team_id, venue_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(data.competition_id)
    .bind(data.round_id)
    .bind(data.leg_number)
    .bind(data.bracket_position)
    .bind(data.group_name)
    .bind(data.status)
    .bind(data.scheduled_date_time)
    .bind(data.home_team_id)
    .bind(data.away_team_id)
    .bind(data.venue_id)
    .fetch_one(executor)
    .await
}

pub async fn reschedule<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    scheduled_date_time: Option<DateTime<Utc>>,
    venue_id: Option<Uuid>,
    notes: Option<String>,
) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches
        SET scheduled_date_time = COALESCE($2, scheduled_date_time),
            venue_id = COALESCE($3, venue_id),
            notes = COALESCE($4, notes),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(scheduled_date_time)
    .bind(venue_id)
    .bind(notes)
    .fetch_one(executor)
    .await
}

pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: MatchStatus,
) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches
        SET status = $2,
            actual_start_time = CASE
                WHEN $2 = 'in_progress'::match_status THEN COALESCE(actual_start_time, NOW())
                ELSE actual_start_time
            END,
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

/// Record a postponement. `status` is Postponed, or Scheduled when the new
/// kick-off time is already known.
pub async fn postpone<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: MatchStatus,
    reason: Option<String>,
    new_date_time: Option<DateTime<Utc>>,
) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches
        SET status = $2,
            postponement_reason = $3,
            scheduled_date_time = COALESCE($4, scheduled_date_time),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(reason)
    .bind(new_date_time)
    .fetch_one(executor)
    .await
}

pub async fn cancel<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    reason: Option<String>,
) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches
        SET status = 'cancelled',
            cancellation_reason = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(reason)
    .fetch_one(executor)
    .await
}

pub async fn record_result<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: RecordResult,
) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches
        SET status = $2,
            result = $3,
            home_score = $4,
            away_score = $5,
            notes = COALESCE($6, notes),
            actual_end_time = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.status)
    .bind(data.result)
    .bind(data.home_score)
    .bind(data.away_score)
    .bind(data.notes)
    .fetch_one(executor)
    .await
}

/// Keep the recorded score but stop it from counting anywhere.
pub async fn void_result<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<MatchRow> {
    sqlx::query_as::<_, MatchRow>(
        "UPDATE matches SET result = 'void', updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM matches WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Drop every unplayed or bye match of a competition.
pub async fn delete_regenerable<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM matches WHERE competition_id = $1 AND status IN ('scheduled', 'bye')",
    )
    .bind(competition_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
