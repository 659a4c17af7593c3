use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::{models::CompetitionRow, pagination::LimitOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "competition_type", rename_all = "snake_case")]
pub enum CompetitionType {
    League,
    Tournament,
    Cup,
    Knockout,
    Friendly,
}

impl CompetitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionType::League => "league",
            CompetitionType::Tournament => "tournament",
            CompetitionType::Cup => "cup",
            CompetitionType::Knockout => "knockout",
            CompetitionType::Friendly => "friendly",
        }
    }
}

impl FromStr for CompetitionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "league" => Ok(CompetitionType::League),
            "tournament" => Ok(CompetitionType::Tournament),
            "cup" => Ok(CompetitionType::Cup),
            "knockout" => Ok(CompetitionType::Knockout),
            "friendly" => Ok(CompetitionType::Friendly),
            _ => Err(format!("Unknown competition type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "competition_status", rename_all = "snake_case")]
pub enum CompetitionStatus {
    Draft,
    Published,
    RegistrationOpen,
    RegistrationClosed,
    DrawComplete,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
    Archived,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionStatus::Draft => "draft",
            CompetitionStatus::Published => "published",
            CompetitionStatus::RegistrationOpen => "registration_open",
            CompetitionStatus::RegistrationClosed => "registration_closed",
            CompetitionStatus::DrawComplete => "draw_complete",
            CompetitionStatus::InProgress => "in_progress",
            CompetitionStatus::Completed => "completed",
            CompetitionStatus::Cancelled => "cancelled",
            CompetitionStatus::Postponed => "postponed",
            CompetitionStatus::Archived => "archived",
        }
    }

    /// Completed, Cancelled and Archived competitions accept no further changes
    /// other than archiving.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CompetitionStatus::Completed | CompetitionStatus::Cancelled | CompetitionStatus::Archived
        )
    }
}

impl FromStr for CompetitionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CompetitionStatus::Draft),
            "published" => Ok(CompetitionStatus::Published),
            "registration_open" => Ok(CompetitionStatus::RegistrationOpen),
            "registration_closed" => Ok(CompetitionStatus::RegistrationClosed),
            "draw_complete" => Ok(CompetitionStatus::DrawComplete),
            "in_progress" => Ok(CompetitionStatus::InProgress),
            "completed" => Ok(CompetitionStatus::Completed),
            "cancelled" => Ok(CompetitionStatus::Cancelled),
            "postponed" => Ok(CompetitionStatus::Postponed),
            "archived" => Ok(CompetitionStatus::Archived),
            _ => Err(format!("Unknown competition status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub club_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub status: Option<CompetitionStatus>,
}

#[derive(Debug, Clone)]
pub struct CreateCompetition {
    pub club_id: Uuid,
    pub season_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub competition_type: CompetitionType,
    pub is_team_based: bool,
    pub min_teams: i32,
    pub max_teams: Option<i32>,
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub promotion_places: i32,
    pub relegation_places: i32,
    pub head_to_head_tiebreak: bool,
    pub home_and_away: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCompetition {
    pub season_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_teams: Option<i32>,
    /// `Some(None)` clears the cap.
    pub max_teams: Option<Option<i32>>,
    pub points_for_win: Option<i32>,
    pub points_for_draw: Option<i32>,
    pub points_for_loss: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub promotion_places: Option<i32>,
    pub relegation_places: Option<i32>,
    pub head_to_head_tiebreak: Option<bool>,
    pub home_and_away: Option<bool>,
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<CompetitionRow>> {
    sqlx::query_as::<_, CompetitionRow>("SELECT * FROM competitions WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Load a competition and take a row lock for the rest of the transaction.
/// Every lifecycle mutation goes through this lock so transitions, team
/// changes and fixture generation on one competition are serialised.
pub async fn get_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<CompetitionRow>> {
    sqlx::query_as::<_, CompetitionRow>("SELECT * FROM competitions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> Result<Vec<CompetitionRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CompetitionRow>("SELECT * FROM competitions WHERE id = ANY($1::uuid[])")
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &CompetitionFilter,
    page: Option<LimitOffset>,
) -> Result<Vec<CompetitionRow>> {
    let p = page.unwrap_or_default();

    sqlx::query_as::<_, CompetitionRow>(
        r#"
        SELECT * FROM competitions
        WHERE ($1::uuid IS NULL OR club_id = $1)
          AND ($2::uuid IS NULL OR season_id = $2)
          AND ($3::competition_status IS NULL OR status = $3)
        ORDER BY start_date DESC NULLS LAST, created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.club_id)
    .bind(filter.season_id)
    .bind(filter.status)
    .bind(p.limit)
    .bind(p.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e>(executor: impl PgExecutor<'e>, filter: &CompetitionFilter) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM competitions
        WHERE ($1::uuid IS NULL OR club_id = $1)
          AND ($2::uuid IS NULL OR season_id = $2)
          AND ($3::competition_status IS NULL OR status = $3)
        "#,
    )
    .bind(filter.club_id)
    .bind(filter.season_id)
    .bind(filter.status)
    .fetch_one(executor)
    .await
}

pub async fn count_by_season<'e>(executor: impl PgExecutor<'e>, season_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM competitions WHERE season_id = $1")
        .bind(season_id)
        .fetch_one(executor)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateCompetition,
) -> Result<CompetitionRow> {
    sqlx::query_as::<_, CompetitionRow>(
        r#"
        INSERT INTO competitions (club_id, season_id, name, description, competition_type,
                                  is_team_based, min_teams, max_teams, points_for_win,
                                  points_for_draw, points_for_loss, start_date, end_date,
                                  registration_deadline, promotion_places, relegation_places,
                                  head_to_head_tiebreak, home_and_away)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING *
        "#,
    )
    .bind(data.club_id)
    .bind(data.season_id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.competition_type)
    .bind(data.is_team_based)
    .bind(data.min_teams)
    .bind(data.max_teams)
    .bind(data.points_for_win)
    .bind(data.points_for_draw)
    .bind(data.points_for_loss)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.registration_deadline)
    .bind(data.promotion_places)
    .bind(data.relegation_places)
    .bind(data.head_to_head_tiebreak)
    .bind(data.home_and_away)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateCompetition,
) -> Result<Option<CompetitionRow>> {
    sqlx::query_as::<_, CompetitionRow>(
        r#"
        UPDATE competitions
        SET season_id = COALESCE($2, season_id),
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            min_teams = COALESCE($5, min_teams),
            max_teams = CASE WHEN $17 THEN $6 ELSE max_teams END,
            points_for_win = COALESCE($7, points_for_win),
            points_for_draw = COALESCE($8, points_for_draw),
            points_for_loss = COALESCE($9, points_for_loss),
            start_date = COALESCE($10, start_date),
            end_date = COALESCE($11, end_date),
            registration_deadline = COALESCE($12, registration_deadline),
            promotion_places = COALESCE($13, promotion_places),
            relegation_places = COALESCE($14, relegation_places),
            head_to_head_tiebreak = COALESCE($15, head_to_head_tiebreak),
            home_and_away = COALESCE($16, home_and_away),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.season_id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.min_teams)
    .bind(data.max_teams.flatten())
    .bind(data.points_for_win)
    .bind(data.points_for_draw)
    .bind(data.points_for_loss)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.registration_deadline)
    .bind(data.promotion_places)
    .bind(data.relegation_places)
    .bind(data.head_to_head_tiebreak)
    .bind(data.home_and_away)
    .bind(data.max_teams.is_some())
    .fetch_optional(executor)
    .await
}

pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: CompetitionStatus,
    resume_status: Option<CompetitionStatus>,
) -> Result<CompetitionRow> {
    sqlx::query_as::<_, CompetitionRow>(
        r#"
        UPDATE competitions
        SET status = $2,
            resume_status = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(resume_status)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
