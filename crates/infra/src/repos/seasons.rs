use chrono::NaiveDate;
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::SeasonRow;

#[derive(Debug, Clone)]
pub struct CreateSeason {
    pub club_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSeason {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<SeasonRow>> {
    sqlx::query_as::<_, SeasonRow>("SELECT * FROM seasons WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list_by_club<'e>(
    executor: impl PgExecutor<'e>,
    club_id: Uuid,
) -> Result<Vec<SeasonRow>> {
    sqlx::query_as::<_, SeasonRow>(
        "SELECT * FROM seasons WHERE club_id = $1 ORDER BY start_date DESC, name ASC",
    )
    .bind(club_id)
    .fetch_all(executor)
    .await
}

pub async fn get_current<'e>(
    executor: impl PgExecutor<'e>,
    club_id: Uuid,
) -> Result<Option<SeasonRow>> {
    sqlx::query_as::<_, SeasonRow>("SELECT * FROM seasons WHERE club_id = $1 AND is_current")
        .bind(club_id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateSeason) -> Result<SeasonRow> {
    sqlx::query_as::<_, SeasonRow>(
        r#"
        INSERT INTO seasons (club_id, name, start_date, end_date, is_current)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.club_id)
    .bind(data.name)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.is_current)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateSeason,
) -> Result<Option<SeasonRow>> {
    sqlx::query_as::<_, SeasonRow>(
        r#"
        UPDATE seasons
        SET name = COALESCE($2, name),
            start_date = COALESCE($3, start_date),
            end_date = COALESCE($4, end_date),
            is_completed = COALESCE($5, is_completed),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.name)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.is_completed)
    .fetch_optional(executor)
    .await
}

/// Unflag whichever season of the club is currently marked current.
pub async fn clear_current<'e>(executor: impl PgExecutor<'e>, club_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE seasons SET is_current = FALSE, updated_at = NOW() WHERE club_id = $1 AND is_current",
    )
    .bind(club_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn mark_current<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<SeasonRow> {
    sqlx::query_as::<_, SeasonRow>(
        "UPDATE seasons SET is_current = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM seasons WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
