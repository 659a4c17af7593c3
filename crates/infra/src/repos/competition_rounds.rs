use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::CompetitionRoundRow;

#[derive(Debug, Clone)]
pub struct CreateRound {
    pub competition_id: Uuid,
    pub round_number: i32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<CompetitionRoundRow>> {
    sqlx::query_as::<_, CompetitionRoundRow>("SELECT * FROM competition_rounds WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_by_number<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    round_number: i32,
) -> Result<Option<CompetitionRoundRow>> {
    sqlx::query_as::<_, CompetitionRoundRow>(
        "SELECT * FROM competition_rounds WHERE competition_id = $1 AND round_number = $2",
    )
    .bind(competition_id)
    .bind(round_number)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<CompetitionRoundRow>> {
    sqlx::query_as::<_, CompetitionRoundRow>(
        "SELECT * FROM competition_rounds WHERE competition_id = $1 ORDER BY round_number ASC",
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn max_round_number<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(round_number), 0) FROM competition_rounds WHERE competition_id = $1",
    )
    .bind(competition_id)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRound,
) -> Result<CompetitionRoundRow> {
    sqlx::query_as::<_, CompetitionRoundRow>(
        r#"
        INSERT INTO competition_rounds (competition_id, round_number, name, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.competition_id)
    .bind(data.round_number)
    .bind(data.name)
    .bind(data.start_date)
    .bind(data.end_date)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    name: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<Option<CompetitionRoundRow>> {
    sqlx::query_as::<_, CompetitionRoundRow>(
        r#"
        UPDATE competition_rounds
        SET name = COALESCE($2, name),
            start_date = COALESCE($3, start_date),
            end_date = COALESCE($4, end_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(executor)
    .await
}

pub async fn set_complete<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    is_complete: bool,
) -> Result<CompetitionRoundRow> {
    sqlx::query_as::<_, CompetitionRoundRow>(
        r#"
        UPDATE competition_rounds
        SET is_complete = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(is_complete)
    .fetch_one(executor)
    .await
}

/// Remove rounds that no longer hold any match, used after a fixture
/// regeneration wiped the previous schedule.
pub async fn delete_empty<'e>(executor: impl PgExecutor<'e>, competition_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM competition_rounds r
        WHERE r.competition_id = $1
          AND NOT EXISTS (SELECT 1 FROM matches m WHERE m.round_id = r.id)
        "#,
    )
    .bind(competition_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_matches<'e>(executor: impl PgExecutor<'e>, round_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM matches WHERE round_id = $1")
        .bind(round_id)
        .fetch_one(executor)
        .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM competition_rounds WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
