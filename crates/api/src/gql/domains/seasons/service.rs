use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::engine::{CompetitionError, EngineResult};
use infra::models::SeasonRow;
use infra::repos::{clubs, competitions, seasons, CreateSeason, UpdateSeason};

pub fn validate_season(name: &str, start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(CompetitionError::validation("season name must not be empty"));
    }
    if end < start {
        return Err(CompetitionError::validation(format!(
            "season end date {} is before its start date {}",
            end, start
        )));
    }
    Ok(())
}

async fn load(executor: impl sqlx::PgExecutor<'_>, id: Uuid) -> EngineResult<SeasonRow> {
    seasons::get_by_id(executor, id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("season", id))
}

/// Every change to a club's current flag runs under this lock.
async fn lock_club(conn: &mut PgConnection, club_id: Uuid) -> EngineResult<()> {
    clubs::get_for_update(&mut *conn, club_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("club", club_id))?;
    Ok(())
}

/// Create a season, taking over the club's current flag when asked to.
pub async fn create_season(pool: &sqlx::PgPool, data: CreateSeason) -> EngineResult<SeasonRow> {
    validate_season(&data.name, data.start_date, data.end_date)?;

    let mut tx = pool.begin().await?;
    if data.is_current {
        lock_club(&mut tx, data.club_id).await?;
        seasons::clear_current(&mut *tx, data.club_id).await?;
    }
    let club_id = data.club_id;
    let season = seasons::create(
        &mut *tx,
        CreateSeason {
            name: data.name.trim().to_string(),
            ..data
        },
    )
    .await?;
    tx.commit().await?;

    info!(season_id = %season.id, %club_id, is_current = season.is_current, "Season created");
    Ok(season)
}

pub async fn update_season(
    pool: &sqlx::PgPool,
    id: Uuid,
    data: UpdateSeason,
) -> EngineResult<SeasonRow> {
    let mut tx = pool.begin().await?;
    let current = load(&mut *tx, id).await?;

    let name = data.name.as_deref().map(str::trim).unwrap_or(&current.name);
    validate_season(
        name,
        data.start_date.unwrap_or(current.start_date),
        data.end_date.unwrap_or(current.end_date),
    )?;

    let updated = seasons::update(
        &mut *tx,
        id,
        UpdateSeason {
            name: data.name.map(|n| n.trim().to_string()),
            // completion goes through complete_season
            is_completed: None,
            ..data
        },
    )
    .await?
    .ok_or_else(|| CompetitionError::not_found("season", id))?;
    tx.commit().await?;

    Ok(updated)
}

/// Mark a season completed. A completed season is never current.
pub async fn complete_season(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<SeasonRow> {
    let mut tx = pool.begin().await?;
    let unlocked = load(&mut *tx, id).await?;
    lock_club(&mut tx, unlocked.club_id).await?;
    let season = load(&mut *tx, id).await?;
    if season.is_completed {
        return Err(CompetitionError::conflict("season is already completed"));
    }
    if season.is_current {
        seasons::clear_current(&mut *tx, season.club_id).await?;
    }
    let updated = seasons::update(
        &mut *tx,
        id,
        UpdateSeason {
            is_completed: Some(true),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| CompetitionError::not_found("season", id))?;
    tx.commit().await?;

    info!(season_id = %id, "Season completed");
    Ok(updated)
}

/// Make `id` the club's current season, unflagging the previous one atomically.
pub async fn set_current_season(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<SeasonRow> {
    let mut tx = pool.begin().await?;
    let unlocked = load(&mut *tx, id).await?;
    lock_club(&mut tx, unlocked.club_id).await?;
    // re-read under the lock; a concurrent call may have just committed
    let season = load(&mut *tx, id).await?;
    if season.is_completed {
        return Err(CompetitionError::conflict(
            "a completed season cannot be made current",
        ));
    }
    if season.is_current {
        return Ok(season);
    }
    seasons::clear_current(&mut *tx, season.club_id).await?;
    let season = seasons::mark_current(&mut *tx, id).await?;
    tx.commit().await?;

    info!(season_id = %id, club_id = %season.club_id, "Current season changed");
    Ok(season)
}

pub async fn delete_season(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<bool> {
    let mut tx = pool.begin().await?;
    load(&mut *tx, id).await?;
    let referenced = competitions::count_by_season(&mut *tx, id).await?;
    if referenced > 0 {
        return Err(CompetitionError::conflict(format!(
            "season is used by {} competitions",
            referenced
        )));
    }
    let deleted = seasons::delete(&mut *tx, id).await?;
    tx.commit().await?;
    Ok(deleted)
}
