use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::engine::fixtures::default_round_name;
use crate::engine::lifecycle;
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::domains::competitions::service::lock_competition;
use infra::models::CompetitionRoundRow;
use infra::repos::{competition_rounds, matches, CreateRound};

fn check_dates(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> EngineResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(CompetitionError::validation(
            "round end date is before its start date",
        )),
        _ => Ok(()),
    }
}

async fn load(conn: &mut PgConnection, id: Uuid) -> EngineResult<CompetitionRoundRow> {
    competition_rounds::get_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("round", id))
}

pub async fn create_round(
    pool: &sqlx::PgPool,
    competition_id: Uuid,
    round_number: i32,
    name: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> EngineResult<CompetitionRoundRow> {
    if round_number < 1 {
        return Err(CompetitionError::validation(format!(
            "round number must be positive, got {}",
            round_number
        )));
    }
    check_dates(start_date, end_date)?;

    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, competition_id).await?;
    lifecycle::check_editable(&competition)?;

    if competition_rounds::get_by_number(&mut *tx, competition_id, round_number)
        .await?
        .is_some()
    {
        return Err(CompetitionError::validation(format!(
            "round {} already exists in this competition",
            round_number
        )));
    }

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_round_name(round_number));

    let round = competition_rounds::create(
        &mut *tx,
        CreateRound {
            competition_id,
            round_number,
            name,
            start_date,
            end_date,
        },
    )
    .await?;
    tx.commit().await?;

    Ok(round)
}

pub async fn update_round(
    pool: &sqlx::PgPool,
    id: Uuid,
    name: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> EngineResult<CompetitionRoundRow> {
    let mut tx = pool.begin().await?;
    let round = load(&mut tx, id).await?;
    let competition = lock_competition(&mut tx, round.competition_id).await?;
    lifecycle::check_editable(&competition)?;

    check_dates(start_date.or(round.start_date), end_date.or(round.end_date))?;
    if matches!(name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(CompetitionError::validation("round name must not be empty"));
    }

    let updated = competition_rounds::update(
        &mut *tx,
        id,
        name.map(|n| n.trim().to_string()),
        start_date,
        end_date,
    )
    .await?
    .ok_or_else(|| CompetitionError::not_found("round", id))?;
    tx.commit().await?;

    Ok(updated)
}

/// Rounds holding matches cannot be deleted.
pub async fn delete_round(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<bool> {
    let mut tx = pool.begin().await?;
    let round = load(&mut tx, id).await?;
    lock_competition(&mut tx, round.competition_id).await?;

    let scheduled = competition_rounds::count_matches(&mut *tx, id).await?;
    if scheduled > 0 {
        return Err(CompetitionError::conflict(format!(
            "round {} still holds {} matches",
            round.round_number, scheduled
        )));
    }
    let deleted = competition_rounds::delete(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(deleted)
}

/// Sync `is_complete` with the round's matches. Returns the round when it just
/// became complete.
pub(crate) async fn refresh_round_completion(
    conn: &mut PgConnection,
    round_id: Uuid,
) -> EngineResult<Option<CompetitionRoundRow>> {
    let round = load(&mut *conn, round_id).await?;
    let in_round = matches::list_by_round(&mut *conn, round_id).await?;
    let complete = !in_round.is_empty() && in_round.iter().all(|m| m.status.is_terminal());

    if complete == round.is_complete {
        return Ok(None);
    }
    let round = competition_rounds::set_complete(&mut *conn, round_id, complete).await?;
    if complete {
        info!(
            competition_id = %round.competition_id,
            round_number = round.round_number,
            "Round complete"
        );
        return Ok(Some(round));
    }
    Ok(None)
}
