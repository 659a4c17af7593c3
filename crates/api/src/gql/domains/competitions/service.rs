use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::fixtures::FixtureFormat;
use crate::engine::lifecycle::{self, MatchCounts, Transition};
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::domains::standings::service as standings_service;
use infra::models::CompetitionRow;
use infra::repos::{
    clubs, competition_teams, competitions, matches, seasons, CompetitionStatus, CreateCompetition,
    TeamStatus, UpdateCompetition,
};

/// The numeric and date settings that have to agree with each other.
#[derive(Debug, Clone, Copy)]
pub struct CompetitionSettings {
    pub min_teams: i32,
    pub max_teams: Option<i32>,
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub promotion_places: i32,
    pub relegation_places: i32,
}

impl CompetitionSettings {
    fn of_new(data: &CreateCompetition) -> Self {
        Self {
            min_teams: data.min_teams,
            max_teams: data.max_teams,
            points_for_win: data.points_for_win,
            points_for_draw: data.points_for_draw,
            points_for_loss: data.points_for_loss,
            start_date: data.start_date,
            end_date: data.end_date,
            promotion_places: data.promotion_places,
            relegation_places: data.relegation_places,
        }
    }

    fn merged(row: &CompetitionRow, data: &UpdateCompetition) -> Self {
        Self {
            min_teams: data.min_teams.unwrap_or(row.min_teams),
            max_teams: data.max_teams.unwrap_or(row.max_teams),
            points_for_win: data.points_for_win.unwrap_or(row.points_for_win),
            points_for_draw: data.points_for_draw.unwrap_or(row.points_for_draw),
            points_for_loss: data.points_for_loss.unwrap_or(row.points_for_loss),
            start_date: data.start_date.or(row.start_date),
            end_date: data.end_date.or(row.end_date),
            promotion_places: data.promotion_places.unwrap_or(row.promotion_places),
            relegation_places: data.relegation_places.unwrap_or(row.relegation_places),
        }
    }
}

pub fn validate_settings(s: &CompetitionSettings) -> EngineResult<()> {
    if s.min_teams < 2 {
        return Err(CompetitionError::validation(format!(
            "minTeams must be at least 2, got {}",
            s.min_teams
        )));
    }
    if let Some(max) = s.max_teams {
        if max < s.min_teams {
            return Err(CompetitionError::validation(format!(
                "maxTeams ({}) must not be below minTeams ({})",
                max, s.min_teams
            )));
        }
    }
    if !(s.points_for_win >= s.points_for_draw && s.points_for_draw >= s.points_for_loss) {
        return Err(CompetitionError::validation(format!(
            "points must satisfy win >= draw >= loss, got {}/{}/{}",
            s.points_for_win, s.points_for_draw, s.points_for_loss
        )));
    }
    if let (Some(start), Some(end)) = (s.start_date, s.end_date) {
        if end < start {
            return Err(CompetitionError::validation(format!(
                "competition end date {} is before its start date {}",
                end, start
            )));
        }
    }
    if s.promotion_places < 0 || s.relegation_places < 0 {
        return Err(CompetitionError::validation(
            "promotion and relegation places must not be negative",
        ));
    }
    Ok(())
}

async fn check_season(conn: &mut PgConnection, club_id: Uuid, season_id: Uuid) -> EngineResult<()> {
    let season = seasons::get_by_id(&mut *conn, season_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("season", season_id))?;
    if season.club_id != club_id {
        return Err(CompetitionError::validation(
            "season belongs to a different club",
        ));
    }
    Ok(())
}

pub(crate) async fn lock_competition(
    conn: &mut PgConnection,
    competition_id: Uuid,
) -> EngineResult<CompetitionRow> {
    competitions::get_for_update(&mut *conn, competition_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("competition", competition_id))
}

/// Create a competition in Draft.
pub async fn create_competition(
    pool: &sqlx::PgPool,
    data: CreateCompetition,
) -> EngineResult<CompetitionRow> {
    if data.name.trim().is_empty() {
        return Err(CompetitionError::validation("competition name must not be empty"));
    }
    validate_settings(&CompetitionSettings::of_new(&data))?;

    let mut tx = pool.begin().await?;
    if clubs::get_by_id(&mut *tx, data.club_id).await?.is_none() {
        return Err(CompetitionError::not_found("club", data.club_id));
    }
    if let Some(season_id) = data.season_id {
        check_season(&mut tx, data.club_id, season_id).await?;
    }
    let competition = competitions::create(
        &mut *tx,
        CreateCompetition {
            name: data.name.trim().to_string(),
            ..data
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        competition_id = %competition.id,
        competition_type = competition.competition_type.as_str(),
        "Competition created"
    );
    Ok(competition)
}

pub async fn update_competition(
    pool: &sqlx::PgPool,
    id: Uuid,
    data: UpdateCompetition,
) -> EngineResult<CompetitionRow> {
    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, id).await?;
    lifecycle::check_editable(&competition)?;

    if matches!(data.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(CompetitionError::validation("competition name must not be empty"));
    }
    validate_settings(&CompetitionSettings::merged(&competition, &data))?;
    if let Some(season_id) = data.season_id {
        check_season(&mut tx, competition.club_id, season_id).await?;
    }

    let updated = competitions::update(
        &mut *tx,
        id,
        UpdateCompetition {
            name: data.name.map(|n| n.trim().to_string()),
            ..data
        },
    )
    .await?
    .ok_or_else(|| CompetitionError::not_found("competition", id))?;
    tx.commit().await?;

    Ok(updated)
}

/// Only possible while no match exists.
pub async fn delete_competition(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<bool> {
    let mut tx = pool.begin().await?;
    lock_competition(&mut tx, id).await?;

    let existing = matches::count_by_competition(&mut *tx, id).await?;
    if existing > 0 {
        return Err(CompetitionError::conflict(format!(
            "competition already has {} matches and cannot be deleted",
            existing
        )));
    }
    let deleted = competitions::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(competition_id = %id, "Competition deleted");
    Ok(deleted)
}

/// Persist an accepted transition and its side effects.
pub(crate) async fn apply_transition(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
    transition: Transition,
) -> EngineResult<CompetitionRow> {
    let updated = competitions::update_status(
        &mut *conn,
        competition.id,
        transition.to,
        transition.resume_status,
    )
    .await?;

    if transition.activates_teams {
        let activated = competition_teams::activate_confirmed(&mut *conn, competition.id).await?;
        info!(competition_id = %competition.id, activated, "Confirmed teams activated");
    }
    if transition.to == CompetitionStatus::Completed {
        finalise(&mut *conn, config, &updated).await?;
    }

    info!(
        competition_id = %competition.id,
        from = competition.status.as_str(),
        to = updated.status.as_str(),
        "Competition status changed"
    );
    Ok(updated)
}

async fn match_counts(conn: &mut PgConnection, competition_id: Uuid) -> EngineResult<MatchCounts> {
    Ok(MatchCounts {
        total: matches::count_by_competition(&mut *conn, competition_id).await?,
        open: matches::count_open(&mut *conn, competition_id).await?,
    })
}

/// Move a competition through its state machine.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Parsing IDs
/// - Converting the output to GraphQL types
pub async fn transition_competition(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    id: Uuid,
    to: CompetitionStatus,
) -> EngineResult<CompetitionRow> {
    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, id).await?;
    let counts = match_counts(&mut tx, id).await?;

    let transition = lifecycle::check_competition_transition(&competition, to, counts)?;
    let updated = apply_transition(&mut tx, config, &competition, transition).await?;
    tx.commit().await?;

    Ok(updated)
}

pub async fn publish_competition(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    id: Uuid,
) -> EngineResult<CompetitionRow> {
    transition_competition(pool, config, id, CompetitionStatus::Published).await
}

/// Return a postponed competition to where it was.
pub async fn resume_competition(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    id: Uuid,
) -> EngineResult<CompetitionRow> {
    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, id).await?;
    let target = lifecycle::resume_target(&competition)?;
    let counts = match_counts(&mut tx, id).await?;

    let transition = lifecycle::check_competition_transition(&competition, target, counts)?;
    let updated = apply_transition(&mut tx, config, &competition, transition).await?;
    tx.commit().await?;

    Ok(updated)
}

/// The first kick-off or result of a drawn competition puts it in progress.
pub(crate) async fn ensure_in_progress(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
) -> EngineResult<CompetitionRow> {
    if competition.status != CompetitionStatus::DrawComplete {
        return Ok(competition.clone());
    }
    let transition = lifecycle::check_competition_transition(
        competition,
        CompetitionStatus::InProgress,
        MatchCounts::default(),
    )?;
    apply_transition(conn, config, competition, transition).await
}

/// Complete a league once its last match is terminal.
pub(crate) async fn complete_if_finished(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
) -> EngineResult<Option<CompetitionRow>> {
    if competition.status != CompetitionStatus::InProgress {
        return Ok(None);
    }
    let counts = match_counts(&mut *conn, competition.id).await?;
    if counts.total == 0 || counts.open > 0 {
        return Ok(None);
    }
    let transition = lifecycle::check_competition_transition(
        competition,
        CompetitionStatus::Completed,
        counts,
    )?;
    Ok(Some(apply_transition(conn, config, competition, transition).await?))
}

/// Freeze the final table. A single round-robin table also decides the
/// champion and runner-up.
async fn finalise(
    conn: &mut PgConnection,
    config: &EngineConfig,
    completed: &CompetitionRow,
) -> EngineResult<()> {
    let table = standings_service::recalculate_in_tx(&mut *conn, config, completed).await?;

    if FixtureFormat::for_type(completed.competition_type) != FixtureFormat::RoundRobin {
        return Ok(());
    }
    let [single] = table.tables.as_slice() else {
        return Ok(());
    };

    let departed: HashSet<Uuid> = competition_teams::list_by_competition(&mut *conn, completed.id, None)
        .await?
        .into_iter()
        .filter(|t| t.status.has_left())
        .map(|t| t.id)
        .collect();

    let placings = [TeamStatus::Champion, TeamStatus::RunnerUp];
    for (line, status) in single
        .lines
        .iter()
        .filter(|l| l.record.played > 0 && !departed.contains(&l.team_id))
        .zip(placings)
    {
        competition_teams::update_status(&mut *conn, line.team_id, status).await?;
        info!(
            competition_id = %completed.id,
            team_id = %line.team_id,
            placing = status.as_str(),
            "Final placing assigned"
        );
    }
    Ok(())
}
