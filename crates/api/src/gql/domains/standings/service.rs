use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::standings::{self, PreviousStanding, Standings, StandingsRules, TeamEntry};
use crate::engine::{CompetitionError, EngineResult};
use infra::models::CompetitionRow;
use infra::repos::{
    competition_standings, competition_teams, competitions, matches, UpsertStanding,
};

/// Reduce the competition's matches to a table without writing anything.
pub async fn compute(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
    group: Option<&str>,
) -> EngineResult<Standings> {
    let teams = competition_teams::list_by_competition(&mut *conn, competition.id, None).await?;
    let played = matches::list_by_competition(&mut *conn, competition.id).await?;
    let stored = competition_standings::list_by_competition(&mut *conn, competition.id).await?;

    let entries: Vec<TeamEntry> = teams.iter().map(TeamEntry::from).collect();
    let previous: HashMap<Uuid, PreviousStanding> = stored
        .iter()
        .map(|row| (row.team_id, PreviousStanding::from(row)))
        .collect();
    let rules = StandingsRules::for_competition(competition, config.standings_form_length);

    standings::calculate(&entries, &played, &previous, &rules, group)
}

/// Standings read. Recomputed on every call.
pub async fn read_standings(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
    group: Option<&str>,
) -> EngineResult<Standings> {
    let mut conn = pool.acquire().await?;
    let competition = competitions::get_by_id(&mut *conn, competition_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("competition", competition_id))?;
    compute(&mut conn, config, &competition, group).await
}

/// Replace the stored table and the cached team aggregates. Runs on the
/// caller's transaction, which must hold the competition row lock.
pub async fn recalculate_in_tx(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
) -> EngineResult<Standings> {
    let table = compute(&mut *conn, config, competition, None).await?;

    let mut listed = Vec::new();
    for line in table.tables.iter().flat_map(|t| t.lines.iter()) {
        competition_standings::upsert(
            &mut *conn,
            UpsertStanding {
                competition_id: competition.id,
                team_id: line.team_id,
                group_name: line.group_name.clone(),
                position: line.position,
                previous_position: line.previous_position,
                played: line.record.played,
                won: line.record.won,
                drawn: line.record.drawn,
                lost: line.record.lost,
                goals_for: line.record.goals_for,
                goals_against: line.record.goals_against,
                goal_difference: line.record.goal_difference(),
                points: line.record.points,
                form: line.form.clone(),
                zone: line.zone.map(|z| z.as_str().to_string()),
                is_promoted: line.is_promoted,
                is_relegated: line.is_relegated,
            },
        )
        .await?;
        listed.push(line.team_id);
    }
    competition_standings::delete_except(&mut *conn, competition.id, &listed).await?;

    for (team_id, record) in &table.records {
        competition_teams::set_aggregates(&mut *conn, *team_id, record.aggregates()).await?;
    }

    info!(
        competition_id = %competition.id,
        teams = listed.len(),
        "Standings recalculated"
    );
    Ok(table)
}

/// Explicit recalculation trigger.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Converting the output to GraphQL types
pub async fn recalculate_standings(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
) -> EngineResult<Standings> {
    let mut tx = pool.begin().await?;
    let competition = competitions::get_for_update(&mut *tx, competition_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("competition", competition_id))?;

    let table = recalculate_in_tx(&mut tx, config, &competition).await?;
    tx.commit().await?;
    Ok(table)
}
