use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::fixtures::FixtureFormat;
use crate::engine::lifecycle;
use crate::engine::outcome::{resolve_result, ResultKind, ScoreEntry};
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::domains::competitions::service::{
    complete_if_finished, ensure_in_progress, lock_competition,
};
use crate::gql::domains::matches::service::after_terminal;
use crate::gql::domains::participants::service::refresh_participant_stats;
use crate::gql::domains::rounds::service::refresh_round_completion;
use crate::gql::domains::standings::service as standings_service;
use infra::models::{CompetitionRow, CompetitionTeamRow, MatchRow};
use infra::repos::{
    competition_teams, competitions, matches, CreateTeam, MatchResult, RecordResult, TeamStatus,
    UpdateTeam,
};

async fn load_team(conn: &mut PgConnection, id: Uuid) -> EngineResult<CompetitionTeamRow> {
    competition_teams::get_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("team", id))
}

fn clean_name(name: &str) -> EngineResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CompetitionError::validation("team name must not be empty"));
    }
    Ok(name.to_string())
}

fn check_seed(seed: Option<i32>) -> EngineResult<()> {
    match seed {
        Some(s) if s < 1 => Err(CompetitionError::validation(format!(
            "seed numbers start at 1, got {}",
            s
        ))),
        _ => Ok(()),
    }
}

async fn check_name_free(
    conn: &mut PgConnection,
    competition_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> EngineResult<()> {
    if competition_teams::name_taken(&mut *conn, competition_id, name, exclude).await? {
        return Err(CompetitionError::validation(format!(
            "a team named '{}' is already registered in this competition",
            name
        )));
    }
    Ok(())
}

/// Register a team. Entries count against `max_teams` until they withdraw.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Parsing IDs
/// - Converting the output to GraphQL types
pub async fn register_team(pool: &sqlx::PgPool, data: CreateTeam) -> EngineResult<CompetitionTeamRow> {
    let name = clean_name(&data.name)?;
    check_seed(data.seed_number)?;

    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, data.competition_id).await?;
    let entries = competition_teams::count_active_entries(&mut *tx, competition.id).await?;
    lifecycle::check_registration(&competition, entries, Utc::now())?;
    check_name_free(&mut tx, competition.id, &name, None).await?;

    let team = competition_teams::create(
        &mut *tx,
        CreateTeam {
            name,
            group_name: data.group_name.map(|g| g.trim().to_string()).filter(|g| !g.is_empty()),
            ..data
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        competition_id = %team.competition_id,
        team_id = %team.id,
        name = %team.name,
        "Team registered"
    );
    Ok(team)
}

/// Registered → Confirmed.
pub async fn approve_team(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<CompetitionTeamRow> {
    let mut tx = pool.begin().await?;
    let team = load_team(&mut tx, id).await?;
    let competition = lock_competition(&mut tx, team.competition_id).await?;
    lifecycle::check_editable(&competition)?;

    if team.status != TeamStatus::Registered {
        return Err(CompetitionError::conflict(format!(
            "only registered teams can be approved (team is {})",
            team.status.as_str()
        )));
    }
    let approved = competition_teams::update_status(&mut *tx, id, TeamStatus::Confirmed).await?;
    tx.commit().await?;

    info!(team_id = %id, competition_id = %approved.competition_id, "Team approved");
    Ok(approved)
}

pub async fn update_team(
    pool: &sqlx::PgPool,
    id: Uuid,
    data: UpdateTeam,
) -> EngineResult<CompetitionTeamRow> {
    check_seed(data.seed_number)?;
    let name = data.name.as_deref().map(clean_name).transpose()?;

    let mut tx = pool.begin().await?;
    let team = load_team(&mut tx, id).await?;
    let competition = lock_competition(&mut tx, team.competition_id).await?;
    lifecycle::check_team_details_editable(&competition)?;
    if let Some(name) = name.as_deref() {
        check_name_free(&mut tx, competition.id, name, Some(id)).await?;
    }

    let updated = competition_teams::update(&mut *tx, id, UpdateTeam { name, ..data })
        .await?
        .ok_or_else(|| CompetitionError::not_found("team", id))?;
    tx.commit().await?;

    Ok(updated)
}

/// What happens to one unplayed match of a team that leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalStep {
    Remove(Uuid),
    /// The opponent advances; `kind` names the side awarded the walkover.
    AwardWalkover { match_id: Uuid, kind: ResultKind },
}

/// Round-robin schedules simply lose the team's open fixtures. Knockout
/// opponents are awarded the tie so the bracket stays complete.
pub fn plan_withdrawal(format: FixtureFormat, team_id: Uuid, open: &[MatchRow]) -> Vec<WithdrawalStep> {
    open.iter()
        .filter(|m| m.involves(team_id))
        .map(|m| {
            if !format.is_knockout() {
                return WithdrawalStep::Remove(m.id);
            }
            let opponent_home = m.away_team_id == Some(team_id);
            let opponent = if opponent_home {
                m.home_team_id
            } else {
                m.away_team_id
            };
            match opponent {
                None => WithdrawalStep::Remove(m.id),
                Some(_) if opponent_home => WithdrawalStep::AwardWalkover {
                    match_id: m.id,
                    kind: ResultKind::HomeWalkover,
                },
                Some(_) => WithdrawalStep::AwardWalkover {
                    match_id: m.id,
                    kind: ResultKind::AwayWalkover,
                },
            }
        })
        .collect()
}

/// Withdraw or disqualify a team and apply the cascade to its fixtures.
///
/// Played results stay in the table unless `void_played` is set, in which case
/// they are marked Void. Everything runs in one transaction under the
/// competition lock.
pub async fn remove_team(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    id: Uuid,
    status: TeamStatus,
    reason: Option<String>,
    void_played: bool,
) -> EngineResult<CompetitionTeamRow> {
    if !status.has_left() {
        return Err(CompetitionError::invariant(format!(
            "{} is not a withdrawal status",
            status.as_str()
        )));
    }

    let mut tx = pool.begin().await?;
    let team = load_team(&mut tx, id).await?;
    let mut competition = lock_competition(&mut tx, team.competition_id).await?;
    lifecycle::check_editable(&competition)?;
    if team.status.has_left() {
        return Err(CompetitionError::conflict(format!(
            "team is already {}",
            team.status.as_str()
        )));
    }

    competition_teams::mark_withdrawn(&mut *tx, id, status, reason).await?;

    let format = FixtureFormat::for_type(competition.competition_type);
    let open = matches::list_open_for_team(&mut *tx, competition.id, id).await?;
    let mut removed = 0;
    let mut touched_rounds = BTreeSet::new();
    let mut awarded = Vec::new();
    for step in plan_withdrawal(format, id, &open) {
        match step {
            WithdrawalStep::Remove(match_id) => {
                matches::delete(&mut *tx, match_id).await?;
                removed += 1;
                touched_rounds.extend(
                    open.iter()
                        .find(|m| m.id == match_id)
                        .and_then(|m| m.round_id),
                );
            }
            WithdrawalStep::AwardWalkover { match_id, kind } => {
                let resolved = resolve_result(
                    ScoreEntry {
                        home_score: None,
                        away_score: None,
                        kind,
                    },
                    config.walkover_goals,
                    true,
                )?;
                let row = matches::record_result(
                    &mut *tx,
                    match_id,
                    RecordResult {
                        status: resolved.status,
                        result: resolved.result,
                        home_score: resolved.home_score,
                        away_score: resolved.away_score,
                        notes: Some(format!("Walkover: opponent {}", status.as_str())),
                    },
                )
                .await?;
                awarded.push(row);
            }
        }
    }

    // rounds left with only terminal matches are now complete
    for round_id in touched_rounds {
        refresh_round_completion(&mut tx, round_id).await?;
    }

    let mut voided = 0;
    if void_played {
        for played in matches::list_completed_for_team(&mut *tx, competition.id, id).await? {
            if played.result != MatchResult::Void {
                matches::void_result(&mut *tx, played.id).await?;
                voided += 1;
            }
        }
        if voided > 0 {
            refresh_participant_stats(&mut tx, competition.id).await?;
        }
    }

    if !awarded.is_empty() {
        competition = ensure_in_progress(&mut tx, config, &competition).await?;
    }
    for row in &awarded {
        after_terminal(&mut tx, config, &competition, row).await?;
        competition = reload(&mut tx, competition.id).await?;
    }
    if awarded.is_empty() && removed > 0 && !format.is_knockout() {
        complete_if_finished(&mut tx, config, &competition).await?;
    }

    if matches::count_played(&mut *tx, competition.id).await? > 0 {
        let competition = reload(&mut tx, competition.id).await?;
        standings_service::recalculate_in_tx(&mut tx, config, &competition).await?;
    }

    let team = load_team(&mut tx, id).await?;
    tx.commit().await?;

    info!(
        competition_id = %team.competition_id,
        team_id = %id,
        status = status.as_str(),
        removed,
        walkovers = awarded.len(),
        voided,
        "Team left the competition"
    );
    Ok(team)
}

async fn reload(conn: &mut PgConnection, id: Uuid) -> EngineResult<CompetitionRow> {
    competitions::get_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("competition", id))
}
