use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::seq::SliceRandom;
use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::fixtures::{self, FixtureFormat, PlannedRound, ScheduleOptions};
use crate::engine::knockout::{self, Advancement, DrawEntry, RoundCompleted, SlotResult};
use crate::engine::lifecycle;
use crate::engine::outcome::MatchOutcome;
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::domains::competitions::service::{
    complete_if_finished, ensure_in_progress, lock_competition,
};
use crate::gql::domains::rounds::service::refresh_round_completion;
use infra::models::{CompetitionRoundRow, CompetitionRow, CompetitionTeamRow, MatchRow};
use infra::repos::{
    competition_rounds, competition_teams, competitions, matches, CompetitionStatus, CreateMatch,
    CreateRound, MatchStatus, TeamStatus,
};

/// Caller-supplied knobs for a schedule or draw. Unset values fall back to the
/// competition settings and then to the engine defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub team_ids: Option<Vec<Uuid>>,
    pub home_and_away: Option<bool>,
    pub randomize_order: bool,
    pub seed_teams: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub days_between_rounds: Option<i64>,
    pub force_regenerate: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedSchedule {
    pub competition: CompetitionRow,
    pub rounds: Vec<CompetitionRoundRow>,
    pub matches: Vec<MatchRow>,
}

/// What consuming a round-completed event led to.
#[derive(Debug, Clone)]
pub enum KnockoutProgress {
    NextRound(CompetitionRoundRow),
    Decided {
        champion: Option<Uuid>,
        runner_up: Option<Uuid>,
    },
}

fn schedule_start(competition: &CompetitionRow, requested: Option<DateTime<Utc>>) -> DateTime<Utc> {
    requested
        .or_else(|| {
            competition
                .start_date
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
        .unwrap_or_else(Utc::now)
}

/// Pick the teams taking part, in draw order.
fn select_teams(
    drawable: &[CompetitionTeamRow],
    requested: Option<&[Uuid]>,
) -> EngineResult<Vec<CompetitionTeamRow>> {
    let Some(ids) = requested else {
        return Ok(drawable.to_vec());
    };

    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| {
            if !seen.insert(*id) {
                return Err(CompetitionError::validation(format!(
                    "team {} is listed more than once",
                    id
                )));
            }
            drawable.iter().find(|t| t.id == *id).cloned().ok_or_else(|| {
                CompetitionError::validation(format!(
                    "team {} is not a confirmed team of this competition",
                    id
                ))
            })
        })
        .collect()
}

/// Teams keyed by group name, each group in draw order.
fn group_teams(teams: &[CompetitionTeamRow]) -> EngineResult<Vec<(String, Vec<Uuid>)>> {
    let mut groups: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
    for team in teams {
        let Some(group) = team.group_name.as_deref().filter(|g| !g.trim().is_empty()) else {
            return Err(CompetitionError::validation(format!(
                "team {} has no group; every team of a group tournament needs one",
                team.name
            )));
        };
        groups.entry(group.to_string()).or_default().push(team.id);
    }
    Ok(groups.into_iter().collect())
}

fn same_team_set(a: &[CompetitionTeamRow], b: &[CompetitionTeamRow]) -> bool {
    let left: HashSet<(Uuid, TeamStatus)> = a.iter().map(|t| (t.id, t.status)).collect();
    let right: HashSet<(Uuid, TeamStatus)> = b.iter().map(|t| (t.id, t.status)).collect();
    left == right
}

/// Store a planned round, reusing a round row with the same number.
pub(crate) async fn persist_round(
    conn: &mut PgConnection,
    competition_id: Uuid,
    planned: &PlannedRound,
) -> EngineResult<(CompetitionRoundRow, Vec<MatchRow>)> {
    let round = match competition_rounds::get_by_number(&mut *conn, competition_id, planned.number)
        .await?
    {
        Some(existing) => existing,
        None => {
            competition_rounds::create(
                &mut *conn,
                CreateRound {
                    competition_id,
                    round_number: planned.number,
                    name: planned.name.clone(),
                    start_date: Some(planned.starts_at),
                    end_date: None,
                },
            )
            .await?
        }
    };

    let mut created = Vec::with_capacity(planned.matches.len());
    for m in &planned.matches {
        let row = matches::create(
            &mut *conn,
            CreateMatch {
                competition_id,
                round_id: Some(round.id),
                leg_number: Some(m.leg_number),
                bracket_position: m.bracket_position,
                group_name: m.group_name.clone(),
                status: if m.is_bye {
                    MatchStatus::Bye
                } else {
                    MatchStatus::Scheduled
                },
                scheduled_date_time: planned.starts_at,
                home_team_id: m.home_team_id,
                away_team_id: m.away_team_id,
                venue_id: None,
            },
        )
        .await?;
        created.push(row);
    }

    Ok((round, created))
}

/// Build and store the whole schedule (round-robin) or the first round
/// (knockout) in one transaction.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Parsing IDs
/// - Converting the output to GraphQL types
async fn build_schedule(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
    knockout_requested: bool,
    options: GenerateOptions,
) -> EngineResult<GeneratedSchedule> {
    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, competition_id).await?;

    let format = FixtureFormat::for_type(competition.competition_type);
    if format.is_knockout() != knockout_requested {
        return Err(CompetitionError::validation(format!(
            "{} competitions are scheduled with {}",
            competition.competition_type.as_str(),
            format.operation()
        )));
    }
    lifecycle::check_generation_allowed(&competition, options.force_regenerate)?;

    let regenerating = competition.status == CompetitionStatus::DrawComplete;
    if regenerating {
        let played = matches::count_played(&mut *tx, competition.id).await?;
        if played > 0 {
            return Err(CompetitionError::conflict(format!(
                "{} matches have already been played or moved on; the schedule can no longer be regenerated",
                played
            )));
        }
    }

    let snapshot = competition_teams::list_drawable(&mut *tx, competition.id).await?;
    let mut teams = select_teams(&snapshot, options.team_ids.as_deref())?;
    lifecycle::check_team_count(&competition, teams.len())?;
    if options.randomize_order {
        teams.shuffle(&mut rand::rng());
    }

    let days_between_rounds = options
        .days_between_rounds
        .unwrap_or(config.default_days_between_rounds);
    if days_between_rounds < 0 {
        return Err(CompetitionError::validation(format!(
            "daysBetweenRounds must not be negative, got {}",
            days_between_rounds
        )));
    }
    let schedule = ScheduleOptions {
        home_and_away: options.home_and_away.unwrap_or(competition.home_and_away),
        start: schedule_start(&competition, options.start_date),
        days_between_rounds,
    };

    let ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();
    let (planned, positions): (Vec<PlannedRound>, Vec<(Uuid, i32)>) = match format {
        FixtureFormat::RoundRobin => (
            fixtures::round_robin(&ids, None, &schedule)?,
            ids.iter().enumerate().map(|(i, id)| (*id, i as i32 + 1)).collect(),
        ),
        FixtureFormat::GroupedRoundRobin => (
            fixtures::grouped_round_robin(&group_teams(&teams)?, &schedule)?,
            ids.iter().enumerate().map(|(i, id)| (*id, i as i32 + 1)).collect(),
        ),
        FixtureFormat::Knockout => {
            let entries: Vec<DrawEntry> = teams
                .iter()
                .map(|t| DrawEntry {
                    team_id: t.id,
                    seed: t.seed_number,
                })
                .collect();
            let draw = knockout::draw(&entries, options.seed_teams, 1, schedule.start)?;
            (vec![draw.first_round], draw.draw_positions)
        }
    };

    if regenerating {
        let dropped = matches::delete_regenerable(&mut *tx, competition.id).await?;
        let emptied = competition_rounds::delete_empty(&mut *tx, competition.id).await?;
        info!(
            competition_id = %competition.id,
            dropped,
            emptied,
            "Unplayed schedule removed for regeneration"
        );
    }

    let mut rounds = Vec::with_capacity(planned.len());
    let mut created = Vec::new();
    for round in &planned {
        let (row, round_matches) = persist_round(&mut tx, competition.id, round).await?;
        rounds.push(row);
        created.extend(round_matches);
    }

    for team in &snapshot {
        let position = positions.iter().find(|(id, _)| *id == team.id).map(|(_, p)| *p);
        competition_teams::set_draw_position(&mut *tx, team.id, position).await?;
    }

    let recheck = competition_teams::list_drawable(&mut *tx, competition.id).await?;
    if !same_team_set(&snapshot, &recheck) {
        warn!(
            competition_id = %competition.id,
            before = snapshot.len(),
            after = recheck.len(),
            "Confirmed teams changed during fixture generation"
        );
        return Err(CompetitionError::validation(
            "the confirmed teams changed while fixtures were being generated; try again",
        ));
    }

    let competition = if regenerating {
        competition
    } else {
        competitions::update_status(&mut *tx, competition.id, CompetitionStatus::DrawComplete, None)
            .await?
    };

    // first-round byes may already complete the opening round
    for round in &rounds {
        refresh_round_completion(&mut tx, round.id).await?;
    }
    tx.commit().await?;

    info!(
        competition_id = %competition.id,
        format = format.operation(),
        teams = teams.len(),
        rounds = rounds.len(),
        matches = created.len(),
        regenerated = regenerating,
        "Fixtures generated"
    );

    Ok(GeneratedSchedule {
        competition,
        rounds,
        matches: created,
    })
}

/// Round-robin schedule for League, Friendly and Tournament competitions.
pub async fn generate_fixtures(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
    options: GenerateOptions,
) -> EngineResult<GeneratedSchedule> {
    build_schedule(pool, config, competition_id, false, options).await
}

/// First knockout round for Cup and Knockout competitions.
pub async fn perform_draw(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
    options: GenerateOptions,
) -> EngineResult<GeneratedSchedule> {
    build_schedule(pool, config, competition_id, true, options).await
}

fn slot_results(round_matches: &[MatchRow]) -> EngineResult<Vec<SlotResult>> {
    round_matches
        .iter()
        .map(|m| {
            let bracket_position = m.bracket_position.ok_or_else(|| {
                CompetitionError::invariant(format!("knockout match {} has no bracket position", m.id))
            })?;
            let outcome = MatchOutcome::from_row(m)?;
            Ok(SlotResult {
                bracket_position,
                winner: outcome.winner(),
                loser: outcome.loser(),
            })
        })
        .collect()
}

/// Consume a round-completed event: eliminate the losers, then either store
/// the next round or settle the final. A next round made only of byes is
/// complete on arrival and advances straight away.
pub(crate) async fn on_round_completed(
    conn: &mut PgConnection,
    config: &EngineConfig,
    event: RoundCompleted,
) -> EngineResult<KnockoutProgress> {
    let mut event = event;
    loop {
        let round_matches = matches::list_by_round(&mut *conn, event.round_id).await?;
        if let Some(open) = round_matches.iter().find(|m| !m.status.is_terminal()) {
            return Err(CompetitionError::invariant(format!(
                "round {} was reported complete but match {} is {}",
                event.round_number,
                open.id,
                open.status.as_str()
            )));
        }
        let slots = slot_results(&round_matches)?;

        for loser in slots.iter().filter_map(|s| s.loser) {
            if let Some(team) = competition_teams::get_by_id(&mut *conn, loser).await? {
                if !team.status.has_left() && team.status != TeamStatus::Eliminated {
                    competition_teams::update_status(&mut *conn, loser, TeamStatus::Eliminated)
                        .await?;
                }
            }
        }

        let last_kickoff = round_matches
            .iter()
            .map(|m| m.scheduled_date_time)
            .max()
            .unwrap_or_else(Utc::now);
        let starts_at = last_kickoff + Duration::days(config.default_days_between_rounds);

        match knockout::advance(&slots, event.round_number + 1, starts_at)? {
            Advancement::NextRound(planned) => {
                let (round, _) = persist_round(&mut *conn, event.competition_id, &planned).await?;
                info!(
                    competition_id = %event.competition_id,
                    round_number = round.round_number,
                    name = %round.name,
                    "Knockout round drawn"
                );
                if refresh_round_completion(&mut *conn, round.id).await?.is_some() {
                    event = RoundCompleted {
                        competition_id: event.competition_id,
                        round_id: round.id,
                        round_number: round.round_number,
                    };
                    continue;
                }
                return Ok(KnockoutProgress::NextRound(round));
            }
            Advancement::Decided {
                champion,
                runner_up,
            } => {
                if let Some(id) = champion {
                    competition_teams::update_status(&mut *conn, id, TeamStatus::Champion).await?;
                }
                if let Some(id) = runner_up {
                    competition_teams::update_status(&mut *conn, id, TeamStatus::RunnerUp).await?;
                }

                let competition = competitions::get_by_id(&mut *conn, event.competition_id)
                    .await?
                    .ok_or_else(|| CompetitionError::not_found("competition", event.competition_id))?;
                let competition = ensure_in_progress(&mut *conn, config, &competition).await?;
                complete_if_finished(&mut *conn, config, &competition).await?;

                info!(
                    competition_id = %event.competition_id,
                    champion = ?champion,
                    runner_up = ?runner_up,
                    "Knockout decided"
                );
                return Ok(KnockoutProgress::Decided {
                    champion,
                    runner_up,
                });
            }
        }
    }
}

/// Explicit trigger for the round-completed event of the latest round.
pub async fn advance_knockout_round(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
) -> EngineResult<KnockoutProgress> {
    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, competition_id).await?;

    if !FixtureFormat::for_type(competition.competition_type).is_knockout() {
        return Err(CompetitionError::validation(format!(
            "{} competitions have no knockout rounds",
            competition.competition_type.as_str()
        )));
    }
    lifecycle::check_play_phase(&competition)?;

    let latest = competition_rounds::max_round_number(&mut *tx, competition_id).await?;
    let round = competition_rounds::get_by_number(&mut *tx, competition_id, latest)
        .await?
        .ok_or_else(|| CompetitionError::conflict("the draw has not been made yet"))?;

    let round_matches = matches::list_by_round(&mut *tx, round.id).await?;
    let open = round_matches.iter().filter(|m| !m.status.is_terminal()).count();
    if round_matches.is_empty() || open > 0 {
        return Err(CompetitionError::conflict(format!(
            "{} is not complete ({} matches still open)",
            round.name, open
        )));
    }
    refresh_round_completion(&mut tx, round.id).await?;

    let progress = on_round_completed(
        &mut tx,
        config,
        RoundCompleted {
            competition_id,
            round_id: round.id,
            round_number: round.round_number,
        },
    )
    .await?;
    tx.commit().await?;

    Ok(progress)
}
