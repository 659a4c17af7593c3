use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::fixtures::FixtureFormat;
use crate::engine::knockout::RoundCompleted;
use crate::engine::lifecycle::{self, MatchAction};
use crate::engine::outcome::{resolve_result, ResultKind, ScoreEntry};
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::common::types::NotificationKind;
use crate::gql::domains::competitions::service::{
    complete_if_finished, ensure_in_progress, lock_competition,
};
use crate::gql::domains::fixtures::service::on_round_completed;
use crate::gql::domains::participants::service::{check_shirt_number, refresh_participant_stats};
use crate::gql::domains::rounds::service::refresh_round_completion;
use crate::services::{notify, NotificationDispatcher, VenueDirectory};
use infra::models::{
    CompetitionParticipantRow, CompetitionRow, MatchEventRow, MatchLineupRow, MatchRow,
};
use infra::repos::{
    competition_participants, competition_rounds, competition_teams, match_events, match_lineups,
    matches, CreateLineupEntry, CreateMatch, CreateMatchEvent, MatchResult, MatchStatus,
    RecordResult,
};

const MAX_MINUTE: i32 = 150;

fn check_minute(what: &str, minute: i32) -> EngineResult<()> {
    if !(0..=MAX_MINUTE).contains(&minute) {
        return Err(CompetitionError::validation(format!(
            "{} must be between 0 and {}, got {}",
            what, MAX_MINUTE, minute
        )));
    }
    Ok(())
}

/// Lock the owning competition first, then the match. Every match workflow
/// takes the locks in this order.
async fn lock_scope(conn: &mut PgConnection, match_id: Uuid) -> EngineResult<(CompetitionRow, MatchRow)> {
    let unlocked = matches::get_by_id(&mut *conn, match_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("match", match_id))?;
    let competition = lock_competition(&mut *conn, unlocked.competition_id).await?;
    let locked = matches::get_for_update(&mut *conn, match_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("match", match_id))?;
    Ok((competition, locked))
}

async fn check_venue(
    venues: &dyn VenueDirectory,
    club_id: Uuid,
    venue_id: Option<Uuid>,
) -> EngineResult<()> {
    let Some(venue_id) = venue_id else {
        return Ok(());
    };
    let venue = venues
        .resolve(venue_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("venue", venue_id))?;
    if venue.club_id != club_id {
        return Err(CompetitionError::validation(format!(
            "venue {} belongs to a different club",
            venue.name
        )));
    }
    Ok(())
}

/// Follow-up once a match reached a terminal status: round completion, the
/// knockout round-completed event, and automatic completion of a league.
/// `competition` must be the current, locked row.
pub(crate) async fn after_terminal(
    conn: &mut PgConnection,
    config: &EngineConfig,
    competition: &CompetitionRow,
    row: &MatchRow,
) -> EngineResult<()> {
    let completed_round = match row.round_id {
        Some(round_id) => refresh_round_completion(&mut *conn, round_id).await?,
        None => None,
    };

    if FixtureFormat::for_type(competition.competition_type).is_knockout() {
        if let Some(round) = completed_round {
            let latest = competition_rounds::max_round_number(&mut *conn, competition.id).await?;
            if round.round_number == latest {
                on_round_completed(
                    &mut *conn,
                    config,
                    RoundCompleted {
                        competition_id: competition.id,
                        round_id: round.id,
                        round_number: round.round_number,
                    },
                )
                .await?;
            }
        }
        return Ok(());
    }

    complete_if_finished(&mut *conn, config, competition).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub competition_id: Uuid,
    pub round_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub scheduled_date_time: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub group_name: Option<String>,
}

/// Add an ad-hoc fixture to a drawn competition.
///
/// The caller (resolver) is responsible for:
/// - Authentication / authorization
/// - Parsing IDs
/// - Converting the output to GraphQL types
pub async fn create_match(
    pool: &sqlx::PgPool,
    venues: &dyn VenueDirectory,
    data: NewMatch,
) -> EngineResult<MatchRow> {
    if data.home_team_id == data.away_team_id {
        return Err(CompetitionError::validation("a team cannot play itself"));
    }

    let mut tx = pool.begin().await?;
    let competition = lock_competition(&mut tx, data.competition_id).await?;
    lifecycle::check_play_phase(&competition)?;
    check_venue(venues, competition.club_id, data.venue_id).await?;

    for team_id in [data.home_team_id, data.away_team_id] {
        let team = competition_teams::get_by_id(&mut *tx, team_id)
            .await?
            .ok_or_else(|| CompetitionError::not_found("team", team_id))?;
        if team.competition_id != competition.id {
            return Err(CompetitionError::validation(format!(
                "team {} is not part of this competition",
                team.name
            )));
        }
        if !team.status.is_drawable() {
            return Err(CompetitionError::validation(format!(
                "team {} is {} and cannot be scheduled",
                team.name,
                team.status.as_str()
            )));
        }
    }
    if let Some(round_id) = data.round_id {
        if FixtureFormat::for_type(competition.competition_type).is_knockout() {
            return Err(CompetitionError::conflict(
                "knockout rounds only hold drawn bracket ties",
            ));
        }
        let round = competition_rounds::get_by_id(&mut *tx, round_id)
            .await?
            .ok_or_else(|| CompetitionError::not_found("round", round_id))?;
        if round.competition_id != competition.id {
            return Err(CompetitionError::validation(
                "round belongs to a different competition",
            ));
        }
    }

    let row = matches::create(
        &mut *tx,
        CreateMatch {
            competition_id: competition.id,
            round_id: data.round_id,
            leg_number: None,
            bracket_position: None,
            group_name: data.group_name,
            status: MatchStatus::Scheduled,
            scheduled_date_time: data.scheduled_date_time,
            home_team_id: Some(data.home_team_id),
            away_team_id: Some(data.away_team_id),
            venue_id: data.venue_id,
        },
    )
    .await?;
    if let Some(round_id) = row.round_id {
        refresh_round_completion(&mut tx, round_id).await?;
    }
    tx.commit().await?;

    info!(competition_id = %row.competition_id, match_id = %row.id, "Match created");
    Ok(row)
}

pub async fn update_match(
    pool: &sqlx::PgPool,
    venues: &dyn VenueDirectory,
    id: Uuid,
    venue_id: Option<Uuid>,
    notes: Option<String>,
) -> EngineResult<MatchRow> {
    let mut tx = pool.begin().await?;
    let (competition, _) = lock_scope(&mut tx, id).await?;
    lifecycle::check_editable(&competition)?;
    check_venue(venues, competition.club_id, venue_id).await?;

    let row = matches::reschedule(&mut *tx, id, None, venue_id, notes).await?;
    tx.commit().await?;

    Ok(row)
}

/// Only fixtures that never kicked off and carry no events can be removed.
/// Bracket ties are never removed; cancel them or withdraw a team instead.
pub async fn delete_match(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<bool> {
    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, id).await?;
    lifecycle::check_editable(&competition)?;

    if current.bracket_position.is_some()
        || FixtureFormat::for_type(competition.competition_type).is_knockout()
    {
        return Err(CompetitionError::conflict(
            "bracket matches cannot be deleted",
        ));
    }

    if !matches!(
        current.status,
        MatchStatus::Scheduled | MatchStatus::Postponed | MatchStatus::Cancelled
    ) {
        return Err(CompetitionError::conflict(format!(
            "a {} match cannot be deleted",
            current.status.as_str()
        )));
    }
    if match_events::count_by_match(&mut *tx, id).await? > 0 {
        return Err(CompetitionError::conflict("match has recorded events and cannot be deleted"));
    }

    let deleted = matches::delete(&mut *tx, id).await?;
    if let Some(round_id) = current.round_id {
        refresh_round_completion(&mut tx, round_id).await?;
    }
    tx.commit().await?;

    info!(competition_id = %competition.id, match_id = %id, "Match deleted");
    Ok(deleted)
}

/// A requested move through the match state machine.
#[derive(Debug, Clone)]
pub enum StatusChange {
    Confirm,
    Start,
    Postpone {
        reason: Option<String>,
        new_date_time: Option<DateTime<Utc>>,
    },
    Reschedule {
        at: DateTime<Utc>,
    },
    Cancel {
        reason: Option<String>,
    },
    Abandon,
    Dispute,
}

impl StatusChange {
    fn action(&self) -> MatchAction {
        match self {
            StatusChange::Confirm => MatchAction::Confirm,
            StatusChange::Start => MatchAction::Start,
            StatusChange::Postpone { .. } => MatchAction::Postpone,
            StatusChange::Reschedule { .. } => MatchAction::Reschedule,
            StatusChange::Cancel { .. } => MatchAction::Cancel,
            StatusChange::Abandon => MatchAction::Abandon,
            StatusChange::Dispute => MatchAction::Dispute,
        }
    }

    fn with_new_time(&self) -> bool {
        matches!(
            self,
            StatusChange::Postpone {
                new_date_time: Some(_),
                ..
            }
        )
    }

    /// What subscribers hear about this change, if anything.
    pub fn notification(&self) -> Option<NotificationKind> {
        match self {
            StatusChange::Postpone {
                new_date_time: Some(_),
                ..
            } => Some(NotificationKind::Rescheduled),
            StatusChange::Postpone { .. } => Some(NotificationKind::Postponed),
            StatusChange::Reschedule { .. } => Some(NotificationKind::Rescheduled),
            StatusChange::Cancel { .. } => Some(NotificationKind::Cancelled),
            _ => None,
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            StatusChange::Postpone { reason, .. } | StatusChange::Cancel { reason } => {
                reason.as_deref()
            }
            _ => None,
        }
    }
}

/// Confirm, start, postpone, reschedule, cancel, abandon or dispute a match.
/// Notifications go out after commit and never affect the outcome.
pub async fn change_match_status(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    notifier: &dyn NotificationDispatcher,
    id: Uuid,
    change: StatusChange,
) -> EngineResult<MatchRow> {
    let mut tx = pool.begin().await?;
    let (mut competition, current) = lock_scope(&mut tx, id).await?;
    lifecycle::check_play_phase(&competition)?;

    let next = lifecycle::next_match_status(current.status, change.action(), change.with_new_time())?;

    let row = match &change {
        StatusChange::Confirm | StatusChange::Abandon | StatusChange::Dispute => {
            matches::set_status(&mut *tx, id, next).await?
        }
        StatusChange::Start => {
            competition = ensure_in_progress(&mut tx, config, &competition).await?;
            matches::set_status(&mut *tx, id, next).await?
        }
        StatusChange::Postpone {
            reason,
            new_date_time,
        } => matches::postpone(&mut *tx, id, next, reason.clone(), *new_date_time).await?,
        StatusChange::Reschedule { at } => {
            matches::reschedule(&mut *tx, id, Some(*at), None, None).await?;
            matches::set_status(&mut *tx, id, next).await?
        }
        StatusChange::Cancel { reason } => matches::cancel(&mut *tx, id, reason.clone()).await?,
    };

    if row.status.is_terminal() {
        after_terminal(&mut tx, config, &competition, &row).await?;
    }
    tx.commit().await?;

    info!(
        competition_id = %row.competition_id,
        match_id = %id,
        from = current.status.as_str(),
        to = row.status.as_str(),
        "Match status changed"
    );

    if let Some(kind) = change.notification() {
        notify(notifier, &row, kind, change.reason()).await;
    }
    Ok(row)
}

/// Record the score of a match and run the terminal follow-up.
///
/// Concurrent submissions queue on the competition lock; the second one sees
/// the terminal status and fails with a conflict.
pub async fn record_result(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    notifier: &dyn NotificationDispatcher,
    id: Uuid,
    entry: ScoreEntry,
    notes: Option<String>,
) -> EngineResult<MatchRow> {
    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, id).await?;
    lifecycle::check_play_phase(&competition)?;
    lifecycle::check_result_allowed(current.status)?;

    if current.home_team_id.is_none() || current.away_team_id.is_none() {
        return Err(CompetitionError::validation(
            "a result needs both a home and an away team",
        ));
    }
    let knockout = FixtureFormat::for_type(competition.competition_type).is_knockout();
    if knockout && entry.kind == ResultKind::Void {
        return Err(CompetitionError::validation(
            "knockout results cannot be voided; record a walkover instead",
        ));
    }
    let resolved = resolve_result(entry, config.walkover_goals, knockout)?;

    let competition = ensure_in_progress(&mut tx, config, &competition).await?;
    let row = matches::record_result(
        &mut *tx,
        id,
        RecordResult {
            status: resolved.status,
            result: resolved.result,
            home_score: resolved.home_score,
            away_score: resolved.away_score,
            notes,
        },
    )
    .await?;
    if row.result == MatchResult::Void {
        refresh_participant_stats(&mut tx, competition.id).await?;
    }
    after_terminal(&mut tx, config, &competition, &row).await?;
    tx.commit().await?;

    info!(
        competition_id = %row.competition_id,
        match_id = %id,
        result = row.result.as_str(),
        home_score = row.home_score,
        away_score = row.away_score,
        "Result recorded"
    );

    notify(notifier, &row, NotificationKind::ResultRecorded, None).await;
    Ok(row)
}

async fn team_participant(
    conn: &mut PgConnection,
    participant_id: Uuid,
    team_id: Uuid,
) -> EngineResult<CompetitionParticipantRow> {
    let participant = competition_participants::get_by_id(&mut *conn, participant_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("participant", participant_id))?;
    if participant.team_id != team_id {
        return Err(CompetitionError::validation(format!(
            "{} does not play for this team",
            participant.display_name
        )));
    }
    Ok(participant)
}

fn check_team_in_match(row: &MatchRow, team_id: Uuid) -> EngineResult<()> {
    if !row.involves(team_id) {
        return Err(CompetitionError::validation(
            "team does not play in this match",
        ));
    }
    Ok(())
}

pub async fn add_match_event(pool: &sqlx::PgPool, data: CreateMatchEvent) -> EngineResult<MatchEventRow> {
    check_minute("minute", data.minute)?;
    if data.assist_participant_id.is_some() && !data.event_type.allows_assist() {
        return Err(CompetitionError::validation(format!(
            "a {} cannot carry an assist",
            data.event_type.as_str()
        )));
    }
    if data.assist_participant_id.is_some() && data.assist_participant_id == data.participant_id {
        return Err(CompetitionError::validation(
            "a player cannot assist their own goal",
        ));
    }

    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, data.match_id).await?;
    lifecycle::check_events_allowed(current.status)?;
    check_team_in_match(&current, data.team_id)?;
    if let Some(pid) = data.participant_id {
        team_participant(&mut tx, pid, data.team_id).await?;
    }
    if let Some(aid) = data.assist_participant_id {
        team_participant(&mut tx, aid, data.team_id).await?;
    }

    let event = match_events::create(&mut *tx, data).await?;
    refresh_participant_stats(&mut tx, competition.id).await?;
    tx.commit().await?;

    info!(
        match_id = %event.match_id,
        event_type = event.event_type.as_str(),
        minute = event.minute,
        "Match event recorded"
    );
    Ok(event)
}

pub async fn delete_match_event(pool: &sqlx::PgPool, event_id: Uuid) -> EngineResult<bool> {
    let event = match_events::get_by_id(pool, event_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("match event", event_id))?;

    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, event.match_id).await?;
    lifecycle::check_events_allowed(current.status)?;

    let deleted = match_events::delete(&mut *tx, event_id).await?;
    refresh_participant_stats(&mut tx, competition.id).await?;
    tx.commit().await?;

    Ok(deleted)
}

/// Add or replace one participant's lineup entry.
pub async fn set_lineup_entry(pool: &sqlx::PgPool, data: CreateLineupEntry) -> EngineResult<MatchLineupRow> {
    check_shirt_number(data.shirt_number)?;
    if let Some(minutes) = data.minutes_played {
        check_minute("minutesPlayed", minutes)?;
    }

    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, data.match_id).await?;
    lifecycle::check_events_allowed(current.status)?;
    check_team_in_match(&current, data.team_id)?;
    let participant = team_participant(&mut tx, data.participant_id, data.team_id).await?;
    if !participant.role.plays() {
        return Err(CompetitionError::validation(format!(
            "{} is registered as {} and cannot be in a lineup",
            participant.display_name,
            participant.role.as_str()
        )));
    }

    let entry = match_lineups::upsert(&mut *tx, data).await?;
    refresh_participant_stats(&mut tx, competition.id).await?;
    tx.commit().await?;

    Ok(entry)
}

pub async fn remove_lineup_entry(
    pool: &sqlx::PgPool,
    match_id: Uuid,
    participant_id: Uuid,
) -> EngineResult<MatchLineupRow> {
    let mut tx = pool.begin().await?;
    let (competition, current) = lock_scope(&mut tx, match_id).await?;
    lifecycle::check_events_allowed(current.status)?;

    let removed = match_lineups::delete_entry(&mut *tx, match_id, participant_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("lineup entry", participant_id))?;
    refresh_participant_stats(&mut tx, competition.id).await?;
    tx.commit().await?;

    Ok(removed)
}
