//! Guards for the competition and match state machines.
//!
//! Everything here is a pure decision over rows already loaded (and locked) by
//! the calling workflow. Persisting the outcome is the caller's job.

use chrono::{DateTime, Utc};
use infra::models::CompetitionRow;
use infra::repos::{CompetitionStatus, MatchStatus};

use super::error::{CompetitionError, EngineResult};

/// Match totals a competition transition may depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchCounts {
    pub total: i64,
    pub open: i64,
}

/// An accepted competition transition and what has to happen with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: CompetitionStatus,
    pub resume_status: Option<CompetitionStatus>,
    pub activates_teams: bool,
}

impl Transition {
    fn to(status: CompetitionStatus) -> Self {
        Transition {
            to: status,
            resume_status: None,
            activates_teams: status == CompetitionStatus::InProgress,
        }
    }
}

pub fn check_competition_transition(
    competition: &CompetitionRow,
    to: CompetitionStatus,
    counts: MatchCounts,
) -> EngineResult<Transition> {
    use CompetitionStatus::*;

    let from = competition.status;
    if from == to {
        return Err(CompetitionError::conflict(format!(
            "competition is already {}",
            to.as_str()
        )));
    }

    match to {
        Archived => Ok(Transition::to(Archived)),
        Cancelled | Postponed if from.is_terminal() => Err(CompetitionError::conflict(format!(
            "cannot move a {} competition to {}",
            from.as_str(),
            to.as_str()
        ))),
        Cancelled => Ok(Transition::to(Cancelled)),
        Postponed => Ok(Transition {
            to: Postponed,
            resume_status: Some(from),
            activates_teams: false,
        }),
        DrawComplete => Err(CompetitionError::conflict(
            "a competition reaches draw_complete through generateFixtures or performDraw",
        )),
        _ if from == Postponed => match competition.resume_status {
            Some(resume) if resume == to => {
                if to == Completed {
                    check_completable(counts)?;
                }
                Ok(Transition::to(to))
            }
            Some(resume) => Err(CompetitionError::conflict(format!(
                "a postponed competition can only resume to {}",
                resume.as_str()
            ))),
            None => Err(CompetitionError::invariant(format!(
                "competition {} is postponed without a status to resume to",
                competition.id
            ))),
        },
        Published if from == Draft => {
            check_publishable(competition)?;
            Ok(Transition::to(Published))
        }
        RegistrationOpen if from == Published => Ok(Transition::to(RegistrationOpen)),
        RegistrationClosed if from == RegistrationOpen => Ok(Transition::to(RegistrationClosed)),
        InProgress if from == DrawComplete => Ok(Transition::to(InProgress)),
        Completed if from == InProgress => {
            check_completable(counts)?;
            Ok(Transition::to(Completed))
        }
        _ => Err(CompetitionError::conflict(format!(
            "cannot move a competition from {} to {}",
            from.as_str(),
            to.as_str()
        ))),
    }
}

/// The status a postponed competition returns to.
pub fn resume_target(competition: &CompetitionRow) -> EngineResult<CompetitionStatus> {
    if competition.status != CompetitionStatus::Postponed {
        return Err(CompetitionError::conflict(format!(
            "only a postponed competition can be resumed (currently {})",
            competition.status.as_str()
        )));
    }
    competition.resume_status.ok_or_else(|| {
        CompetitionError::invariant(format!(
            "competition {} is postponed without a status to resume to",
            competition.id
        ))
    })
}

pub fn check_publishable(competition: &CompetitionRow) -> EngineResult<()> {
    if competition.name.trim().is_empty() {
        return Err(CompetitionError::validation(
            "a competition needs a name before it can be published",
        ));
    }
    match (competition.start_date, competition.end_date) {
        (Some(start), Some(end)) if end < start => Err(CompetitionError::validation(
            "competition end date is before its start date",
        )),
        (Some(_), Some(_)) => Ok(()),
        _ => Err(CompetitionError::validation(
            "a competition needs a start and end date before it can be published",
        )),
    }
}

fn check_completable(counts: MatchCounts) -> EngineResult<()> {
    if counts.total == 0 {
        return Err(CompetitionError::conflict(
            "a competition without matches cannot be completed",
        ));
    }
    if counts.open > 0 {
        return Err(CompetitionError::conflict(format!(
            "competition still has {} unfinished matches",
            counts.open
        )));
    }
    Ok(())
}

/// Team-count guard applied when the draw is made.
pub fn check_team_count(competition: &CompetitionRow, count: usize) -> EngineResult<()> {
    let count = count as i64;
    let min = i64::from(competition.min_teams);
    if count < min {
        return Err(CompetitionError::validation(format!(
            "competition requires at least {} confirmed teams, found {}",
            min, count
        )));
    }
    if let Some(max) = competition.max_teams {
        if count > i64::from(max) {
            return Err(CompetitionError::validation(format!(
                "competition allows at most {} teams, found {}",
                max, count
            )));
        }
    }
    if competition.is_team_based && count < 2 {
        return Err(CompetitionError::validation(format!(
            "competition requires at least 2 confirmed teams, found {}",
            count
        )));
    }
    Ok(())
}

/// Completed, cancelled and archived competitions are read-only.
pub fn check_editable(competition: &CompetitionRow) -> EngineResult<()> {
    if competition.status.is_terminal() {
        return Err(CompetitionError::conflict(format!(
            "competition is {} and can no longer be changed",
            competition.status.as_str()
        )));
    }
    Ok(())
}

pub fn check_registration(
    competition: &CompetitionRow,
    active_entries: i64,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if !matches!(
        competition.status,
        CompetitionStatus::Published | CompetitionStatus::RegistrationOpen
    ) {
        return Err(CompetitionError::validation(format!(
            "teams can only register while the competition is published or open for registration (currently {})",
            competition.status.as_str()
        )));
    }
    if let Some(deadline) = competition.registration_deadline {
        if now > deadline {
            return Err(CompetitionError::validation(format!(
                "registration closed at {}",
                deadline.to_rfc3339()
            )));
        }
    }
    if let Some(max) = competition.max_teams {
        if active_entries >= i64::from(max) {
            return Err(CompetitionError::validation(format!(
                "competition is full ({} of {} teams registered)",
                active_entries, max
            )));
        }
    }
    Ok(())
}

/// Seeds, groups and contact details are frozen once the draw is made.
pub fn check_team_details_editable(competition: &CompetitionRow) -> EngineResult<()> {
    match competition.status {
        CompetitionStatus::Draft
        | CompetitionStatus::Published
        | CompetitionStatus::RegistrationOpen
        | CompetitionStatus::RegistrationClosed => Ok(()),
        other => Err(CompetitionError::conflict(format!(
            "team details are frozen once the draw is made (competition is {})",
            other.as_str()
        ))),
    }
}

pub fn check_generation_allowed(
    competition: &CompetitionRow,
    force_regenerate: bool,
) -> EngineResult<()> {
    match competition.status {
        CompetitionStatus::RegistrationClosed => Ok(()),
        CompetitionStatus::DrawComplete if force_regenerate => Ok(()),
        CompetitionStatus::DrawComplete => Err(CompetitionError::conflict(
            "fixtures already exist; pass forceRegenerate to replace the unplayed schedule",
        )),
        other => Err(CompetitionError::conflict(format!(
            "fixtures can only be generated once registration has closed (competition is {})",
            other.as_str()
        ))),
    }
}

/// Manual fixtures and results are only accepted once the draw is made.
pub fn check_play_phase(competition: &CompetitionRow) -> EngineResult<()> {
    match competition.status {
        CompetitionStatus::DrawComplete | CompetitionStatus::InProgress => Ok(()),
        other => Err(CompetitionError::conflict(format!(
            "competition is {}; matches can only be played after the draw",
            other.as_str()
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    Confirm,
    Start,
    Postpone,
    Reschedule,
    Cancel,
    Abandon,
    Dispute,
}

impl MatchAction {
    fn verb(&self) -> &'static str {
        match self {
            MatchAction::Confirm => "confirm",
            MatchAction::Start => "start",
            MatchAction::Postpone => "postpone",
            MatchAction::Reschedule => "reschedule",
            MatchAction::Cancel => "cancel",
            MatchAction::Abandon => "abandon",
            MatchAction::Dispute => "dispute",
        }
    }
}

/// Status a match moves to under `action`. A postponement that already carries
/// the new kick-off time lands straight back in Scheduled.
pub fn next_match_status(
    current: MatchStatus,
    action: MatchAction,
    with_new_time: bool,
) -> EngineResult<MatchStatus> {
    use MatchStatus::*;

    let next = match (action, current) {
        (MatchAction::Confirm, Scheduled) => Confirmed,
        (MatchAction::Start, Scheduled | Confirmed) => InProgress,
        (MatchAction::Postpone, Scheduled | Confirmed) if with_new_time => Scheduled,
        (MatchAction::Postpone, Scheduled | Confirmed) => Postponed,
        (MatchAction::Reschedule, Scheduled | Confirmed | Postponed) => Scheduled,
        (MatchAction::Cancel, s) if !s.is_terminal() => Cancelled,
        (MatchAction::Abandon, InProgress) => Abandoned,
        (MatchAction::Dispute, InProgress) => Disputed,
        (action, s) => {
            return Err(CompetitionError::conflict(format!(
                "cannot {} a match that is {}",
                action.verb(),
                s.as_str()
            )))
        }
    };
    Ok(next)
}

pub fn check_result_allowed(current: MatchStatus) -> EngineResult<()> {
    if current.accepts_result() {
        return Ok(());
    }
    if current.is_terminal() {
        return Err(CompetitionError::conflict(format!(
            "match is already {}; a result can no longer be recorded",
            current.as_str()
        )));
    }
    Err(CompetitionError::conflict(format!(
        "match is {}; reschedule it before recording a result",
        current.as_str()
    )))
}

pub fn check_events_allowed(current: MatchStatus) -> EngineResult<()> {
    if current.accepts_events() {
        Ok(())
    } else {
        Err(CompetitionError::conflict(format!(
            "events and lineups can only be changed while a match is in progress or completed (match is {})",
            current.as_str()
        )))
    }
}
