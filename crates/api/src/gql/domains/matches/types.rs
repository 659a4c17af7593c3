use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::outcome::ResultKind;
use crate::gql::domains::competitions::types::Competition;
use crate::gql::domains::participants::types::CompetitionParticipant;
use crate::gql::domains::teams::types::CompetitionTeam;
use crate::gql::error::ResultExt;
use crate::gql::loaders::{CompetitionLoader, ParticipantLoader, TeamLoader};
use crate::services::VenueProfile;
use crate::state::AppState;
use infra::models::{MatchEventRow, MatchLineupRow, MatchRow};
use infra::repos::{
    MatchEventType as DbEventType, MatchResult as DbResult, MatchStatus as DbStatus,
};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum MatchStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Postponed,
    Cancelled,
    Walkover,
    Bye,
    Abandoned,
    Disputed,
}

impl From<DbStatus> for MatchStatus {
    fn from(s: DbStatus) -> Self {
        match s {
            DbStatus::Scheduled => MatchStatus::Scheduled,
            DbStatus::Confirmed => MatchStatus::Confirmed,
            DbStatus::InProgress => MatchStatus::InProgress,
            DbStatus::Completed => MatchStatus::Completed,
            DbStatus::Postponed => MatchStatus::Postponed,
            DbStatus::Cancelled => MatchStatus::Cancelled,
            DbStatus::Walkover => MatchStatus::Walkover,
            DbStatus::Bye => MatchStatus::Bye,
            DbStatus::Abandoned => MatchStatus::Abandoned,
            DbStatus::Disputed => MatchStatus::Disputed,
        }
    }
}

impl From<MatchStatus> for DbStatus {
    fn from(s: MatchStatus) -> Self {
        match s {
            MatchStatus::Scheduled => DbStatus::Scheduled,
            MatchStatus::Confirmed => DbStatus::Confirmed,
            MatchStatus::InProgress => DbStatus::InProgress,
            MatchStatus::Completed => DbStatus::Completed,
            MatchStatus::Postponed => DbStatus::Postponed,
            MatchStatus::Cancelled => DbStatus::Cancelled,
            MatchStatus::Walkover => DbStatus::Walkover,
            MatchStatus::Bye => DbStatus::Bye,
            MatchStatus::Abandoned => DbStatus::Abandoned,
            MatchStatus::Disputed => DbStatus::Disputed,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum MatchResult {
    NotPlayed,
    HomeWin,
    AwayWin,
    Draw,
    HomeWalkover,
    AwayWalkover,
    Void,
}

impl From<DbResult> for MatchResult {
    fn from(r: DbResult) -> Self {
        match r {
            DbResult::NotPlayed => MatchResult::NotPlayed,
            DbResult::HomeWin => MatchResult::HomeWin,
            DbResult::AwayWin => MatchResult::AwayWin,
            DbResult::Draw => MatchResult::Draw,
            DbResult::HomeWalkover => MatchResult::HomeWalkover,
            DbResult::AwayWalkover => MatchResult::AwayWalkover,
            DbResult::Void => MatchResult::Void,
        }
    }
}

/// How a submitted score is read.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ResultOutcome {
    /// Derive the winner from the scores.
    #[default]
    Normal,
    HomeWalkover,
    AwayWalkover,
    Void,
}

impl From<ResultOutcome> for ResultKind {
    fn from(o: ResultOutcome) -> Self {
        match o {
            ResultOutcome::Normal => ResultKind::Normal,
            ResultOutcome::HomeWalkover => ResultKind::HomeWalkover,
            ResultOutcome::AwayWalkover => ResultKind::AwayWalkover,
            ResultOutcome::Void => ResultKind::Void,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum MatchEventType {
    Goal,
    PenaltyGoal,
    OwnGoal,
    PenaltyMissed,
    YellowCard,
    SecondYellow,
    RedCard,
    SubstitutionOn,
    SubstitutionOff,
}

impl From<DbEventType> for MatchEventType {
    fn from(t: DbEventType) -> Self {
        match t {
            DbEventType::Goal => MatchEventType::Goal,
            DbEventType::PenaltyGoal => MatchEventType::PenaltyGoal,
            DbEventType::OwnGoal => MatchEventType::OwnGoal,
            DbEventType::PenaltyMissed => MatchEventType::PenaltyMissed,
            DbEventType::YellowCard => MatchEventType::YellowCard,
            DbEventType::SecondYellow => MatchEventType::SecondYellow,
            DbEventType::RedCard => MatchEventType::RedCard,
            DbEventType::SubstitutionOn => MatchEventType::SubstitutionOn,
            DbEventType::SubstitutionOff => MatchEventType::SubstitutionOff,
        }
    }
}

impl From<MatchEventType> for DbEventType {
    fn from(t: MatchEventType) -> Self {
        match t {
            MatchEventType::Goal => DbEventType::Goal,
            MatchEventType::PenaltyGoal => DbEventType::PenaltyGoal,
            MatchEventType::OwnGoal => DbEventType::OwnGoal,
            MatchEventType::PenaltyMissed => DbEventType::PenaltyMissed,
            MatchEventType::YellowCard => DbEventType::YellowCard,
            MatchEventType::SecondYellow => DbEventType::SecondYellow,
            MatchEventType::RedCard => DbEventType::RedCard,
            MatchEventType::SubstitutionOn => DbEventType::SubstitutionOn,
            MatchEventType::SubstitutionOff => DbEventType::SubstitutionOff,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct Venue {
    pub id: ID,
    pub club_id: ID,
    pub name: String,
    pub address: Option<String>,
}

impl From<VenueProfile> for Venue {
    fn from(v: VenueProfile) -> Self {
        Self {
            id: v.id.into(),
            club_id: v.club_id.into(),
            name: v.name,
            address: v.address,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Match {
    pub id: ID,
    pub competition_id: ID,
    pub round_id: Option<ID>,
    pub leg_number: Option<i32>,
    pub bracket_position: Option<i32>,
    pub group_name: Option<String>,
    pub status: MatchStatus,
    pub scheduled_date_time: DateTime<Utc>,
    pub home_team_id: Option<ID>,
    pub away_team_id: Option<ID>,
    pub venue_id: Option<ID>,
    pub result: MatchResult,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub postponement_reason: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id.into(),
            competition_id: row.competition_id.into(),
            round_id: row.round_id.map(Into::into),
            leg_number: row.leg_number,
            bracket_position: row.bracket_position,
            group_name: row.group_name,
            status: row.status.into(),
            scheduled_date_time: row.scheduled_date_time,
            home_team_id: row.home_team_id.map(Into::into),
            away_team_id: row.away_team_id.map(Into::into),
            venue_id: row.venue_id.map(Into::into),
            result: row.result.into(),
            home_score: row.home_score,
            away_score: row.away_score,
            actual_start_time: row.actual_start_time,
            actual_end_time: row.actual_end_time,
            notes: row.notes,
            postponement_reason: row.postponement_reason,
            cancellation_reason: row.cancellation_reason,
        }
    }
}

async fn load_team(ctx: &Context<'_>, id: Option<&ID>) -> Result<Option<CompetitionTeam>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let team_id = Uuid::parse_str(id.as_str()).gql_err("Invalid team ID")?;
    let loader = ctx.data::<DataLoader<TeamLoader>>()?;
    let row = loader
        .load_one(team_id)
        .await
        .gql_err("Loading team failed")?;
    Ok(row.map(Into::into))
}

async fn load_participant(
    ctx: &Context<'_>,
    id: Option<&ID>,
) -> Result<Option<CompetitionParticipant>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let participant_id = Uuid::parse_str(id.as_str()).gql_err("Invalid participant ID")?;
    let loader = ctx.data::<DataLoader<ParticipantLoader>>()?;
    let row = loader
        .load_one(participant_id)
        .await
        .gql_err("Loading participant failed")?;
    Ok(row.map(Into::into))
}

#[ComplexObject]
impl Match {
    /// Empty for a bye slot or a tie still to be decided.
    async fn home_team(&self, ctx: &Context<'_>) -> Result<Option<CompetitionTeam>> {
        load_team(ctx, self.home_team_id.as_ref()).await
    }

    async fn away_team(&self, ctx: &Context<'_>) -> Result<Option<CompetitionTeam>> {
        load_team(ctx, self.away_team_id.as_ref()).await
    }

    async fn competition(&self, ctx: &Context<'_>) -> Result<Option<Competition>> {
        let competition_id =
            Uuid::parse_str(self.competition_id.as_str()).gql_err("Invalid competition ID")?;
        let loader = ctx.data::<DataLoader<CompetitionLoader>>()?;
        let row = loader
            .load_one(competition_id)
            .await
            .gql_err("Loading competition failed")?;
        Ok(row.map(Into::into))
    }

    async fn venue(&self, ctx: &Context<'_>) -> Result<Option<Venue>> {
        let Some(id) = &self.venue_id else {
            return Ok(None);
        };
        let venue_id = Uuid::parse_str(id.as_str()).gql_err("Invalid venue ID")?;
        let state = ctx.data::<AppState>()?;
        let venue = state
            .venues()
            .resolve(venue_id)
            .await
            .gql_err("Loading venue failed")?;
        Ok(venue.map(Into::into))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct MatchEvent {
    pub id: ID,
    pub match_id: ID,
    pub sequence: i64,
    pub event_type: MatchEventType,
    pub minute: i32,
    pub participant_id: Option<ID>,
    pub team_id: ID,
    pub assist_participant_id: Option<ID>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MatchEventRow> for MatchEvent {
    fn from(row: MatchEventRow) -> Self {
        Self {
            id: row.id.into(),
            match_id: row.match_id.into(),
            sequence: row.sequence,
            event_type: row.event_type.into(),
            minute: row.minute,
            participant_id: row.participant_id.map(Into::into),
            team_id: row.team_id.into(),
            assist_participant_id: row.assist_participant_id.map(Into::into),
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[ComplexObject]
impl MatchEvent {
    async fn participant(&self, ctx: &Context<'_>) -> Result<Option<CompetitionParticipant>> {
        load_participant(ctx, self.participant_id.as_ref()).await
    }

    async fn assist_participant(&self, ctx: &Context<'_>) -> Result<Option<CompetitionParticipant>> {
        load_participant(ctx, self.assist_participant_id.as_ref()).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct MatchLineupEntry {
    pub id: ID,
    pub match_id: ID,
    pub team_id: ID,
    pub participant_id: ID,
    pub is_starting: bool,
    pub shirt_number: Option<i32>,
    pub minutes_played: Option<i32>,
}

impl From<MatchLineupRow> for MatchLineupEntry {
    fn from(row: MatchLineupRow) -> Self {
        Self {
            id: row.id.into(),
            match_id: row.match_id.into(),
            team_id: row.team_id.into(),
            participant_id: row.participant_id.into(),
            is_starting: row.is_starting,
            shirt_number: row.shirt_number,
            minutes_played: row.minutes_played,
        }
    }
}

#[ComplexObject]
impl MatchLineupEntry {
    async fn participant(&self, ctx: &Context<'_>) -> Result<Option<CompetitionParticipant>> {
        load_participant(ctx, Some(&self.participant_id)).await
    }
}

#[derive(InputObject, Default)]
pub struct MatchFilterInput {
    pub competition_id: Option<ID>,
    pub round_id: Option<ID>,
    pub team_id: Option<ID>,
    pub status: Option<MatchStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(InputObject)]
pub struct CreateMatchInput {
    pub competition_id: ID,
    pub round_id: Option<ID>,
    pub home_team_id: ID,
    pub away_team_id: ID,
    pub scheduled_date_time: DateTime<Utc>,
    pub venue_id: Option<ID>,
    pub group_name: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateMatchInput {
    pub venue_id: Option<ID>,
    pub notes: Option<String>,
}

#[derive(InputObject)]
pub struct PostponeMatchInput {
    pub match_id: ID,
    pub reason: Option<String>,
    /// When known, the match goes straight back to Scheduled.
    pub new_date_time: Option<DateTime<Utc>>,
}

#[derive(InputObject)]
pub struct RescheduleMatchInput {
    pub match_id: ID,
    pub scheduled_date_time: DateTime<Utc>,
}

#[derive(InputObject)]
pub struct CancelMatchInput {
    pub match_id: ID,
    pub reason: Option<String>,
}

#[derive(InputObject)]
pub struct RecordResultInput {
    pub match_id: ID,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    #[graphql(default)]
    pub outcome: ResultOutcome,
    pub notes: Option<String>,
}

#[derive(InputObject)]
pub struct AddMatchEventInput {
    pub match_id: ID,
    pub event_type: MatchEventType,
    pub minute: i32,
    pub team_id: ID,
    pub participant_id: Option<ID>,
    pub assist_participant_id: Option<ID>,
    pub notes: Option<String>,
}

#[derive(InputObject)]
pub struct LineupEntryInput {
    pub match_id: ID,
    pub team_id: ID,
    pub participant_id: ID,
    #[graphql(default = true)]
    pub is_starting: bool,
    pub shirt_number: Option<i32>,
    pub minutes_played: Option<i32>,
}
