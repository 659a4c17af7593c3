use async_graphql::{Enum, InputObject, MaybeUndefined, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};

use crate::engine::fixtures::FixtureFormat;
use infra::models::CompetitionRow;
use infra::repos::{CompetitionStatus as DbStatus, CompetitionType as DbType};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompetitionType {
    League,
    Tournament,
    Cup,
    Knockout,
    Friendly,
}

impl From<DbType> for CompetitionType {
    fn from(t: DbType) -> Self {
        match t {
            DbType::League => CompetitionType::League,
            DbType::Tournament => CompetitionType::Tournament,
            DbType::Cup => CompetitionType::Cup,
            DbType::Knockout => CompetitionType::Knockout,
            DbType::Friendly => CompetitionType::Friendly,
        }
    }
}

impl From<CompetitionType> for DbType {
    fn from(t: CompetitionType) -> Self {
        match t {
            CompetitionType::League => DbType::League,
            CompetitionType::Tournament => DbType::Tournament,
            CompetitionType::Cup => DbType::Cup,
            CompetitionType::Knockout => DbType::Knockout,
            CompetitionType::Friendly => DbType::Friendly,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompetitionStatus {
    Draft,
    Published,
    RegistrationOpen,
    RegistrationClosed,
    DrawComplete,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
    Archived,
}

impl From<DbStatus> for CompetitionStatus {
    fn from(s: DbStatus) -> Self {
        match s {
            DbStatus::Draft => CompetitionStatus::Draft,
            DbStatus::Published => CompetitionStatus::Published,
            DbStatus::RegistrationOpen => CompetitionStatus::RegistrationOpen,
            DbStatus::RegistrationClosed => CompetitionStatus::RegistrationClosed,
            DbStatus::DrawComplete => CompetitionStatus::DrawComplete,
            DbStatus::InProgress => CompetitionStatus::InProgress,
            DbStatus::Completed => CompetitionStatus::Completed,
            DbStatus::Cancelled => CompetitionStatus::Cancelled,
            DbStatus::Postponed => CompetitionStatus::Postponed,
            DbStatus::Archived => CompetitionStatus::Archived,
        }
    }
}

impl From<CompetitionStatus> for DbStatus {
    fn from(s: CompetitionStatus) -> Self {
        match s {
            CompetitionStatus::Draft => DbStatus::Draft,
            CompetitionStatus::Published => DbStatus::Published,
            CompetitionStatus::RegistrationOpen => DbStatus::RegistrationOpen,
            CompetitionStatus::RegistrationClosed => DbStatus::RegistrationClosed,
            CompetitionStatus::DrawComplete => DbStatus::DrawComplete,
            CompetitionStatus::InProgress => DbStatus::InProgress,
            CompetitionStatus::Completed => DbStatus::Completed,
            CompetitionStatus::Cancelled => DbStatus::Cancelled,
            CompetitionStatus::Postponed => DbStatus::Postponed,
            CompetitionStatus::Archived => DbStatus::Archived,
        }
    }
}

/// How fixtures are produced for a competition type.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompetitionFormat {
    RoundRobin,
    GroupedRoundRobin,
    Knockout,
}

impl From<FixtureFormat> for CompetitionFormat {
    fn from(f: FixtureFormat) -> Self {
        match f {
            FixtureFormat::RoundRobin => CompetitionFormat::RoundRobin,
            FixtureFormat::GroupedRoundRobin => CompetitionFormat::GroupedRoundRobin,
            FixtureFormat::Knockout => CompetitionFormat::Knockout,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct Competition {
    pub id: ID,
    pub club_id: ID,
    pub season_id: Option<ID>,
    pub name: String,
    pub description: Option<String>,
    pub competition_type: CompetitionType,
    pub format: CompetitionFormat,
    pub status: CompetitionStatus,
    pub resume_status: Option<CompetitionStatus>,
    pub is_team_based: bool,
    pub min_teams: i32,
    pub max_teams: Option<i32>,
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub promotion_places: i32,
    pub relegation_places: i32,
    pub head_to_head_tiebreak: bool,
    pub home_and_away: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompetitionRow> for Competition {
    fn from(row: CompetitionRow) -> Self {
        Self {
            id: row.id.into(),
            club_id: row.club_id.into(),
            season_id: row.season_id.map(Into::into),
            name: row.name,
            description: row.description,
            competition_type: row.competition_type.into(),
            format: FixtureFormat::for_type(row.competition_type).into(),
            status: row.status.into(),
            resume_status: row.resume_status.map(Into::into),
            is_team_based: row.is_team_based,
            min_teams: row.min_teams,
            max_teams: row.max_teams,
            points_for_win: row.points_for_win,
            points_for_draw: row.points_for_draw,
            points_for_loss: row.points_for_loss,
            start_date: row.start_date,
            end_date: row.end_date,
            registration_deadline: row.registration_deadline,
            promotion_places: row.promotion_places,
            relegation_places: row.relegation_places,
            head_to_head_tiebreak: row.head_to_head_tiebreak,
            home_and_away: row.home_and_away,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct CompetitionPage {
    pub items: Vec<Competition>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(InputObject, Default)]
pub struct CompetitionFilterInput {
    pub club_id: Option<ID>,
    pub season_id: Option<ID>,
    pub status: Option<CompetitionStatus>,
}

#[derive(InputObject)]
pub struct CreateCompetitionInput {
    pub club_id: ID,
    pub season_id: Option<ID>,
    pub name: String,
    pub description: Option<String>,
    pub competition_type: CompetitionType,
    #[graphql(default = true)]
    pub is_team_based: bool,
    #[graphql(default = 2)]
    pub min_teams: i32,
    pub max_teams: Option<i32>,
    #[graphql(default = 3)]
    pub points_for_win: i32,
    #[graphql(default = 1)]
    pub points_for_draw: i32,
    #[graphql(default = 0)]
    pub points_for_loss: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    #[graphql(default = 0)]
    pub promotion_places: i32,
    #[graphql(default = 0)]
    pub relegation_places: i32,
    #[graphql(default = false)]
    pub head_to_head_tiebreak: bool,
    #[graphql(default = false)]
    pub home_and_away: bool,
}

#[derive(InputObject, Default)]
pub struct UpdateCompetitionInput {
    pub season_id: Option<ID>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_teams: Option<i32>,
    /// Pass null to remove the cap.
    pub max_teams: MaybeUndefined<i32>,
    pub points_for_win: Option<i32>,
    pub points_for_draw: Option<i32>,
    pub points_for_loss: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub promotion_places: Option<i32>,
    pub relegation_places: Option<i32>,
    pub head_to_head_tiebreak: Option<bool>,
    pub home_and_away: Option<bool>,
}
