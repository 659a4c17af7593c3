use crate::repos::{
    competition_participants::ParticipantRole,
    competition_teams::TeamStatus,
    competitions::{CompetitionStatus, CompetitionType},
    match_events::MatchEventType,
    matches::{MatchResult, MatchStatus},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClubRow {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MemberRow {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VenueRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeasonRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub season_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub competition_type: CompetitionType,
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

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionRoundRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub round_number: i32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionTeamRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub status: TeamStatus,
    pub seed_number: Option<i32>,
    pub draw_position: Option<i32>,
    pub group_name: Option<String>,
    pub captain_member_id: Option<Uuid>,
    pub contact_email: Option<String>,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub points: i32,
    pub registered_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub withdrawal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionParticipantRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub team_id: Uuid,
    pub member_id: Uuid,
    pub display_name: String,
    pub role: ParticipantRole,
    pub shirt_number: Option<i32>,
    pub appearances: i32,
    pub goals: i32,
    pub assists: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub round_id: Option<Uuid>,
    pub leg_number: Option<i32>,
    pub bracket_position: Option<i32>,
    pub group_name: Option<String>,
    pub status: MatchStatus,
    pub scheduled_date_time: DateTime<Utc>,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub result: MatchResult,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub postponement_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRow {
    /// Whether the given team plays in this match.
    pub fn involves(&self, team_id: Uuid) -> bool {
        self.home_team_id == Some(team_id) || self.away_team_id == Some(team_id)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MatchEventRow {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sequence: i64,
    pub event_type: MatchEventType,
    pub minute: i32,
    pub participant_id: Option<Uuid>,
    pub team_id: Uuid,
    pub assist_participant_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MatchLineupRow {
    pub id: Uuid,
    pub match_id: Uuid,
    pub team_id: Uuid,
    pub participant_id: Uuid,
    pub is_starting: bool,
    pub shirt_number: Option<i32>,
    pub minutes_played: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionStandingRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub team_id: Uuid,
    pub group_name: Option<String>,
    pub position: i32,
    pub previous_position: Option<i32>,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    pub form: String,
    pub zone: Option<String>,
    pub is_promoted: bool,
    pub is_relegated: bool,
    pub calculated_at: DateTime<Utc>,
}
