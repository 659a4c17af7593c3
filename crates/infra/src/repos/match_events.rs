use sqlx::{PgExecutor, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::MatchEventRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "match_event_type", rename_all = "snake_case")]
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

impl MatchEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchEventType::Goal => "goal",
            MatchEventType::PenaltyGoal => "penalty_goal",
            MatchEventType::OwnGoal => "own_goal",
            MatchEventType::PenaltyMissed => "penalty_missed",
            MatchEventType::YellowCard => "yellow_card",
            MatchEventType::SecondYellow => "second_yellow",
            MatchEventType::RedCard => "red_card",
            MatchEventType::SubstitutionOn => "substitution_on",
            MatchEventType::SubstitutionOff => "substitution_off",
        }
    }

    /// Goals credited to the scorer. Own goals are not.
    pub fn is_scoring(&self) -> bool {
        matches!(self, MatchEventType::Goal | MatchEventType::PenaltyGoal)
    }

    /// Events that may carry an assisting participant.
    pub fn allows_assist(&self) -> bool {
        self.is_scoring()
    }

    pub fn is_dismissal(&self) -> bool {
        matches!(self, MatchEventType::RedCard | MatchEventType::SecondYellow)
    }
}

impl FromStr for MatchEventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "goal" => Ok(MatchEventType::Goal),
            "penalty_goal" => Ok(MatchEventType::PenaltyGoal),
            "own_goal" => Ok(MatchEventType::OwnGoal),
            "penalty_missed" => Ok(MatchEventType::PenaltyMissed),
            "yellow_card" => Ok(MatchEventType::YellowCard),
            "second_yellow" => Ok(MatchEventType::SecondYellow),
            "red_card" => Ok(MatchEventType::RedCard),
            "substitution_on" => Ok(MatchEventType::SubstitutionOn),
            "substitution_off" => Ok(MatchEventType::SubstitutionOff),
            _ => Err(format!("Unknown match event type: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateMatchEvent {
    pub match_id: Uuid,
    pub event_type: MatchEventType,
    pub minute: i32,
    pub participant_id: Option<Uuid>,
    pub team_id: Uuid,
    pub assist_participant_id: Option<Uuid>,
    pub notes: Option<String>,
}

pub async fn list_by_match<'e>(
    executor: impl PgExecutor<'e>,
    match_id: Uuid,
) -> Result<Vec<MatchEventRow>> {
    sqlx::query_as::<_, MatchEventRow>(
        "SELECT * FROM match_events WHERE match_id = $1 ORDER BY minute ASC, sequence ASC",
    )
    .bind(match_id)
    .fetch_all(executor)
    .await
}

/// Every event of a competition whose match still counts, in recording order.
/// Events of voided matches are left out.
pub async fn list_counted_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<MatchEventRow>> {
    sqlx::query_as::<_, MatchEventRow>(
        r#"
        SELECT e.* FROM match_events e
        JOIN matches m ON m.id = e.match_id
        WHERE m.competition_id = $1
          AND m.result <> 'void'
        ORDER BY e.sequence ASC
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateMatchEvent,
) -> Result<MatchEventRow> {
    sqlx::query_as::<_, MatchEventRow>(
        r#"
        INSERT INTO match_events (match_id, event_type, minute, participant_id, team_id,
                                  assist_participant_id, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(data.match_id)
    .bind(data.event_type)
    .bind(data.minute)
    .bind(data.participant_id)
    .bind(data.team_id)
    .bind(data.assist_participant_id)
    .bind(data.notes)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<MatchEventRow>> {
    sqlx::query_as::<_, MatchEventRow>("SELECT * FROM match_events WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM match_events WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_by_match<'e>(executor: impl PgExecutor<'e>, match_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM match_events WHERE match_id = $1")
        .bind(match_id)
        .fetch_one(executor)
        .await
}
