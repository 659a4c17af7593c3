use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use infra::models::CompetitionRoundRow;

#[derive(SimpleObject, Clone)]
pub struct CompetitionRound {
    pub id: ID,
    pub competition_id: ID,
    pub round_number: i32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CompetitionRoundRow> for CompetitionRound {
    fn from(row: CompetitionRoundRow) -> Self {
        Self {
            id: row.id.into(),
            competition_id: row.competition_id.into(),
            round_number: row.round_number,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            is_complete: row.is_complete,
            created_at: row.created_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateRoundInput {
    pub competition_id: ID,
    pub round_number: i32,
    /// Defaults to "Round N".
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(InputObject)]
pub struct UpdateRoundInput {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
