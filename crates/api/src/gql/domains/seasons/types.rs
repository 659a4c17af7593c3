use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};

use infra::models::SeasonRow;

#[derive(SimpleObject, Clone)]
pub struct Season {
    pub id: ID,
    pub club_id: ID,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SeasonRow> for Season {
    fn from(row: SeasonRow) -> Self {
        Self {
            id: row.id.into(),
            club_id: row.club_id.into(),
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            is_current: row.is_current,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateSeasonInput {
    pub club_id: ID,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[graphql(default = false)]
    pub is_current: bool,
}

#[derive(InputObject)]
pub struct UpdateSeasonInput {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
