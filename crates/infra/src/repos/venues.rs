use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::VenueRow;

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<VenueRow>> {
    sqlx::query_as::<_, VenueRow>("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list_by_club<'e>(executor: impl PgExecutor<'e>, club_id: Uuid) -> Result<Vec<VenueRow>> {
    sqlx::query_as::<_, VenueRow>("SELECT * FROM venues WHERE club_id = $1 ORDER BY name ASC")
        .bind(club_id)
        .fetch_all(executor)
        .await
}
