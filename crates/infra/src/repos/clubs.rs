use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::ClubRow;

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<ClubRow>> {
    sqlx::query_as::<_, ClubRow>("SELECT * FROM clubs WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row lock on the club. Serialises changes to per-club flags such as the
/// current season.
pub async fn get_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<ClubRow>> {
    sqlx::query_as::<_, ClubRow>("SELECT * FROM clubs WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}
