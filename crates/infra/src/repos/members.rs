use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::MemberRow;

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<MemberRow>> {
    sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}
