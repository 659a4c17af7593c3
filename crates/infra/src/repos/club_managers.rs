use sqlx::{PgExecutor, Result};
use uuid::Uuid;

pub async fn is_club_manager<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    club_id: Uuid,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM club_managers
            WHERE user_id = $1 AND club_id = $2 AND is_active
        )
        "#,
    )
    .bind(user_id)
    .bind(club_id)
    .fetch_one(executor)
    .await
}
