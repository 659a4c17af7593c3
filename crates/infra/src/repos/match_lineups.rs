use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::MatchLineupRow;

#[derive(Debug, Clone)]
pub struct CreateLineupEntry {
    pub match_id: Uuid,
    pub team_id: Uuid,
    pub participant_id: Uuid,
    pub is_starting: bool,
    pub shirt_number: Option<i32>,
    pub minutes_played: Option<i32>,
}

pub async fn list_by_match<'e>(
    executor: impl PgExecutor<'e>,
    match_id: Uuid,
) -> Result<Vec<MatchLineupRow>> {
    sqlx::query_as::<_, MatchLineupRow>(
        r#"
        SELECT * FROM match_lineups
        WHERE match_id = $1
        ORDER BY team_id, is_starting DESC, shirt_number ASC NULLS LAST
        "#,
    )
    .bind(match_id)
    .fetch_all(executor)
    .await
}

/// Lineup entries of matches that still count towards player statistics.
pub async fn list_counted_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<MatchLineupRow>> {
    sqlx::query_as::<_, MatchLineupRow>(
        r#"
        SELECT l.* FROM match_lineups l
        JOIN matches m ON m.id = l.match_id
        WHERE m.competition_id = $1
          AND m.result <> 'void'
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

/// Insert or refresh one participant's entry for a match.
pub async fn upsert<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateLineupEntry,
) -> Result<MatchLineupRow> {
    sqlx::query_as::<_, MatchLineupRow>(
        r#"
        INSERT INTO match_lineups (match_id, team_id, participant_id, is_starting,
                                   shirt_number, minutes_played)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (match_id, participant_id) DO UPDATE
        SET is_starting = EXCLUDED.is_starting,
            shirt_number = EXCLUDED.shirt_number,
            minutes_played = EXCLUDED.minutes_played
        RETURNING *
        "#,
    )
    .bind(data.match_id)
    .bind(data.team_id)
    .bind(data.participant_id)
    .bind(data.is_starting)
    .bind(data.shirt_number)
    .bind(data.minutes_played)
    .fetch_one(executor)
    .await
}

pub async fn delete_entry<'e>(
    executor: impl PgExecutor<'e>,
    match_id: Uuid,
    participant_id: Uuid,
) -> Result<Option<MatchLineupRow>> {
    sqlx::query_as::<_, MatchLineupRow>(
        "DELETE FROM match_lineups WHERE match_id = $1 AND participant_id = $2 RETURNING *",
    )
    .bind(match_id)
    .bind(participant_id)
    .fetch_optional(executor)
    .await
}
