use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::CompetitionStandingRow;

#[derive(Debug, Clone)]
pub struct UpsertStanding {
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
}

pub async fn list_by_competition<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
) -> Result<Vec<CompetitionStandingRow>> {
    sqlx::query_as::<_, CompetitionStandingRow>(
        r#"
        SELECT * FROM competition_standings
        WHERE competition_id = $1
        ORDER BY group_name ASC NULLS FIRST, position ASC
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await
}

pub async fn upsert<'e>(
    executor: impl PgExecutor<'e>,
    data: UpsertStanding,
) -> Result<CompetitionStandingRow> {
    sqlx::query_as::<_, CompetitionStandingRow>(
        r#"
        INSERT INTO competition_standings (competition_id, team_id, group_name, position,
                                           previous_position, played, won, drawn, lost,
                                           goals_for, goals_against, goal_difference, points,
                                           form, zone, is_promoted, is_relegated, calculated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, NOW())
        ON CONFLICT (competition_id, team_id) DO UPDATE
        SET group_name = EXCLUDED.group_name,
            position = EXCLUDED.position,
            previous_position = EXCLUDED.previous_position,
            played = EXCLUDED.played,
            won = EXCLUDED.won,
            drawn = EXCLUDED.drawn,
            lost = EXCLUDED.lost,
            goals_for = EXCLUDED.goals_for,
            goals_against = EXCLUDED.goals_against,
            goal_difference = EXCLUDED.goal_difference,
            points = EXCLUDED.points,
            form = EXCLUDED.form,
            zone = EXCLUDED.zone,
            is_promoted = EXCLUDED.is_promoted,
            is_relegated = EXCLUDED.is_relegated,
            calculated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(data.competition_id)
    .bind(data.team_id)
    .bind(data.group_name)
    .bind(data.position)
    .bind(data.previous_position)
    .bind(data.played)
    .bind(data.won)
    .bind(data.drawn)
    .bind(data.lost)
    .bind(data.goals_for)
    .bind(data.goals_against)
    .bind(data.goal_difference)
    .bind(data.points)
    .bind(data.form)
    .bind(data.zone)
    .bind(data.is_promoted)
    .bind(data.is_relegated)
    .fetch_one(executor)
    .await
}

/// Remove rows for teams that no longer belong in the table.
pub async fn delete_except<'e>(
    executor: impl PgExecutor<'e>,
    competition_id: Uuid,
    keep_team_ids: &[Uuid],
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM competition_standings
        WHERE competition_id = $1 AND NOT (team_id = ANY($2::uuid[]))
        "#,
    )
    .bind(competition_id)
    .bind(keep_team_ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
