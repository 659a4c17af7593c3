use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::scorers::{clamp_limit, rank_top_scorers, tally_participants, ScorerLine};
use crate::engine::{CompetitionError, EngineResult};
use infra::repos::{competition_participants, competitions, match_events, match_lineups};

/// Top-scorer leaderboard from the counted events of a competition.
/// Read-only; computed on every call.
pub async fn top_scorers(
    pool: &sqlx::PgPool,
    config: &EngineConfig,
    competition_id: Uuid,
    limit: Option<i32>,
) -> EngineResult<Vec<ScorerLine>> {
    competitions::get_by_id(pool, competition_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("competition", competition_id))?;
    let limit = clamp_limit(
        limit,
        config.top_scorers_default_limit,
        config.top_scorers_max_limit,
    )?;

    let (participants, events, lineups) = tokio::try_join!(
        competition_participants::list_by_competition(pool, competition_id),
        match_events::list_counted_by_competition(pool, competition_id),
        match_lineups::list_counted_by_competition(pool, competition_id),
    )?;

    let tallies = tally_participants(&participants, &events, &lineups)?;
    Ok(rank_top_scorers(&tallies, limit))
}
