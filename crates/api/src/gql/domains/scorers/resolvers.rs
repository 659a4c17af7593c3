use async_graphql::{Context, Object, Result, ID};

use crate::gql::common::helpers::parse_id;
use crate::gql::error::EngineResultExt;
use crate::state::AppState;

use super::service;
use super::types::TopScorer;

#[derive(Default)]
pub struct ScorerQuery;

#[Object]
impl ScorerQuery {
    /// Leaderboard of goal scorers. `limit` defaults to 10 and is capped.
    async fn top_scorers(
        &self,
        ctx: &Context<'_>,
        competition_id: ID,
        limit: Option<i32>,
    ) -> Result<Vec<TopScorer>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;

        let lines = service::top_scorers(&state.db, &state.config, competition_id, limit)
            .await
            .into_gql()?;
        Ok(lines.into_iter().map(TopScorer::from).collect())
    }
}
