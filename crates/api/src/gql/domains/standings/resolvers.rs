use async_graphql::{Context, Object, Result, ID};

use crate::gql::common::helpers::{parse_id, require_competition_manager};
use crate::gql::error::EngineResultExt;
use crate::state::AppState;

use super::service;
use super::types::StandingsGroup;

#[derive(Default)]
pub struct StandingsQuery;

#[Object]
impl StandingsQuery {
    /// League table, one entry per group for grouped competitions.
    async fn standings(
        &self,
        ctx: &Context<'_>,
        competition_id: ID,
        group: Option<String>,
    ) -> Result<Vec<StandingsGroup>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;

        let table = service::read_standings(
            &state.db,
            &state.config,
            competition_id,
            group.as_deref(),
        )
        .await
        .into_gql()?;
        Ok(table.tables.iter().map(StandingsGroup::from).collect())
    }
}

#[derive(Default)]
pub struct StandingsMutation;

#[Object]
impl StandingsMutation {
    async fn recalculate_standings(
        &self,
        ctx: &Context<'_>,
        competition_id: ID,
    ) -> Result<Vec<StandingsGroup>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let table = service::recalculate_standings(&state.db, &state.config, competition_id)
            .await
            .into_gql()?;
        Ok(table.tables.iter().map(StandingsGroup::from).collect())
    }
}
