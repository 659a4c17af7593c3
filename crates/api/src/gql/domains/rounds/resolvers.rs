use async_graphql::{Context, Object, Result, ID};

use crate::gql::common::helpers::{parse_id, require_competition_manager, require_scope_manager, Scope};
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::competition_rounds;

use super::service;
use super::types::{CompetitionRound, CreateRoundInput, UpdateRoundInput};

#[derive(Default)]
pub struct RoundQuery;

#[Object]
impl RoundQuery {
    async fn rounds(&self, ctx: &Context<'_>, competition_id: ID) -> Result<Vec<CompetitionRound>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        let rows = competition_rounds::list_by_competition(&state.db, competition_id)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(CompetitionRound::from).collect())
    }

    async fn round(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CompetitionRound>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "round")?;
        let row = competition_rounds::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(CompetitionRound::from))
    }
}

#[derive(Default)]
pub struct RoundMutation;

#[Object]
impl RoundMutation {
    async fn create_round(&self, ctx: &Context<'_>, input: CreateRoundInput) -> Result<CompetitionRound> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&input.competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let row = service::create_round(
            &state.db,
            competition_id,
            input.round_number,
            input.name,
            input.start_date,
            input.end_date,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn update_round(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateRoundInput,
    ) -> Result<CompetitionRound> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "round")?;
        require_scope_manager(ctx, Scope::Round(id)).await?;

        let row = service::update_round(&state.db, id, input.name, input.start_date, input.end_date)
            .await
            .into_gql()?;
        Ok(row.into())
    }

    async fn delete_round(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "round")?;
        require_scope_manager(ctx, Scope::Round(id)).await?;

        service::delete_round(&state.db, id).await.into_gql()
    }
}
