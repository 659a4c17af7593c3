use async_graphql::{Context, Object, Result, ID};

use crate::auth::permissions::require_club_manager;
use crate::engine::CompetitionError;
use crate::gql::common::helpers::parse_id;
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::{seasons, CreateSeason, UpdateSeason};

use super::service;
use super::types::{CreateSeasonInput, Season, UpdateSeasonInput};

#[derive(Default)]
pub struct SeasonQuery;

#[Object]
impl SeasonQuery {
    async fn season(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Season>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "season")?;
        let row = seasons::get_by_id(&state.db, id)
            .await
            .into_gql()?;
        Ok(row.map(Season::from))
    }

    async fn seasons(&self, ctx: &Context<'_>, club_id: ID) -> Result<Vec<Season>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&club_id, "club")?;
        let rows = seasons::list_by_club(&state.db, club_id)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(Season::from).collect())
    }

    async fn current_season(&self, ctx: &Context<'_>, club_id: ID) -> Result<Option<Season>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&club_id, "club")?;
        let row = seasons::get_current(&state.db, club_id)
            .await
            .into_gql()?;
        Ok(row.map(Season::from))
    }
}

#[derive(Default)]
pub struct SeasonMutation;

async fn club_of_season(state: &AppState, id: uuid::Uuid) -> Result<uuid::Uuid> {
    let season = seasons::get_by_id(&state.db, id)
        .await
        .into_gql()?
        .ok_or_else(|| CompetitionError::not_found("season", id))
        .into_gql()?;
    Ok(season.club_id)
}

#[Object]
impl SeasonMutation {
    async fn create_season(&self, ctx: &Context<'_>, input: CreateSeasonInput) -> Result<Season> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&input.club_id, "club")?;
        require_club_manager(ctx, club_id).await?;

        let row = service::create_season(
            &state.db,
            CreateSeason {
                club_id,
                name: input.name,
                start_date: input.start_date,
                end_date: input.end_date,
                is_current: input.is_current,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn update_season(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateSeasonInput,
    ) -> Result<Season> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "season")?;
        require_club_manager(ctx, club_of_season(state, id).await?).await?;

        let row = service::update_season(
            &state.db,
            id,
            UpdateSeason {
                name: input.name,
                start_date: input.start_date,
                end_date: input.end_date,
                is_completed: None,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn set_current_season(&self, ctx: &Context<'_>, id: ID) -> Result<Season> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "season")?;
        require_club_manager(ctx, club_of_season(state, id).await?).await?;

        let row = service::set_current_season(&state.db, id).await.into_gql()?;
        Ok(row.into())
    }

    async fn complete_season(&self, ctx: &Context<'_>, id: ID) -> Result<Season> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "season")?;
        require_club_manager(ctx, club_of_season(state, id).await?).await?;

        let row = service::complete_season(&state.db, id).await.into_gql()?;
        Ok(row.into())
    }

    async fn delete_season(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "season")?;
        require_club_manager(ctx, club_of_season(state, id).await?).await?;

        service::delete_season(&state.db, id).await.into_gql()
    }
}
