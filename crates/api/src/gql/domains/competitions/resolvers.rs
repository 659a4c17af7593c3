use async_graphql::{Context, MaybeUndefined, Object, Result, ID};

use crate::auth::permissions::require_club_manager;
use crate::gql::common::helpers::{parse_id, require_competition_manager};
use crate::gql::common::types::PaginationInput;
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::{competitions, CompetitionFilter, CreateCompetition, UpdateCompetition};

use super::service;
use super::types::{
    Competition, CompetitionFilterInput, CompetitionPage, CompetitionStatus,
    CreateCompetitionInput, UpdateCompetitionInput,
};

#[derive(Default)]
pub struct CompetitionQuery;

#[Object]
impl CompetitionQuery {
    async fn competition(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Competition>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        let row = competitions::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(Competition::from))
    }

    /// Competitions by club, season or status.
    async fn competitions(
        &self,
        ctx: &Context<'_>,
        filter: Option<CompetitionFilterInput>,
        pagination: Option<PaginationInput>,
    ) -> Result<CompetitionPage> {
        let state = ctx.data::<AppState>()?;
        let filter = filter.unwrap_or_default();
        let filter = CompetitionFilter {
            club_id: filter.club_id.as_ref().map(|id| parse_id(id, "club")).transpose()?,
            season_id: filter
                .season_id
                .as_ref()
                .map(|id| parse_id(id, "season"))
                .transpose()?,
            status: filter.status.map(Into::into),
        };
        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total) = tokio::try_join!(
            competitions::list(&state.db, &filter, Some(page)),
            competitions::count(&state.db, &filter),
        )
        .into_gql()?;

        Ok(CompetitionPage {
            items: rows.into_iter().map(Competition::from).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }
}

#[derive(Default)]
pub struct CompetitionMutation;

#[Object]
impl CompetitionMutation {
    async fn create_competition(
        &self,
        ctx: &Context<'_>,
        input: CreateCompetitionInput,
    ) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&input.club_id, "club")?;
        require_club_manager(ctx, club_id).await?;

        let season_id = input
            .season_id
            .as_ref()
            .map(|id| parse_id(id, "season"))
            .transpose()?;

        let row = service::create_competition(
            &state.db,
            CreateCompetition {
                club_id,
                season_id,
                name: input.name,
                description: input.description,
                competition_type: input.competition_type.into(),
                is_team_based: input.is_team_based,
                min_teams: input.min_teams,
                max_teams: input.max_teams,
                points_for_win: input.points_for_win,
                points_for_draw: input.points_for_draw,
                points_for_loss: input.points_for_loss,
                start_date: input.start_date,
                end_date: input.end_date,
                registration_deadline: input.registration_deadline,
                promotion_places: input.promotion_places,
                relegation_places: input.relegation_places,
                head_to_head_tiebreak: input.head_to_head_tiebreak,
                home_and_away: input.home_and_away,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn update_competition(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCompetitionInput,
    ) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        require_competition_manager(ctx, id).await?;

        let season_id = input
            .season_id
            .as_ref()
            .map(|id| parse_id(id, "season"))
            .transpose()?;

        let row = service::update_competition(
            &state.db,
            id,
            UpdateCompetition {
                season_id,
                name: input.name,
                description: input.description,
                min_teams: input.min_teams,
                max_teams: match input.max_teams {
                    MaybeUndefined::Undefined => None,
                    MaybeUndefined::Null => Some(None),
                    MaybeUndefined::Value(max) => Some(Some(max)),
                },
                points_for_win: input.points_for_win,
                points_for_draw: input.points_for_draw,
                points_for_loss: input.points_for_loss,
                start_date: input.start_date,
                end_date: input.end_date,
                registration_deadline: input.registration_deadline,
                promotion_places: input.promotion_places,
                relegation_places: input.relegation_places,
                head_to_head_tiebreak: input.head_to_head_tiebreak,
                home_and_away: input.home_and_away,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn delete_competition(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        require_competition_manager(ctx, id).await?;

        service::delete_competition(&state.db, id).await.into_gql()
    }

    async fn publish_competition(&self, ctx: &Context<'_>, id: ID) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        require_competition_manager(ctx, id).await?;

        let row = service::publish_competition(&state.db, &state.config, id)
            .await
            .into_gql()?;
        Ok(row.into())
    }

    /// Move the competition to `status`. DrawComplete is only reached through
    /// generateFixtures or performDraw.
    async fn update_competition_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: CompetitionStatus,
    ) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        require_competition_manager(ctx, id).await?;

        let row = service::transition_competition(&state.db, &state.config, id, status.into())
            .await
            .into_gql()?;
        Ok(row.into())
    }

    async fn resume_competition(&self, ctx: &Context<'_>, id: ID) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "competition")?;
        require_competition_manager(ctx, id).await?;

        let row = service::resume_competition(&state.db, &state.config, id)
            .await
            .into_gql()?;
        Ok(row.into())
    }
}
