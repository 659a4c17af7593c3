use async_graphql::{Context, Object, Result, ID};

use crate::gql::common::helpers::{parse_id, require_scope_manager, Scope};
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::competition_participants;

use super::service;
use super::types::{AddParticipantInput, CompetitionParticipant, UpdateParticipantInput};

#[derive(Default)]
pub struct ParticipantQuery;

#[Object]
impl ParticipantQuery {
    async fn participant(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CompetitionParticipant>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "participant")?;
        let row = competition_participants::get_by_id(&state.db, id)
            .await
            .into_gql()?;
        Ok(row.map(CompetitionParticipant::from))
    }

    async fn team_participants(&self, ctx: &Context<'_>, team_id: ID) -> Result<Vec<CompetitionParticipant>> {
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&team_id, "team")?;
        let rows = competition_participants::list_by_team(&state.db, team_id)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(CompetitionParticipant::from).collect())
    }

    async fn competition_participants(
        &self,
        ctx: &Context<'_>,
        competition_id: ID,
    ) -> Result<Vec<CompetitionParticipant>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        let rows = competition_participants::list_by_competition(&state.db, competition_id)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(CompetitionParticipant::from).collect())
    }
}

#[derive(Default)]
pub struct ParticipantMutation;

#[Object]
impl ParticipantMutation {
    async fn add_participant(
        &self,
        ctx: &Context<'_>,
        input: AddParticipantInput,
    ) -> Result<CompetitionParticipant> {
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&input.team_id, "team")?;
        let member_id = parse_id(&input.member_id, "member")?;
        require_scope_manager(ctx, Scope::Team(team_id)).await?;

        let row = service::add_participant(
            &state.db,
            state.members(),
            team_id,
            member_id,
            input.role.into(),
            input.shirt_number,
            input.display_name,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn update_participant(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateParticipantInput,
    ) -> Result<CompetitionParticipant> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "participant")?;
        require_scope_manager(ctx, Scope::Participant(id)).await?;

        let row = service::update_participant(
            &state.db,
            id,
            input.role.map(Into::into),
            input.shirt_number,
            input.display_name,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn remove_participant(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "participant")?;
        require_scope_manager(ctx, Scope::Participant(id)).await?;

        service::remove_participant(&state.db, id).await.into_gql()
    }
}
