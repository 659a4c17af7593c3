use async_graphql::{Context, Object, Result, ID};

use crate::gql::common::helpers::{parse_id, require_competition_manager, require_scope_manager, Scope};
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::{competition_teams, CreateTeam, TeamStatus as DbStatus, UpdateTeam};

use super::service;
use super::types::{CompetitionTeam, RegisterTeamInput, TeamStatus, UpdateTeamInput, WithdrawTeamInput};

#[derive(Default)]
pub struct TeamQuery;

#[Object]
impl TeamQuery {
    async fn teams(
        &self,
        ctx: &Context<'_>,
        competition_id: ID,
        status: Option<TeamStatus>,
    ) -> Result<Vec<CompetitionTeam>> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        let rows =
            competition_teams::list_by_competition(&state.db, competition_id, status.map(Into::into))
                .await
                .into_gql()?;
        Ok(rows.into_iter().map(CompetitionTeam::from).collect())
    }

    async fn team(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CompetitionTeam>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "team")?;
        let row = competition_teams::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(CompetitionTeam::from))
    }
}

#[derive(Default)]
pub struct TeamMutation;

#[Object]
impl TeamMutation {
    async fn register_team(&self, ctx: &Context<'_>, input: RegisterTeamInput) -> Result<CompetitionTeam> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&input.competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let captain_member_id = input
            .captain_member_id
            .as_ref()
            .map(|id| parse_id(id, "member"))
            .transpose()?;

        let row = service::register_team(
            &state.db,
            CreateTeam {
                competition_id,
                name: input.name,
                seed_number: input.seed_number,
                group_name: input.group_name,
                captain_member_id,
                contact_email: input.contact_email,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn approve_team(&self, ctx: &Context<'_>, id: ID) -> Result<CompetitionTeam> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "team")?;
        require_scope_manager(ctx, Scope::Team(id)).await?;

        let row = service::approve_team(&state.db, id).await.into_gql()?;
        Ok(row.into())
    }

    /// Seed, group and contact details. Frozen once the draw is made.
    async fn update_team(&self, ctx: &Context<'_>, id: ID, input: UpdateTeamInput) -> Result<CompetitionTeam> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "team")?;
        require_scope_manager(ctx, Scope::Team(id)).await?;

        let captain_member_id = input
            .captain_member_id
            .as_ref()
            .map(|id| parse_id(id, "member"))
            .transpose()?;

        let row = service::update_team(
            &state.db,
            id,
            UpdateTeam {
                name: input.name,
                seed_number: input.seed_number,
                group_name: input.group_name,
                captain_member_id,
                contact_email: input.contact_email,
            },
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn withdraw_team(&self, ctx: &Context<'_>, input: WithdrawTeamInput) -> Result<CompetitionTeam> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&input.team_id, "team")?;
        require_scope_manager(ctx, Scope::Team(id)).await?;

        let row = service::remove_team(
            &state.db,
            &state.config,
            id,
            DbStatus::Withdrawn,
            input.reason,
            input.void_played_results,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn disqualify_team(&self, ctx: &Context<'_>, input: WithdrawTeamInput) -> Result<CompetitionTeam> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&input.team_id, "team")?;
        require_scope_manager(ctx, Scope::Team(id)).await?;

        let row = service::remove_team(
            &state.db,
            &state.config,
            id,
            DbStatus::Disqualified,
            input.reason,
            input.void_played_results,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }
}
