use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::gql::common::helpers::{load_competition, parse_id, require_competition_manager};
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::{competition_rounds, matches};

use super::service::{self, GenerateOptions};
use super::types::{FixtureSchedule, GenerateFixturesInput, KnockoutAdvance, PerformDrawInput};

fn parse_team_ids(ids: Option<Vec<ID>>) -> Result<Option<Vec<Uuid>>> {
    ids.map(|ids| ids.iter().map(|id| parse_id(id, "team")).collect())
        .transpose()
}

#[derive(Default)]
pub struct FixtureQuery;

#[Object]
impl FixtureQuery {
    /// Rounds with their fixtures, in round order.
    async fn fixture_schedule(&self, ctx: &Context<'_>, competition_id: ID) -> Result<FixtureSchedule> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        let competition = load_competition(&state.db, competition_id).await?;

        let (rounds, rows) = tokio::try_join!(
            competition_rounds::list_by_competition(&state.db, competition_id),
            matches::list_by_competition(&state.db, competition_id),
        )
        .into_gql()?;

        Ok(FixtureSchedule::assemble(competition.into(), rounds, rows))
    }
}

#[derive(Default)]
pub struct FixtureMutation;

#[Object]
impl FixtureMutation {
    /// Round-robin schedule for leagues, friendlies and group tournaments.
    async fn generate_fixtures(&self, ctx: &Context<'_>, input: GenerateFixturesInput) -> Result<FixtureSchedule> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&input.competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let options = GenerateOptions {
            team_ids: parse_team_ids(input.team_ids)?,
            home_and_away: input.home_and_away,
            randomize_order: input.randomize_order,
            seed_teams: false,
            start_date: input.start_date,
            days_between_rounds: input.days_between_rounds.map(i64::from),
            force_regenerate: input.force_regenerate,
        };
        let schedule = service::generate_fixtures(&state.db, &state.config, competition_id, options)
            .await
            .into_gql()?;
        Ok(schedule.into())
    }

    /// Knockout draw: bracket positions and the first round.
    async fn perform_draw(&self, ctx: &Context<'_>, input: PerformDrawInput) -> Result<FixtureSchedule> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&input.competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let options = GenerateOptions {
            team_ids: parse_team_ids(input.team_ids)?,
            home_and_away: Some(false),
            randomize_order: input.randomize_order,
            seed_teams: input.seed_teams,
            start_date: input.start_date,
            days_between_rounds: input.days_between_rounds.map(i64::from),
            force_regenerate: input.force_regenerate,
        };
        let schedule = service::perform_draw(&state.db, &state.config, competition_id, options)
            .await
            .into_gql()?;
        Ok(schedule.into())
    }

    /// Draw the next knockout round once the latest one is complete.
    async fn advance_knockout_round(&self, ctx: &Context<'_>, competition_id: ID) -> Result<KnockoutAdvance> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let progress = service::advance_knockout_round(&state.db, &state.config, competition_id)
            .await
            .into_gql()?;
        Ok(progress.into())
    }
}
