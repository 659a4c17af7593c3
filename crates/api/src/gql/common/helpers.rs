use async_graphql::{Context, ErrorExtensions, ID};
use uuid::Uuid;

use crate::auth::permissions::{require_club_manager, Caller};
use crate::engine::CompetitionError;
use crate::gql::error::{EngineResultExt, ResultExt};
use crate::state::AppState;
use infra::models::CompetitionRow;
use infra::repos::{competition_participants, competition_rounds, competition_teams, competitions, matches};

/// Parse a GraphQL ID, naming the entity in the error.
pub fn parse_id(id: &ID, entity: &str) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).gql_err(&format!("Invalid {entity} ID"))
}

pub async fn load_competition(
    db: &infra::db::Db,
    competition_id: Uuid,
) -> async_graphql::Result<CompetitionRow> {
    competitions::get_by_id(db, competition_id)
        .await
        .into_gql()?
        .ok_or_else(|| CompetitionError::not_found("competition", competition_id).extend())
}

/// The organizer check for anything scoped to a competition.
pub async fn require_competition_manager(
    ctx: &Context<'_>,
    competition_id: Uuid,
) -> async_graphql::Result<Caller> {
    let state = ctx.data::<AppState>()?;
    let competition = load_competition(&state.db, competition_id).await?;
    require_club_manager(ctx, competition.club_id).await
}

/// Which competition an entity belongs to, for authorization.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Team(Uuid),
    Participant(Uuid),
    Round(Uuid),
    Match(Uuid),
}

pub async fn competition_of(db: &infra::db::Db, scope: Scope) -> async_graphql::Result<Uuid> {
    let found = match scope {
        Scope::Team(id) => competition_teams::get_by_id(db, id)
            .await
            .map(|r| r.map(|t| t.competition_id)),
        Scope::Participant(id) => competition_participants::get_by_id(db, id)
            .await
            .map(|r| r.map(|p| p.competition_id)),
        Scope::Round(id) => competition_rounds::get_by_id(db, id)
            .await
            .map(|r| r.map(|round| round.competition_id)),
        Scope::Match(id) => matches::get_by_id(db, id)
            .await
            .map(|r| r.map(|m| m.competition_id)),
    }
    .into_gql()?;

    found.ok_or_else(|| {
        let (entity, id) = match scope {
            Scope::Team(id) => ("team", id),
            Scope::Participant(id) => ("participant", id),
            Scope::Round(id) => ("round", id),
            Scope::Match(id) => ("match", id),
        };
        CompetitionError::not_found(entity, id).extend()
    })
}

/// Resolve the owning competition of `scope` and check the caller organises it.
pub async fn require_scope_manager(
    ctx: &Context<'_>,
    scope: Scope,
) -> async_graphql::Result<Caller> {
    let state = ctx.data::<AppState>()?;
    let competition_id = competition_of(&state.db, scope).await?;
    require_competition_manager(ctx, competition_id).await
}
