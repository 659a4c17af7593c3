use std::env;

use async_graphql::dataloader::DataLoader;
use async_graphql::Schema;

use super::loaders::{CompetitionLoader, ParticipantLoader, TeamLoader};
use super::{MutationRoot, QueryRoot, SubscriptionRoot};
use crate::state::AppState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema and inject shared state (AppState) into the context.
pub fn build_schema(state: AppState) -> AppSchema {
    let team_loader = DataLoader::new(TeamLoader::new(state.db.clone()), tokio::spawn);
    let participant_loader =
        DataLoader::new(ParticipantLoader::new(state.db.clone()), tokio::spawn);
    let competition_loader =
        DataLoader::new(CompetitionLoader::new(state.db.clone()), tokio::spawn);

    let introspection_enabled = env::var("GQL_INTROSPECTION")
        .map(|v| v == "true")
        .unwrap_or(false);

    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(state)
    .data(team_loader)
    .data(participant_loader)
    .data(competition_loader)
    .limit_depth(15)
    .limit_complexity(500);

    if !introspection_enabled {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
