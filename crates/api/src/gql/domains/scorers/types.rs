use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Result, SimpleObject, ID};
use uuid::Uuid;

use crate::engine::scorers::ScorerLine;
use crate::gql::domains::teams::types::CompetitionTeam;
use crate::gql::error::ResultExt;
use crate::gql::loaders::TeamLoader;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct TopScorer {
    pub rank: i32,
    pub participant_id: ID,
    pub team_id: ID,
    pub display_name: String,
    /// Penalties included; own goals excluded.
    pub goals: i32,
    pub penalty_goals: i32,
    pub assists: i32,
    pub appearances: i32,
}

impl From<ScorerLine> for TopScorer {
    fn from(line: ScorerLine) -> Self {
        let t = line.tally;
        Self {
            rank: line.rank,
            participant_id: t.participant_id.into(),
            team_id: t.team_id.into(),
            display_name: t.display_name,
            goals: t.goals,
            penalty_goals: t.penalty_goals,
            assists: t.assists,
            appearances: t.appearances,
        }
    }
}

#[ComplexObject]
impl TopScorer {
    async fn team(&self, ctx: &Context<'_>) -> Result<Option<CompetitionTeam>> {
        let team_id = Uuid::parse_str(self.team_id.as_str()).gql_err("Invalid team ID")?;
        let loader = ctx.data::<DataLoader<TeamLoader>>()?;
        let row = loader
            .load_one(team_id)
            .await
            .gql_err("Loading team failed")?;
        Ok(row.map(Into::into))
    }
}
