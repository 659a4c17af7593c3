use async_graphql::MergedObject;

use crate::gql::domains::competitions::CompetitionQuery;
use crate::gql::domains::fixtures::FixtureQuery;
use crate::gql::domains::matches::MatchQuery;
use crate::gql::domains::participants::ParticipantQuery;
use crate::gql::domains::rounds::RoundQuery;
use crate::gql::domains::scorers::ScorerQuery;
use crate::gql::domains::seasons::SeasonQuery;
use crate::gql::domains::standings::StandingsQuery;
use crate::gql::domains::teams::TeamQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    CompetitionQuery,
    FixtureQuery,
    MatchQuery,
    ParticipantQuery,
    RoundQuery,
    ScorerQuery,
    SeasonQuery,
    StandingsQuery,
    TeamQuery,
);
