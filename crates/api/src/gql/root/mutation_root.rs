use async_graphql::MergedObject;

use crate::gql::domains::competitions::CompetitionMutation;
use crate::gql::domains::fixtures::FixtureMutation;
use crate::gql::domains::matches::MatchMutation;
use crate::gql::domains::participants::ParticipantMutation;
use crate::gql::domains::rounds::RoundMutation;
use crate::gql::domains::seasons::SeasonMutation;
use crate::gql::domains::standings::StandingsMutation;
use crate::gql::domains::teams::TeamMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    CompetitionMutation,
    FixtureMutation,
    MatchMutation,
    ParticipantMutation,
    RoundMutation,
    SeasonMutation,
    StandingsMutation,
    TeamMutation,
);
