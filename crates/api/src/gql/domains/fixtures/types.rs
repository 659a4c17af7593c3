use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::gql::domains::competitions::types::Competition;
use crate::gql::domains::matches::types::Match;
use crate::gql::domains::rounds::types::CompetitionRound;
use infra::models::{CompetitionRoundRow, MatchRow};

use super::service::{GeneratedSchedule, KnockoutProgress};

#[derive(InputObject)]
pub struct GenerateFixturesInput {
    pub competition_id: ID,
    /// Restrict the schedule to these teams. Defaults to every confirmed team.
    pub team_ids: Option<Vec<ID>>,
    /// Overrides the competition setting.
    pub home_and_away: Option<bool>,
    #[graphql(default)]
    pub randomize_order: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub days_between_rounds: Option<i32>,
    /// Replace unplayed fixtures of an already drawn competition.
    #[graphql(default)]
    pub force_regenerate: bool,
}

#[derive(InputObject)]
pub struct PerformDrawInput {
    pub competition_id: ID,
    pub team_ids: Option<Vec<ID>>,
    /// Keep seeded teams apart in the bracket.
    #[graphql(default = true)]
    pub seed_teams: bool,
    #[graphql(default)]
    pub randomize_order: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub days_between_rounds: Option<i32>,
    /// Redraw while no first-round tie has been played.
    #[graphql(default)]
    pub force_regenerate: bool,
}

/// One round and its fixtures.
#[derive(SimpleObject, Clone)]
pub struct ScheduledRound {
    pub round: CompetitionRound,
    pub matches: Vec<Match>,
}

#[derive(SimpleObject, Clone)]
pub struct FixtureSchedule {
    pub competition: Competition,
    pub rounds: Vec<ScheduledRound>,
    /// Fixtures that belong to no round.
    pub unassigned: Vec<Match>,
}

impl FixtureSchedule {
    pub fn assemble(
        competition: Competition,
        rounds: Vec<CompetitionRoundRow>,
        matches: Vec<MatchRow>,
    ) -> Self {
        let mut unassigned = Vec::new();
        let mut by_round: Vec<(CompetitionRoundRow, Vec<Match>)> =
            rounds.into_iter().map(|r| (r, Vec::new())).collect();

        for row in matches {
            match by_round
                .iter_mut()
                .find(|(round, _)| Some(round.id) == row.round_id)
            {
                Some((_, list)) => list.push(row.into()),
                None => unassigned.push(row.into()),
            }
        }

        Self {
            competition,
            rounds: by_round
                .into_iter()
                .map(|(round, matches)| ScheduledRound {
                    round: round.into(),
                    matches,
                })
                .collect(),
            unassigned,
        }
    }
}

impl From<GeneratedSchedule> for FixtureSchedule {
    fn from(s: GeneratedSchedule) -> Self {
        FixtureSchedule::assemble(s.competition.into(), s.rounds, s.matches)
    }
}

/// Outcome of advancing a knockout bracket.
#[derive(SimpleObject, Clone)]
pub struct KnockoutAdvance {
    /// The newly drawn round, unless the final was settled.
    pub next_round: Option<CompetitionRound>,
    pub decided: bool,
    pub champion_team_id: Option<ID>,
    pub runner_up_team_id: Option<ID>,
}

impl From<KnockoutProgress> for KnockoutAdvance {
    fn from(p: KnockoutProgress) -> Self {
        match p {
            KnockoutProgress::NextRound(round) => Self {
                next_round: Some(round.into()),
                decided: false,
                champion_team_id: None,
                runner_up_team_id: None,
            },
            KnockoutProgress::Decided {
                champion,
                runner_up,
            } => Self {
                next_round: None,
                decided: true,
                champion_team_id: champion.map(Into::into),
                runner_up_team_id: runner_up.map(Into::into),
            },
        }
    }
}
