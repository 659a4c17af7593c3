pub mod club_managers;
pub mod clubs;
pub mod competition_participants;
pub mod competition_rounds;
pub mod competition_standings;
pub mod competition_teams;
pub mod competitions;
pub mod match_events;
pub mod match_lineups;
pub mod matches;
pub mod members;
pub mod seasons;
pub mod venues;

pub use competition_participants::{CreateParticipant, ParticipantRole, ParticipantTotals};
pub use competition_rounds::CreateRound;
pub use competition_standings::UpsertStanding;
pub use competition_teams::{CreateTeam, TeamAggregates, TeamStatus, UpdateTeam};
pub use competitions::{
    CompetitionFilter, CompetitionStatus, CompetitionType, CreateCompetition, UpdateCompetition,
};
pub use match_events::{CreateMatchEvent, MatchEventType};
pub use match_lineups::CreateLineupEntry;
pub use matches::{CreateMatch, MatchFilter, MatchResult, MatchStatus, RecordResult};
pub use seasons::{CreateSeason, UpdateSeason};
