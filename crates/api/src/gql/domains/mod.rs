pub mod competitions;
pub mod fixtures;
pub mod matches;
pub mod participants;
pub mod rounds;
pub mod scorers;
pub mod seasons;
pub mod standings;
pub mod teams;
