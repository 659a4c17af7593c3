//! Storage-free competition logic. Workflows in `gql::domains` load rows,
//! call into here and persist what comes back.

pub mod error;
pub mod fixtures;
pub mod knockout;
pub mod lifecycle;
pub mod outcome;
pub mod scorers;
pub mod standings;

pub use error::{CompetitionError, EngineResult};
