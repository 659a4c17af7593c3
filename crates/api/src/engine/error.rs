use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy shared by the engine and the workflows built on it.
#[derive(Debug, Error)]
pub enum CompetitionError {
    /// Malformed or out-of-range input. Surfaced as is, never retried.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// Illegal state transition. The caller should re-fetch and decide again.
    #[error("{0}")]
    Conflict(String),

    /// Stored data contradicts itself. Logged and surfaced, never repaired.
    #[error("internal consistency error: {0}")]
    Invariant(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl CompetitionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CompetitionError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CompetitionError::Conflict(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        CompetitionError::Invariant(msg.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CompetitionError::NotFound { entity, id }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompetitionError::Validation(_) => "VALIDATION_ERROR",
            CompetitionError::NotFound { .. } => "NOT_FOUND",
            CompetitionError::Conflict(_) => "CONFLICT",
            CompetitionError::Invariant(_) => "INVARIANT_VIOLATION",
            CompetitionError::Database(_) => "INTERNAL",
        }
    }
}

pub type EngineResult<T> = Result<T, CompetitionError>;
