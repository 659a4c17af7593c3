use async_graphql::{Error, ErrorExtensions};

use crate::engine::CompetitionError;

/// Engine errors keep their message and carry the taxonomy in `extensions.code`.
impl ErrorExtensions for CompetitionError {
    fn extend(&self) -> Error {
        match self {
            CompetitionError::Database(e) => tracing::error!("Database error: {e}"),
            CompetitionError::Invariant(reason) => {
                tracing::error!("Invariant violation: {reason}")
            }
            _ => {}
        }

        let code = self.code();
        Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

/// Extension trait that converts any `Result<T, E>` where `E: Display`
/// into `async_graphql::Result<T>` with a contextual message prefix.
///
/// Usage: `Uuid::parse_str(id).gql_err("Invalid competition ID")?`
pub trait ResultExt<T> {
    fn gql_err(self, context: &str) -> std::result::Result<T, Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, Error> {
        self.map_err(|e| {
            Error::new(format!("{context}: {e}"))
                .extend_with(|_, ext| ext.set("code", "VALIDATION_ERROR"))
        })
    }
}

/// `result.into_gql()?` keeps the error code that a plain `?` would drop.
/// Works for engine results and raw repository results alike.
pub trait EngineResultExt<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<CompetitionError>> EngineResultExt<T> for Result<T, E> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.into().extend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn code_of(err: &Error) -> Option<Value> {
        err.extensions.as_ref().and_then(|ext| ext.get("code").cloned())
    }

    #[test]
    fn engine_errors_carry_their_code() {
        let err = CompetitionError::conflict("match is already completed").extend();
        assert_eq!(err.message, "match is already completed");
        assert_eq!(code_of(&err), Some(Value::from("CONFLICT")));
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let err = CompetitionError::from(sqlx::Error::RowNotFound).extend();
        assert_eq!(err.message, "database error");
        assert_eq!(code_of(&err), Some(Value::from("INTERNAL")));
    }

    #[test]
    fn bad_ids_are_validation_errors() {
        let err = uuid::Uuid::parse_str("nope")
            .gql_err("Invalid match ID")
            .unwrap_err();
        assert!(err.message.starts_with("Invalid match ID"));
        assert_eq!(code_of(&err), Some(Value::from("VALIDATION_ERROR")));
    }
}
