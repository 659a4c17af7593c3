use anyhow::{Context, Result};
use std::env;

/// Engine defaults that callers may override per request.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub default_days_between_rounds: i64,
    /// Goals credited to the winner of a walkover when no score is given.
    pub walkover_goals: i32,
    pub top_scorers_default_limit: usize,
    pub top_scorers_max_limit: usize,
    pub standings_form_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_days_between_rounds: 7,
            walkover_goals: 3,
            top_scorers_default_limit: 10,
            top_scorers_max_limit: 100,
            standings_form_length: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            default_days_between_rounds: parse_or(
                "DEFAULT_DAYS_BETWEEN_ROUNDS",
                defaults.default_days_between_rounds,
            )?,
            walkover_goals: parse_or("WALKOVER_GOALS", defaults.walkover_goals)?,
            top_scorers_default_limit: parse_or(
                "TOP_SCORERS_DEFAULT_LIMIT",
                defaults.top_scorers_default_limit,
            )?,
            top_scorers_max_limit: parse_or("TOP_SCORERS_MAX_LIMIT", defaults.top_scorers_max_limit)?,
            standings_form_length: parse_or("STANDINGS_FORM_LENGTH", defaults.standings_form_length)?,
        };

        anyhow::ensure!(
            config.default_days_between_rounds >= 0,
            "DEFAULT_DAYS_BETWEEN_ROUNDS must not be negative"
        );
        anyhow::ensure!(config.walkover_goals > 0, "WALKOVER_GOALS must be positive");
        anyhow::ensure!(
            config.top_scorers_max_limit >= 1,
            "TOP_SCORERS_MAX_LIMIT must be at least 1"
        );

        Ok(config)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.default_days_between_rounds, 7);
        assert_eq!(c.walkover_goals, 3);
        assert_eq!(c.top_scorers_default_limit, 10);
        assert_eq!(c.top_scorers_max_limit, 100);
        assert_eq!(c.standings_form_length, 5);
    }

    #[test]
    fn unset_keys_fall_back() {
        let v: i32 = parse_or("ENGINE_CONFIG_TEST_UNSET_KEY", 42).unwrap();
        assert_eq!(v, 42);
    }
}
