//! Game Configuration
//!
//! Loaded once at startup from defaults, environment variables or JSON.

use chrono::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::state::Amount;

/// Default entry fee in base units.
pub const DEFAULT_ENTRY_FEE: Amount = 1_000_000_000;

/// Default round length (1 hour).
pub const DEFAULT_ROUND_DURATION_SECS: u64 = 3_600;

/// Longest accepted round (10 years).
pub const MAX_ROUND_DURATION_SECS: u64 = 10 * 365 * 24 * 3_600;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but unparseable.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed but semantically invalid.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Exact fee required to join a round.
    pub entry_fee: Amount,
    /// Seconds after round start before `expire` is allowed.
    pub round_duration_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            entry_fee: DEFAULT_ENTRY_FEE,
            round_duration_secs: DEFAULT_ROUND_DURATION_SECS,
        }
    }
}

impl GameConfig {
    /// Create config from environment variables.
    ///
    /// Reads `TREASURE_ENTRY_FEE` and `TREASURE_ROUND_DURATION_SECS`;
    /// unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            entry_fee: env_or("TREASURE_ENTRY_FEE", defaults.entry_fee)?,
            round_duration_secs: env_or(
                "TREASURE_ROUND_DURATION_SECS",
                defaults.round_duration_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_fee == 0 {
            return Err(ConfigError::Invalid("entry_fee must be non-zero"));
        }
        if self.round_duration_secs == 0 {
            return Err(ConfigError::Invalid("round_duration_secs must be non-zero"));
        }
        if self.round_duration_secs > MAX_ROUND_DURATION_SECS {
            return Err(ConfigError::Invalid("round_duration_secs too large"));
        }
        Ok(())
    }

    /// Round length as a duration.
    pub fn round_duration(&self) -> Duration {
        Duration::seconds(self.round_duration_secs.min(MAX_ROUND_DURATION_SECS) as i64)
    }
}

fn env_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.round_duration(), Duration::hours(1));
    }

    #[test]
    fn test_from_json_partial() {
        let config = GameConfig::from_json(r#"{"entry_fee": 250}"#).unwrap();
        assert_eq!(config.entry_fee, 250);
        assert_eq!(config.round_duration_secs, DEFAULT_ROUND_DURATION_SECS);
    }

    #[test]
    fn test_from_json_rejects_zero_fee() {
        assert!(matches!(
            GameConfig::from_json(r#"{"entry_fee": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_env_parse_error() {
        // Unique variable name so parallel tests don't interfere.
        std::env::set_var("TREASURE_TEST_BAD_FEE", "lots");
        assert!(matches!(
            env_or("TREASURE_TEST_BAD_FEE", 1),
            Err(ConfigError::InvalidEnv { .. })
        ));
        assert_eq!(env_or("TREASURE_TEST_UNSET_VAR", 7).unwrap(), 7);
    }
}
