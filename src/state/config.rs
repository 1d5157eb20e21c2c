//! Game configuration.

use serde::Deserialize;

use super::error::{GameError, Result};

/// Round limit given to new sessions (best of three).
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round limit assigned to newly created sessions
    pub default_max_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| GameError::invalid(format!("malformed game config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_max_rounds == 0 {
            return Err(GameError::invalid("default_max_rounds must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(GameConfig::default().default_max_rounds, 3);
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_from_json() {
        let config = GameConfig::from_json(r#"{"default_max_rounds": 5}"#).unwrap();
        assert_eq!(config.default_max_rounds, 5);
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        assert!(matches!(
            GameConfig::from_json(r#"{"default_max_rounds": 0}"#),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(GameConfig::from_json("not json").is_err());
    }
}
