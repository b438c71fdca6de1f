//! Game configuration with documented constants
//!
//! Timing values mirror the pacing of the boss battle and adventure screens.
//! Combat numbers live in `combat::constants` because changing them changes
//! game balance, not presentation.

use crate::core::clock::Millis;
use crate::core::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration, usually loaded from `lightsouls.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub speech: SpeechConfig,
}

/// Delays that drive narration and phase transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time between revealed characters in the battle narration
    ///
    /// At 20ms a typical 200 character turn summary takes four seconds.
    pub reveal_interval_ms: Millis,

    /// Pause between a terminal blow and the victory/defeat text
    pub conclusion_delay_ms: Millis,

    /// How long the enrage banner holds before the turn outcome is shown
    pub enrage_hold_ms: Millis,

    /// Delay between the end of an outcome reveal and re-enabling actions
    pub input_unlock_ms: Millis,

    /// Adventure mode: delay after a correct choice before the next round loads
    pub next_round_delay_ms: Millis,

    /// Adventure mode: delay after a final choice before the end screen
    pub adventure_end_delay_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: 20,
            conclusion_delay_ms: 1500,
            enrage_hold_ms: 2500,
            input_unlock_ms: 3000,
            next_round_delay_ms: 5000,
            adventure_end_delay_ms: 3000,
        }
    }
}

/// Voice settings forwarded to the speech synthesis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub voice_id: String,
    pub model: String,
    pub language: String,
    /// Emotion tag wrapped around the narration in the SSML payload
    pub emotion: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice_id: "oliver".into(),
            model: "simba-english".into(),
            language: "en-US".into(),
            emotion: "bright".into(),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            GameError::ConfigError(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.timing.reveal_interval_ms == 0 {
            return Err(GameError::ConfigError(
                "timing.reveal_interval_ms must be positive".into(),
            ));
        }

        if self.speech.voice_id.trim().is_empty() {
            return Err(GameError::ConfigError("speech.voice_id must not be empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_timings() {
        let timing = TimingConfig::default();
        assert_eq!(timing.reveal_interval_ms, 20);
        assert_eq!(timing.conclusion_delay_ms, 1500);
        assert_eq!(timing.enrage_hold_ms, 2500);
        assert_eq!(timing.input_unlock_ms, 3000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [timing]
            reveal_interval_ms = 5

            [speech]
            voice_id = "henry"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.timing.reveal_interval_ms, 5);
        assert_eq!(config.timing.conclusion_delay_ms, 1500);
        assert_eq!(config.speech.voice_id, "henry");
        assert_eq!(config.speech.language, "en-US");
    }

    #[test]
    fn test_zero_reveal_interval_rejected() {
        let result = GameConfig::from_toml_str("[timing]\nreveal_interval_ms = 0\n");
        assert!(matches!(result, Err(GameError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = GameConfig::from_toml_str("[timing\n");
        assert!(matches!(result, Err(GameError::TomlError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = GameConfig::load("does/not/exist.toml");
        assert!(matches!(result, Err(GameError::ConfigError(_))));
    }
}
