use thiserror::Error;

use crate::combat::Phase;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Not accepting input while {0:?}")]
    NotAcceptingInput(Phase),

    #[error("Ability unavailable: {0}")]
    AbilityUnavailable(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Speech error: {0}")]
    SpeechError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
