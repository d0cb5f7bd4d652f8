//! Error types for litro

use std::io;
use thiserror::Error;

/// Main error type for litro
#[derive(Error, Debug)]
pub enum LitroError {
    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Server request error: {0}")]
    Api(String),

    #[error("Audio playback error: {0}")]
    Audio(String),

    #[error("Audio playback blocked: {0}")]
    AudioBlocked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for litro operations
pub type Result<T> = std::result::Result<T, LitroError>;

impl From<String> for LitroError {
    fn from(s: String) -> Self {
        LitroError::Other(s)
    }
}

impl From<&str> for LitroError {
    fn from(s: &str) -> Self {
        LitroError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for LitroError {
    fn from(e: serde_json::Error) -> Self {
        LitroError::Api(format!("JSON error: {}", e))
    }
}
