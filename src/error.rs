//! Error types for the tour assistant.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, TourError>;

/// Errors that can occur while planning a trip.
#[derive(Error, Debug)]
pub enum TourError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the terminal or another stream failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// No API key was configured.
    #[error("Missing API_KEY. Set it in your environment or .env file.")]
    MissingApiKey,

    /// The user's travel preferences were rejected.
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider rejected our credentials.
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The provider is throttling us or the quota ran out.
    #[error("Rate limited by LLM provider: {0}")]
    RateLimited(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// The model kept requesting tools without answering.
    #[error("Model requested tools {0} times in a row without answering")]
    ToolLoop(usize),
}

impl TourError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a preferences error.
    pub fn preferences(msg: impl Into<String>) -> Self {
        Self::InvalidPreferences(msg.into())
    }
}

impl From<reqwest::Error> for TourError {
    fn from(err: reqwest::Error) -> Self {
        TourError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TourError {
    fn from(err: serde_json::Error) -> Self {
        TourError::LlmParse(err.to_string())
    }
}
