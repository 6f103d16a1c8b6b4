//! Error types for ragrelay.

use thiserror::Error;

/// Library-level error type for relay operations.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Stream read failed: {0}")]
    Stream(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl RelayError {
    /// HTTP status code this error maps to at the server boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidInput(_) => 400,
            _ => 500,
        }
    }
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
