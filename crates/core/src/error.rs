//! Error types for docchat.
//!
//! A single error enum covers configuration, credentials, ingestion, model
//! calls, prompt rendering and serialization. The per-turn path of the
//! conversation never lets one of these escape; it turns them into messages.

use thiserror::Error;

/// Unified error type for docchat.
///
/// All library functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or rejected model-service credential.
    ///
    /// Displayed verbatim: the operator needs to see exactly what is wrong.
    #[error("{0}")]
    Credential(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source document could not be fetched or parsed
    #[error("{0}")]
    Ingest(String),

    /// Model-service transport, API or decoding errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// User-facing answer generation failure (details are logged, not shown)
    #[error("{0}")]
    Generation(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error is the distinguished credential failure.
    pub fn is_credential(&self) -> bool {
        matches!(self, AppError::Credential(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
