//! Error types for the secret facade.

use thiserror::Error;

/// Result type alias for secret store operations.
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors that can occur talking to a secret store.
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("secret store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
