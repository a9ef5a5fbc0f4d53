//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown repo scheme: {0}")]
    UnknownScheme(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("config file not found at {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("repo {name}: tag '{tag}' not found")]
    RepoTagMissing { name: String, tag: String },

    #[error("repo {name}: git command failed: {message}")]
    GitFailed { name: String, message: String },

    #[error("binary {binary}: download failed: {message}")]
    BinaryDownloadFailed { binary: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
