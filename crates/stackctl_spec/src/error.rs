//! Error types for spec loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while loading and parsing a spec document.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("spec file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid spec format in {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("spec validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] stackctl_templates::TemplateError),

    #[error("core error: {0}")]
    Core(#[from] stackctl_core::CoreError),
}
