//! Error types for the template environment.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while resolving includes or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("!include depth exceeded {max} levels resolving {path}")]
    IncludeDepthExceeded { path: String, max: usize },

    #[error("!include fragment not found: {fragment} in {path}")]
    FragmentNotFound { path: String, fragment: String },

    #[error("template rendering failed: {0}")]
    RenderingFailed(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("core error: {0}")]
    Core(#[from] stackctl_core::CoreError),
}
