//! Error types for the Module Builder and Backend Composer.

use thiserror::Error;

/// Result type alias for IaC build operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while building a module's Terragrunt/Terraform
/// directory.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("module '{0}' has no source path")]
    MissingSource(String),

    #[error("unresolved dependency '{dep}' in module '{module}'")]
    UnresolvedDependency { module: String, dep: String },

    #[error("template rendering failed: {0}")]
    RenderingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("core error: {0}")]
    Core(#[from] stackctl_core::CoreError),

    #[error("spec error: {0}")]
    Spec(#[from] stackctl_spec::SpecError),

    #[error("template error: {0}")]
    Template(#[from] stackctl_templates::TemplateError),

    #[error("secrets error: {0}")]
    Secrets(#[from] stackctl_secrets::SecretsError),
}
