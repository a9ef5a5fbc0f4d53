//! Error types for the orchestrator.

use thiserror::Error;

/// Result type alias for orchestrator operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Errors that can occur configuring or building a workspace.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("config file not found at {0}")]
    ConfigNotFound(String),

    #[error("TF_VAR_vault_token is not set")]
    VaultTokenMissing,

    #[error("cluster '{0}' not found")]
    ClusterNotFound(String),

    #[error("stack '{0}' not found in cluster '{1}'")]
    StackNotFound(String, String),

    #[error("operation '{0}' not found")]
    OperationNotFound(String),

    #[error("invalid target '{0}': expected cluster[:stack] or cluster/stack/operation")]
    InvalidTarget(String),

    #[error("process exception: {0}")]
    ProcessException(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("core error: {0}")]
    Core(#[from] stackctl_core::CoreError),

    #[error("spec error: {0}")]
    Spec(#[from] stackctl_spec::SpecError),

    #[error("template error: {0}")]
    Template(#[from] stackctl_templates::TemplateError),

    #[error("iac error: {0}")]
    Iac(#[from] stackctl_iac::IacError),

    #[error("secrets error: {0}")]
    Secrets(#[from] stackctl_secrets::SecretsError),

    #[error("runner error: {0}")]
    Runner(#[from] stackctl_ops::RunnerError),
}

/// Env var carrying the secret store token (Vault KV-v2 in the reference
/// deployment); checked at `configure()` time.
pub const STACKCTL_VAULT_TOKEN_VAR: &str = "TF_VAR_vault_token";
