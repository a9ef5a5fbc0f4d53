//! Error types for the external process runner.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur spawning or running the terraform/terragrunt
/// binaries.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("binary not found at {0}")]
    BinaryNotFound(String),

    #[error("process '{command}' exited with status {exit_code}: {stderr}")]
    ProcessFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
