//! Translates orchestrator-layer errors into the API's HTTP error shape:
//! `NotFound` maps to 404, everything else to 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("cluster '{0}' not found")]
    ClusterNotFound(String),

    #[error("stack '{0}' not found in cluster '{1}'")]
    StackNotFound(String, String),

    #[error("module '{0}' not found in stack '{1}'")]
    ModuleNotFound(String, String),

    #[error("secret '{0}' not found")]
    SecretNotFound(String),

    #[error(transparent)]
    Orchestrator(#[from] stackctl_orchestrator::OrchestratorError),

    #[error(transparent)]
    Secrets(#[from] stackctl_secrets::SecretsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::ClusterNotFound(_)
            | ApiError::StackNotFound(_, _)
            | ApiError::ModuleNotFound(_, _)
            | ApiError::SecretNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Orchestrator(stackctl_orchestrator::OrchestratorError::ClusterNotFound(_))
            | ApiError::Orchestrator(stackctl_orchestrator::OrchestratorError::StackNotFound(_, _))
            | ApiError::Orchestrator(stackctl_orchestrator::OrchestratorError::OperationNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody { error: self.to_string() });
        (status, body).into_response()
    }
}
