//! Per-request state. No orchestrator instance is shared across requests —
//! `AppState` only carries the workspace root, and every handler calls
//! `Orchestrator::configure` itself. This keeps concurrent requests free of
//! shared mutable state, per the facade's "stateless handler" design.

use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
}

impl AppState {
    pub fn from_env() -> Self {
        Self {
            root: stackctl_orchestrator::Orchestrator::root_from_env(),
        }
    }
}
