//! Ties the spec/template/iac/secrets/ops crates into the three
//! user-facing verbs: `build`, `update`, and `run_operation`. The
//! [`Orchestrator`] is constructed fresh per invocation (CLI command or
//! API request) — there is no process-wide singleton.

pub mod build;
pub mod context;
pub mod error;
pub mod operation;
pub mod update;

pub use build::BuildTarget;
pub use context::{Orchestrator, STACKD_ROOT_VAR};
pub use error::{OrchestratorError, OrchestratorResult, STACKCTL_VAULT_TOKEN_VAR};
pub use operation::OperationTarget;
