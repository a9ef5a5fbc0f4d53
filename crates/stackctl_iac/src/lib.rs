//! # stackctl_iac
//!
//! Module Builder and Backend Composer: the pieces that turn one
//! [`stackctl_core::Module`] into a rendered Terragrunt/Terraform build
//! directory.

pub mod backend;
pub mod builder;
pub mod error;
pub mod types;

pub use backend::{compose_backend, default_backend_config};
pub use builder::{
    attach_secret_statuses, build_dependency, build_module, write_module, BuiltModule, ModuleBuildInput,
    RenderedFiles,
};
pub use error::{IacError, IacResult};
pub use types::{infer_type, variables_list, EXCLUDED_VARS};
