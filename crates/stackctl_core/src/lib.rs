//! # stackctl_core
//!
//! Data model, URI resolution, repo/binary management, and the merge engine
//! shared by the rest of stackctl.
//!
//! # Architecture
//!
//! - **model**: declarative, value-typed data shapes (Project, Repo, Cluster,
//!   Stack, Module, ...). Relationships between entities are name keys,
//!   resolved through context by higher crates, never back-pointers.
//! - **resolve**: turns `scheme:path[#fragment]` references into absolute
//!   filesystem paths rooted at a repo checkout.
//! - **repo**: clones/fetches content repos and installs their files.
//! - **binary**: downloads pinned external tool binaries (terraform,
//!   terragrunt).
//! - **merge**: deep-merges `serde_yaml::Value` documents (maps recurse,
//!   sequences concatenate, scalars take the right-hand side).
//! - **counters**: per-build entity tallies and timing.

pub mod binary;
pub mod counters;
pub mod error;
pub mod merge;
pub mod model;
pub mod repo;
pub mod resolve;

pub use binary::BinaryFetcher;
pub use counters::Counters;
pub use error::{CoreError, CoreResult};
pub use merge::{merge, merge_all, merge_mappings};
pub use model::{
    initial_config, Backend, Binaries, Binary, Cluster, ClusterStack, CommandSpec, Config,
    Configuration, HasSpec, Module, ModuleDependency, ModuleSecret, ModuleSecretStatus, Operation,
    PipelineStep, Project, Provider, Repo, SpecHandle, Stack, Variable, Vars,
};
pub use repo::{InstallItem, RepoManager, RepoManifest};
pub use resolve::{parse_ref, ParsedRef, Resolver};
