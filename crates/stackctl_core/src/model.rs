//! Declarative data model: projects, repos, binaries, clusters, stacks, modules.
//!
//! These are plain data shapes. Behavior that composes them (loading,
//! merging, rendering) lives in the crates that consume them
//! (`stackctl_spec`, `stackctl_templates`, `stackctl_iac`,
//! `stackctl_orchestrator`) so that cross-references stay name-keyed
//! instead of back-pointers, per the "cyclic model references" design note.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// A free-form variable map. Backed by `serde_yaml::Mapping` so the merge
/// engine (`crate::merge`) can operate on it without a round-trip through
/// a typed representation.
pub type Vars = Mapping;

/// A record of the spec document a value was parsed from: its source path
/// and, when Jinja rendering was involved, the rendered text. Assigned by
/// `stackctl_spec::Spec::parse_obj_as` so a loaded `Config`/`Cluster`/
/// `Stack` can answer "what file, and what did it render to" without
/// re-reading the source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecHandle {
    pub path: PathBuf,
    pub rendered: Option<String>,
}

/// Implemented by model types that carry a `spec` field for introspection.
pub trait HasSpec {
    fn set_spec(&mut self, spec: SpecHandle);
}

/// Top-level project identity. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub domain: String,
    #[serde(default)]
    pub vault_address: Option<String>,
}

/// A named content repository: either a local checkout or a pinned Git clone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub local: bool,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_tag() -> String {
    "latest".to_string()
}

/// A pinned external tool binary (terraform, terragrunt).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub binary: String,
    pub url: String,
    #[serde(default)]
    pub extract: Option<String>,
    pub version: String,
}

/// The two external tool binaries stackctl drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binaries {
    pub terraform: Binary,
    pub terragrunt: Binary,
}

impl Binaries {
    pub fn iter(&self) -> impl Iterator<Item = &Binary> {
        [&self.terraform, &self.terragrunt].into_iter()
    }
}

impl Default for Binaries {
    fn default() -> Self {
        Self {
            terraform: Binary {
                binary: "terraform".to_string(),
                url: "https://releases.hashicorp.com/terraform/{version}/terraform_{version}_linux_amd64.zip"
                    .to_string(),
                extract: Some("terraform".to_string()),
                version: "1.4.4".to_string(),
            },
            terragrunt: Binary {
                binary: "terragrunt".to_string(),
                url: "https://github.com/gruntwork-io/terragrunt/releases/download/v{version}/terragrunt_linux_amd64"
                    .to_string(),
                extract: None,
                version: "0.45.2".to_string(),
            },
        }
    }
}

/// A single rendered Terraform variable declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: serde_yaml::Value,
    #[serde(rename = "type")]
    pub var_type: String,
}

/// A Terraform provider requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub source: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Remote state backend configuration, composed across five scopes by the
/// Backend Composer (`stackctl_iac::backend`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Mapping,
}

impl Backend {
    /// Serialize form used in rendered templates: `config` is cleared when
    /// the backend name is `"local"`.
    pub fn emitted_config(&self) -> Mapping {
        if self.name.as_deref() == Some("local") {
            Mapping::new()
        } else {
            self.config.clone()
        }
    }
}

/// A single step of an operation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub module: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_apply_command")]
    pub command: CommandSpec,
}

fn default_apply_command() -> CommandSpec {
    CommandSpec::Words(vec!["apply".to_string()])
}

/// A command, specified either as a single string (split on whitespace) or
/// as an explicit argument vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Words(Vec<String>),
}

impl CommandSpec {
    /// Normalize into an argument vector.
    pub fn into_args(self) -> Vec<String> {
        match self {
            CommandSpec::Line(s) => s.split_whitespace().map(str::to_string).collect(),
            CommandSpec::Words(words) => words,
        }
    }
}

/// Legacy run-all configuration: a named set of modules plus a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub modules: Vec<String>,
    #[serde(default = "default_plan_command")]
    pub command: CommandSpec,
}

fn default_plan_command() -> CommandSpec {
    CommandSpec::Words(vec!["plan".to_string()])
}

/// Named operation: a pipeline (preferred) or legacy configurations fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub configurations: HashMap<String, Configuration>,
    #[serde(default = "default_configuration_name")]
    pub configuration: String,
    #[serde(default)]
    pub pipeline: Vec<PipelineStep>,
}

fn default_configuration_name() -> String {
    "default".to_string()
}

/// Status of a module's backing secret, as observed against the secret store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSecretStatus {
    Unknown,
    NotExists,
    Exists,
    Valid,
}

impl Default for ModuleSecretStatus {
    fn default() -> Self {
        ModuleSecretStatus::Unknown
    }
}

/// A secret a module declares it needs, typed via the owning stack's schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSecret {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub secret_type: Option<String>,
    #[serde(default)]
    pub secret_schema: Option<serde_json::Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub status: ModuleSecretStatus,
}

/// A resolved reference from one module to another, either within the same
/// stack (`"module"`) or a different one (`"stack/module"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDependency {
    pub name: String,
    pub path: String,
    pub abspath: String,
    pub module_name: String,
    pub stack_name: String,
}

impl ModuleDependency {
    /// Terraform-safe variable name projection: `-` becomes `_`.
    pub fn varname(&self) -> String {
        format!("{}_{}", self.stack_name, self.module_name).replace('-', "_")
    }
}

/// The smallest deployable unit: compiled to a build directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub name: Option<String>,
    pub src: String,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub module_vars: Vars,
    /// Reserved: recomputed on every build, never read from user input.
    #[serde(default, skip_deserializing)]
    pub built_vars: Vars,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub provider_overrides: Mapping,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub secrets: HashMap<String, ModuleSecret>,
    #[serde(default)]
    pub schemas: Option<serde_json::Value>,
}

/// A stack's typed decomposition: the modules and operations it bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    pub modules: HashMap<String, Module>,
    #[serde(default)]
    pub operations: HashMap<String, Operation>,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub backend: Option<Backend>,
    /// Arbitrary JSON-Schema-shaped document with `components.schemas.*`.
    #[serde(default, rename = "schema")]
    pub stack_schema: serde_json::Value,
    #[serde(skip)]
    pub spec: Option<SpecHandle>,
}

/// The per-cluster binding to a stack source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub module_vars: HashMap<String, Vars>,
    #[serde(default)]
    pub r#override: Mapping,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub operations: Mapping,
}

/// A logical deployment target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub stacks: HashMap<String, ClusterStack>,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(skip)]
    pub spec: Option<SpecHandle>,
}

/// The top-level configuration bundle loaded from `stackd.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_kind")]
    pub kind: String,
    pub project: Project,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default = "default_clusters_dir")]
    pub clusters_dir: String,
    #[serde(default)]
    pub repos: HashMap<String, Repo>,
    #[serde(default)]
    pub binaries: Binaries,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub providers: HashMap<String, Provider>,
    #[serde(skip)]
    pub spec: Option<SpecHandle>,
}

fn default_kind() -> String {
    "stackd".to_string()
}

fn default_clusters_dir() -> String {
    "cluster".to_string()
}

/// The default configuration a fresh project is seeded with, and the
/// override base every loaded `stackd.yaml` merges on top of.
pub fn initial_config(name: &str, domain: &str, vault_address: Option<String>, title: Option<String>) -> Config {
    let mut vars = Mapping::new();
    vars.insert("dns_zone".into(), domain.into());
    vars.insert("project".into(), name.into());
    if let Some(va) = &vault_address {
        vars.insert("vault_address".into(), va.as_str().into());
    }

    let mut repos = HashMap::new();
    repos.insert(
        "root".to_string(),
        Repo {
            name: "root".to_string(),
            url: "./".to_string(),
            branch: default_branch(),
            tag: default_tag(),
            local: true,
        },
    );
    repos.insert(
        "core".to_string(),
        Repo {
            name: "core".to_string(),
            url: "https://github.com/stackctl/core.git".to_string(),
            branch: "dev".to_string(),
            tag: "0.0.1-dev9".to_string(),
            local: false,
        },
    );

    Config {
        kind: default_kind(),
        project: Project {
            name: name.to_string(),
            title,
            domain: domain.to_string(),
            vault_address,
        },
        vars,
        clusters_dir: default_clusters_dir(),
        repos,
        binaries: Binaries::default(),
        backend: Some(Backend::default()),
        providers: HashMap::new(),
        spec: None,
    }
}

impl HasSpec for Config {
    fn set_spec(&mut self, spec: SpecHandle) {
        self.spec = Some(spec);
    }
}

impl HasSpec for Cluster {
    fn set_spec(&mut self, spec: SpecHandle) {
        self.spec = Some(spec);
    }
}

impl HasSpec for Stack {
    fn set_spec(&mut self, spec: SpecHandle) {
        self.spec = Some(spec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_clears_config_when_local() {
        let mut config = Mapping::new();
        config.insert("key".into(), "x".into());
        let backend = Backend {
            name: Some("local".to_string()),
            config,
        };
        assert!(backend.emitted_config().is_empty());
    }

    #[test]
    fn dependency_varname_replaces_dashes() {
        let dep = ModuleDependency {
            name: "dns-zone".to_string(),
            path: "dns-zone".to_string(),
            abspath: "/build/dev/foo/dns-zone".to_string(),
            module_name: "dns-zone".to_string(),
            stack_name: "foo-stack".to_string(),
        };
        assert_eq!(dep.varname(), "foo_stack_dns_zone");
    }

    #[test]
    fn command_spec_splits_on_whitespace() {
        let cmd = CommandSpec::Line("apply -auto-approve".to_string());
        assert_eq!(cmd.into_args(), vec!["apply", "-auto-approve"]);
    }
}
