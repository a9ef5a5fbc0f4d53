//! The `Orchestrator`: an explicit, per-invocation value owning a loaded
//! workspace. No process-wide singleton — callers construct one, call
//! `configure()`, then `build()`/`update()`/`run_operation()` against it.
//! The External API Facade constructs a fresh instance per request for
//! exactly this reason.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::Environment;
use serde_yaml::Value;

use stackctl_core::{initial_config, merge, Cluster, Config, Counters, HasSpec, Provider, Resolver, SpecHandle};
use stackctl_secrets::{MockSecretStore, SecretStore, VaultSecretStore};
use stackctl_spec::Spec;

use crate::error::{OrchestratorError, OrchestratorResult, STACKCTL_VAULT_TOKEN_VAR};

/// The root of environment variable names this orchestrator reads.
pub const STACKD_ROOT_VAR: &str = "STACKD_ROOT";

/// An explicit, constructed-per-use workspace handle.
pub struct Orchestrator {
    pub root: PathBuf,
    pub config: Config,
    pub clusters: HashMap<String, Cluster>,
    pub providers: HashMap<String, Provider>,
    pub counters: Counters,
    pub secret_store: Arc<dyn SecretStore>,
}

impl Orchestrator {
    /// Resolve the workspace root from `$STACKD_ROOT`, defaulting to `.`.
    pub fn root_from_env() -> PathBuf {
        std::env::var(STACKD_ROOT_VAR).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Load `stackd.yaml`, merge it over the project's implied defaults,
    /// connect the secret store, load provider versions, and enumerate
    /// every cluster under `{clusters_dir}/*.yaml`.
    pub fn configure(root: impl Into<PathBuf>) -> OrchestratorResult<Self> {
        let root = root.into();
        let config_path = root.join("stackd.yaml");
        if !config_path.exists() {
            return Err(OrchestratorError::ConfigNotFound(config_path.display().to_string()));
        }

        let text = std::fs::read_to_string(&config_path)?;
        let parsed: Value = serde_yaml::from_str(&text)?;

        let project = parsed
            .get("project")
            .ok_or_else(|| OrchestratorError::ConfigNotFound("project".to_string()))?;
        let name = project.get("name").and_then(|v| v.as_str()).unwrap_or("stackctl").to_string();
        let domain = project.get("domain").and_then(|v| v.as_str()).unwrap_or("local").to_string();
        let title = project.get("title").and_then(|v| v.as_str()).map(str::to_string);
        let vault_address = project.get("vault_address").and_then(|v| v.as_str()).map(str::to_string);

        let baseline = initial_config(&name, &domain, vault_address, title);
        let baseline_value = serde_yaml::to_value(&baseline)?;
        let merged = merge(&baseline_value, &parsed);
        let mut config: Config = serde_yaml::from_value(merged)?;
        config.set_spec(SpecHandle {
            path: config_path.clone(),
            rendered: None,
        });

        let token = std::env::var(STACKCTL_VAULT_TOKEN_VAR).map_err(|_| OrchestratorError::VaultTokenMissing)?;
        let secret_store: Arc<dyn SecretStore> = match &config.project.vault_address {
            Some(address) => Arc::new(VaultSecretStore::new(address, token, "kv")),
            None => Arc::new(MockSecretStore::new()),
        };

        let mut providers = config.providers.clone();
        if let Ok(resolved) = Resolver::new(&root, &config.repos).resolve_path("core:versions.yaml") {
            if let Ok(text) = std::fs::read_to_string(&resolved) {
                if let Ok(extra) = serde_yaml::from_str::<HashMap<String, Provider>>(&text) {
                    for (name, provider) in extra {
                        providers.entry(name).or_insert(provider);
                    }
                }
            }
        }

        let mut clusters = HashMap::new();
        let clusters_dir = root.join(&config.clusters_dir);
        if clusters_dir.is_dir() {
            for entry in std::fs::read_dir(&clusters_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                    continue;
                }
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                if stem.starts_with('_') {
                    continue;
                }

                let resolver = Resolver::new(&root, &config.repos);
                let spec = Spec::load(&path, None, None, &serde_json::json!({}), Some(&resolver))?;
                let mut cluster: Cluster = spec.parse_obj_as()?;
                cluster.name = stem.to_string();
                clusters.insert(stem.to_string(), cluster);
            }
        }

        let mut counters = Counters::new();
        counters.reset();
        counters.stop();

        Ok(Self {
            root,
            config,
            clusters,
            providers,
            counters,
            secret_store,
        })
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.root, &self.config.repos)
    }

    pub fn build_root(&self) -> PathBuf {
        self.root.join("build")
    }

    /// A minijinja environment rooted at the `core` repo's `templates/`
    /// directory, if it has one (it usually does after `update()`).
    pub fn jinja_env(&self) -> Environment<'static> {
        let templates_root = self
            .config
            .repos
            .get("core")
            .map(|repo| {
                stackctl_core::RepoManager::new(repo, &self.root)
                    .templates_dir()
                    .unwrap_or_else(|| self.root.clone())
            })
            .unwrap_or_else(|| self.root.clone());
        stackctl_templates::build_environment(templates_root)
    }

    pub fn dns_zone(&self) -> &str {
        &self.config.project.domain
    }

    /// Build an [`ExternalRunner`] wired to this workspace's `bin/` tools
    /// and `.stackd/cache/` caches.
    pub fn external_runner(&self) -> stackctl_ops::ExternalRunner {
        stackctl_ops::ExternalRunner::new(
            self.root.join("bin").join(&self.config.binaries.terraform.binary),
            self.root.join("bin").join(&self.config.binaries.terragrunt.binary),
            self.root.join(".stackd").join("cache"),
        )
    }
}
