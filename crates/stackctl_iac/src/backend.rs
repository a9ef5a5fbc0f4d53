//! Backend Composer: builds a module's remote state backend by layering
//! five scopes, narrowest-wins: project, cluster, cluster-stack, stack,
//! module. Each scope may override the backend `name` and deep-merges its
//! `config` on top of what came before.

use serde_yaml::Value;

use stackctl_core::{merge_mappings, Backend};

/// The default `config` every module starts from: a state key namespaced
/// by cluster and module path, before any scope override is applied.
pub fn default_backend_config(cluster_name: &str, module_namespace: &str) -> serde_yaml::Mapping {
    let mut config = serde_yaml::Mapping::new();
    config.insert(
        Value::from("key"),
        Value::from(format!("{cluster_name}/{module_namespace}")),
    );
    config
}

/// Compose a backend by folding `scopes` (outermost first: project,
/// cluster, cluster_stack, stack, module) onto a default key-only config.
pub fn compose_backend(
    cluster_name: &str,
    module_namespace: &str,
    scopes: &[Option<&Backend>],
) -> Backend {
    let mut name = None;
    let mut config = default_backend_config(cluster_name, module_namespace);

    for scope in scopes.iter().flatten() {
        if scope.name.is_some() {
            name = scope.name.clone();
        }
        config = merge_mappings(&config, &scope.config);
    }

    Backend { name, config }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_carries_namespaced_key() {
        let config = default_backend_config("dev", "webapp-database");
        assert_eq!(config.get("key"), Some(&Value::from("dev/webapp-database")));
    }

    #[test]
    fn later_scope_overrides_name_and_merges_config() {
        let mut cluster_config = serde_yaml::Mapping::new();
        cluster_config.insert(Value::from("region"), Value::from("us-east-1"));
        let cluster_backend = Backend {
            name: Some("s3".to_string()),
            config: cluster_config,
        };

        let mut module_config = serde_yaml::Mapping::new();
        module_config.insert(Value::from("region"), Value::from("eu-west-1"));
        let module_backend = Backend {
            name: None,
            config: module_config,
        };

        let composed = compose_backend(
            "dev",
            "webapp-database",
            &[None, Some(&cluster_backend), None, None, Some(&module_backend)],
        );

        assert_eq!(composed.name.as_deref(), Some("s3"));
        assert_eq!(composed.config.get("region"), Some(&Value::from("eu-west-1")));
        assert_eq!(composed.config.get("key"), Some(&Value::from("dev/webapp-database")));
    }

    #[test]
    fn local_backend_emits_empty_config() {
        let backend = compose_backend("dev", "webapp-database", &[]);
        let local = Backend {
            name: Some("local".to_string()),
            config: backend.config,
        };
        assert!(local.emitted_config().is_empty());
    }
}
