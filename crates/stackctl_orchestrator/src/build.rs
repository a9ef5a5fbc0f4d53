//! `build()`: walks clusters → cluster-stacks → modules depth-first,
//! writing each module's rendered Terragrunt directory.

use serde_yaml::Mapping;

use stackctl_core::{merge_mappings, Cluster, ClusterStack, Resolver, Stack};
use stackctl_iac::{build_module, write_module, ModuleBuildInput};
use stackctl_spec::Spec;

use crate::context::Orchestrator;
use crate::error::{OrchestratorError, OrchestratorResult};

/// Restricts a build to one cluster, and optionally one cluster-stack
/// within it. `None` builds every cluster.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    pub cluster: String,
    pub stack: Option<String>,
}

impl BuildTarget {
    /// Parse a CLI `-t CLUSTER[:STACK]` argument.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((cluster, stack)) => Self {
                cluster: cluster.to_string(),
                stack: Some(stack.to_string()),
            },
            None => Self {
                cluster: spec.to_string(),
                stack: None,
            },
        }
    }
}

impl Orchestrator {
    /// Materialize build artifacts for every cluster (or just `target`).
    pub async fn build(&mut self, target: Option<&BuildTarget>) -> OrchestratorResult<()> {
        self.counters.reset();

        let cluster_names: Vec<String> = match target {
            Some(t) => vec![t.cluster.clone()],
            None => self.clusters.keys().cloned().collect(),
        };

        for cluster_name in cluster_names {
            if !self.clusters.contains_key(&cluster_name) {
                return Err(OrchestratorError::ClusterNotFound(cluster_name));
            }
            let stack_filter = target.and_then(|t| t.stack.clone());
            self.build_cluster(&cluster_name, stack_filter.as_deref()).await?;
        }

        self.counters.stop();
        tracing::info!("{}", self.counters.stats_message());
        Ok(())
    }

    async fn build_cluster(&mut self, cluster_name: &str, stack_filter: Option<&str>) -> OrchestratorResult<()> {
        self.counters.clusters += 1;

        let stack_names: Vec<String> = {
            let cluster = &self.clusters[cluster_name];
            match stack_filter {
                Some(name) => {
                    if !cluster.stacks.contains_key(name) {
                        return Err(OrchestratorError::StackNotFound(name.to_string(), cluster_name.to_string()));
                    }
                    vec![name.to_string()]
                }
                None => cluster.stacks.keys().cloned().collect(),
            }
        };

        for stack_name in stack_names {
            self.build_cluster_stack(cluster_name, &stack_name).await?;
        }
        Ok(())
    }

    async fn build_cluster_stack(&mut self, cluster_name: &str, cluster_stack_name: &str) -> OrchestratorResult<()> {
        self.counters.stacks += 1;

        let dns_zone = self.dns_zone().to_string();
        let project_vars = self.config.vars.clone();
        let project_backend = self.config.backend.clone();
        let providers = self.providers.clone();
        let build_root = self.build_root();
        let project_root = self.root.clone();
        let secret_store = self.secret_store.clone();
        let jinja_env = self.jinja_env();

        let repos = self.config.repos.clone();
        let resolver = Resolver::new(&project_root, &repos);
        let (cluster, cluster_stack, mut stack) = self.load_stack(cluster_name, cluster_stack_name, &jinja_env)?;

        let module_names: Vec<String> = stack.modules.keys().cloned().collect();
        for module_name in module_names {
            let module = stack.modules[&module_name].clone();
            let built = {
                let input = ModuleBuildInput {
                    cluster: &cluster,
                    cluster_stack_name,
                    cluster_stack: &cluster_stack,
                    stack_name: cluster_stack_name,
                    stack: &stack,
                    module_name: &module_name,
                    module: &module,
                    project_vars: &project_vars,
                    project_root: &project_root,
                    build_root: &build_root,
                    dns_zone: &dns_zone,
                    providers: &providers,
                    resolver: &resolver,
                    project_backend: project_backend.as_ref(),
                };

                build_module(&input, &jinja_env, secret_store.as_ref()).await?
            };
            write_module(&built)?;
            if let Some(built_module) = stack.modules.get_mut(&module_name) {
                built_module.secrets = built.secrets.clone();
            }
            self.counters.modules += 1;
        }

        Ok(())
    }

    /// Resolve and parse a cluster-stack's `stack.yaml`, with the
    /// cluster-stack's `override` and `operations` layered over the
    /// implied `name` before rendering.
    pub fn load_stack(
        &self,
        cluster_name: &str,
        cluster_stack_name: &str,
        jinja_env: &minijinja::Environment<'static>,
    ) -> OrchestratorResult<(Cluster, ClusterStack, Stack)> {
        let cluster = self.clusters[cluster_name].clone();
        let cluster_stack = cluster.stacks[cluster_stack_name].clone();

        let src = cluster_stack.src.clone().unwrap_or_else(|| cluster_stack_name.to_string());
        let resolver = self.resolver();
        let stack_path = resolver.resolve_stack_path(&src)?;

        let mut merge_from = Mapping::new();
        merge_from.insert("name".into(), cluster_stack_name.into());
        merge_from.insert(
            "operations".into(),
            serde_yaml::Value::Mapping(cluster_stack.operations.clone()),
        );
        let merge_from = merge_mappings(&merge_from, &cluster_stack.r#override);

        let render_ctx = serde_json::json!({"cluster": cluster_name, "cluster_stack": cluster_stack_name});
        let resolver = self.resolver();
        let spec = Spec::load(&stack_path, Some(jinja_env), Some(&merge_from), &render_ctx, Some(&resolver))?;
        let stack: Stack = spec.parse_obj_as()?;

        Ok((cluster, cluster_stack, stack))
    }

    /// Like [`Orchestrator::load_stack`], building its own template
    /// environment. Convenient for callers (the API facade) that don't
    /// already hold one.
    pub fn resolve_stack(&self, cluster_name: &str, cluster_stack_name: &str) -> OrchestratorResult<(Cluster, ClusterStack, Stack)> {
        let jinja_env = self.jinja_env();
        self.load_stack(cluster_name, cluster_stack_name, &jinja_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_cluster_and_stack() {
        let target = BuildTarget::parse("prod:webapp");
        assert_eq!(target.cluster, "prod");
        assert_eq!(target.stack.as_deref(), Some("webapp"));
    }

    #[test]
    fn parse_defaults_to_whole_cluster() {
        let target = BuildTarget::parse("prod");
        assert_eq!(target.cluster, "prod");
        assert_eq!(target.stack, None);
    }
}
