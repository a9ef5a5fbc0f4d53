//! `run_operation()`: the Operation Runner's entry point. Ensures the
//! workspace is fully built, rebuilds the target cluster-stack for
//! freshness, then drives the operation's pipeline (or legacy
//! `configurations` fallback) against the external runner.

use stackctl_ops::ExternalRunner;

use crate::build::BuildTarget;
use crate::context::Orchestrator;
use crate::error::{OrchestratorError, OrchestratorResult};

/// A parsed `cluster/stack/operation` target.
#[derive(Debug, Clone)]
pub struct OperationTarget {
    pub cluster: String,
    pub stack: String,
    pub operation: String,
}

impl OperationTarget {
    pub fn parse(target: &str) -> OrchestratorResult<Self> {
        let parts: Vec<&str> = target.split('/').collect();
        match parts.as_slice() {
            [cluster, stack, operation] => Ok(Self {
                cluster: cluster.to_string(),
                stack: stack.to_string(),
                operation: operation.to_string(),
            }),
            _ => Err(OrchestratorError::InvalidTarget(target.to_string())),
        }
    }
}

impl Orchestrator {
    /// Run a named operation against `target`.
    pub async fn run_operation(&mut self, target: &OperationTarget, runner: &ExternalRunner) -> OrchestratorResult<()> {
        self.build(None).await?;
        let build_target = BuildTarget {
            cluster: target.cluster.clone(),
            stack: Some(target.stack.clone()),
        };
        self.build(Some(&build_target)).await?;

        let jinja_env = self.jinja_env();
        let (_cluster, _cluster_stack, stack) = self.load_stack(&target.cluster, &target.stack, &jinja_env)?;

        let operation = stack
            .operations
            .get(&target.operation)
            .cloned()
            .ok_or_else(|| OrchestratorError::OperationNotFound(target.operation.clone()))?;

        let build_root = self.build_root().join(&target.cluster).join(&target.stack);

        if !operation.pipeline.is_empty() {
            for step in &operation.pipeline {
                let module_dir = build_root.join(&step.module);
                let args = step.command.clone().into_args();
                runner.run(&module_dir, &args)?;
            }
        } else {
            let config = operation
                .configurations
                .get(operation.configuration.as_str())
                .ok_or_else(|| OrchestratorError::OperationNotFound(operation.configuration.clone()))?;
            let include_dirs: Vec<_> = config.modules.iter().map(|m| build_root.join(m)).collect();
            let args = config.command.clone().into_args();
            runner.run_all(&build_root, &include_dirs, &args)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_three_segments() {
        let target = OperationTarget::parse("prod/webapp/deploy").unwrap();
        assert_eq!(target.cluster, "prod");
        assert_eq!(target.stack, "webapp");
        assert_eq!(target.operation, "deploy");
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        assert!(OperationTarget::parse("prod/webapp").is_err());
        assert!(OperationTarget::parse("prod/webapp/deploy/extra").is_err());
    }
}
