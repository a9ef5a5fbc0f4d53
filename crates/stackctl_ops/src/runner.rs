//! External Runner: spawns the `terraform`/`terragrunt` binaries as child
//! processes with a fixed environment overlay, waits synchronously, and
//! raises on non-zero exit.
//!
//! Single-threaded by design: the parent waits for each child before
//! starting the next operation, and signals received by the parent are
//! not forwarded to the child.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{RunnerError, RunnerResult};

/// Result of one external command invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Drives the `terragrunt`/`terraform` binaries against a build directory.
pub struct ExternalRunner {
    terraform_bin: PathBuf,
    terragrunt_bin: PathBuf,
    cache_root: PathBuf,
}

impl ExternalRunner {
    pub fn new(terraform_bin: impl Into<PathBuf>, terragrunt_bin: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            terraform_bin: terraform_bin.into(),
            terragrunt_bin: terragrunt_bin.into(),
            cache_root: cache_root.into(),
        }
    }

    /// Fixed environment overlay applied to every invocation, on top of
    /// whatever the parent process already has set.
    fn env_overlay(&self, working_dir: &Path) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "TERRAGRUNT_WORKING_DIR".to_string(),
            working_dir.to_string_lossy().to_string(),
        );
        env.insert(
            "TERRAGRUNT_TFPATH".to_string(),
            self.terraform_bin.to_string_lossy().to_string(),
        );
        env.insert("TF_INPUT".to_string(), "false".to_string());
        env.insert(
            "TERRAGRUNT_DOWNLOAD".to_string(),
            self.cache_root.join("terragrunt-download").to_string_lossy().to_string(),
        );
        env.insert(
            "TERRAGRUNT_CACHE".to_string(),
            self.cache_root.join("terragrunt-cache").to_string_lossy().to_string(),
        );
        env.insert(
            "TF_PLUGIN_CACHE_DIR".to_string(),
            self.cache_root.join("tf-plugin-cache").to_string_lossy().to_string(),
        );
        env
    }

    /// Run `terragrunt <args>` against `build_path`, raising
    /// [`RunnerError::ProcessFailed`] on non-zero exit.
    pub fn run(&self, build_path: &Path, args: &[String]) -> RunnerResult<ExecutionResult> {
        if !self.terragrunt_bin.exists() {
            return Err(RunnerError::BinaryNotFound(
                self.terragrunt_bin.to_string_lossy().to_string(),
            ));
        }

        info!(path = %build_path.display(), args = ?args, "running terragrunt");

        let output = Command::new(&self.terragrunt_bin)
            .args(args)
            .current_dir(build_path)
            .envs(self.env_overlay(build_path))
            .output()?;

        let result = ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success() {
            return Err(RunnerError::ProcessFailed {
                command: format!("terragrunt {}", args.join(" ")),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }

    /// Run a `run-all` invocation across several module directories, the
    /// legacy `configurations` fallback form.
    pub fn run_all(&self, working_dir: &Path, include_dirs: &[PathBuf], command: &[String]) -> RunnerResult<ExecutionResult> {
        let mut args = vec!["run-all".to_string()];
        for dir in include_dirs {
            args.push("--terragrunt-include-dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }
        args.extend(command.iter().cloned());
        self.run(working_dir, &args)
    }
}
