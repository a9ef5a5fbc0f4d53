//! Repo Manager: checks out content repositories and installs their files
//! into the local workspace.
//!
//! Repos are either `local` (a relative directory already present on disk,
//! typically the project root itself) or remote Git checkouts pinned to a
//! tag. Remote repos are shallow-cloned, then fetched and checked out to
//! the pinned tag on every `update`.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::model::Repo;

/// A single file copy instruction from a repo's `stackd.yaml` manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallItem {
    pub src: String,
    pub dest: String,
}

impl InstallItem {
    pub fn srcdst(&self, repo_dir: &Path, root: &Path) -> (PathBuf, PathBuf) {
        (repo_dir.join(&self.src), root.join(&self.dest))
    }
}

/// A repo's own `stackd.yaml`: the list of files it wants copied into the
/// consuming project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoManifest {
    #[serde(default)]
    pub install: Vec<InstallItem>,
}

/// Drives checkout and installation of a single [`Repo`] against a workspace
/// root.
pub struct RepoManager<'a> {
    repo: &'a Repo,
    root: PathBuf,
}

impl<'a> RepoManager<'a> {
    pub fn new(repo: &'a Repo, root: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            root: root.into(),
        }
    }

    /// Absolute path to this repo's checkout (or local directory).
    pub fn repo_dir(&self) -> PathBuf {
        if self.repo.local {
            self.root.join(&self.repo.url)
        } else {
            self.root.join("repo").join(&self.repo.name)
        }
    }

    /// Absolute path to the repo's `templates/` directory, if it has one.
    pub fn templates_dir(&self) -> Option<PathBuf> {
        let dir = self.repo_dir().join("templates");
        dir.is_dir().then_some(dir)
    }

    /// Clone (if absent) or fetch (if present) and check out the pinned tag.
    /// No-op for local repos.
    pub fn checkout(&self) -> CoreResult<()> {
        if self.repo.local {
            return Ok(());
        }

        let dir = self.repo_dir();
        std::fs::create_dir_all(&dir)?;

        if dir.join(".git").exists() {
            debug!(repo = %self.repo.name, "fetching existing checkout");
            self.run_git(&dir, &["fetch", "origin", "--tags", "--depth", "1"])?;
        } else {
            info!(repo = %self.repo.name, url = %self.repo.url, "cloning repo");
            self.clone(&dir)?;
        }

        self.checkout_tag(&dir)?;
        Ok(())
    }

    fn clone(&self, dir: &Path) -> CoreResult<()> {
        let output = Command::new("git")
            .args([
                "clone",
                "--depth",
                "1",
                "--branch",
                &self.repo.branch,
                &self.repo.url,
                ".",
            ])
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_ASKPASS", "/usr/bin/true")
            .output()
            .map_err(|e| CoreError::GitFailed {
                name: self.repo.name.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CoreError::GitFailed {
                name: self.repo.name.clone(),
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }

    fn checkout_tag(&self, dir: &Path) -> CoreResult<()> {
        if self.repo.tag == "latest" {
            return Ok(());
        }

        let tags = self.run_git(dir, &["tag", "--list"])?;
        if !tags.lines().any(|t| t == self.repo.tag) {
            self.run_git(dir, &["fetch", "origin", "tag", &self.repo.tag, "--depth", "1"])
                .map_err(|_| CoreError::RepoTagMissing {
                    name: self.repo.name.clone(),
                    tag: self.repo.tag.clone(),
                })?;
        }

        self.run_git(dir, &["checkout", &self.repo.tag])?;
        Ok(())
    }

    fn run_git(&self, dir: &Path, args: &[&str]) -> CoreResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| CoreError::GitFailed {
                name: self.repo.name.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CoreError::GitFailed {
                name: self.repo.name.clone(),
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Read the repo's `stackd.yaml` manifest and copy every listed file
    /// into `root`, skipping files whose contents already match.
    pub fn install(&self) -> CoreResult<()> {
        let manifest_path = self.repo_dir().join("stackd.yaml");
        if !manifest_path.exists() {
            return Ok(());
        }

        let text = std::fs::read_to_string(&manifest_path)?;
        let manifest: RepoManifest = serde_yaml::from_str(&text)?;

        for item in &manifest.install {
            let (src, dest) = item.srcdst(&self.repo_dir(), &self.root);
            copy_tree(&src, &dest)?;
        }
        Ok(())
    }
}

/// Recursively copy `src` into `dest`, writing a file only when its
/// contents differ from what's already there.
fn copy_tree(src: &Path, dest: &Path) -> CoreResult<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dest)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
        }
        return Ok(());
    }

    let needs_copy = match std::fs::read(dest) {
        Ok(existing) => existing != std::fs::read(src)?,
        Err(_) => true,
    };

    if needs_copy {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dest)?;
        let src_meta = std::fs::metadata(src)?;
        filetime::set_file_mtime(dest, filetime::FileTime::from_last_modification_time(&src_meta))?;
    }
    Ok(())
}
