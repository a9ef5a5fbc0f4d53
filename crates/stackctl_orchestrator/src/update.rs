//! `update()`: checks out every configured repo, installs its template and
//! manifest files into the workspace, and downloads the pinned
//! terraform/terragrunt binaries.

use stackctl_core::{BinaryFetcher, RepoManager};

use crate::context::Orchestrator;
use crate::error::OrchestratorResult;

impl Orchestrator {
    /// Checkout and install all configured repos, then fetch binaries.
    pub async fn update(&self) -> OrchestratorResult<()> {
        self.checkout_repos()?;
        self.download_binaries().await?;
        Ok(())
    }

    /// Clone or fetch every configured repo and install its manifest
    /// files into the workspace root.
    pub fn checkout_repos(&self) -> OrchestratorResult<()> {
        for repo in self.config.repos.values() {
            let manager = RepoManager::new(repo, &self.root);
            manager.checkout()?;
            manager.install()?;
        }
        Ok(())
    }

    /// Download the pinned terraform and terragrunt binaries into `bin/`.
    pub async fn download_binaries(&self) -> OrchestratorResult<()> {
        for binary in self.config.binaries.iter() {
            let fetcher = BinaryFetcher::new(binary, &self.root);
            fetcher.download().await?;
        }
        Ok(())
    }
}
