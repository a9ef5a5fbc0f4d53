//! `update`: checkout all configured repos, then download tool binaries
//! unless `-B` skips it.

use std::path::PathBuf;

use clap::Args;

use stackctl_orchestrator::Orchestrator;

#[derive(Args)]
pub struct UpdateArgs {
    /// Project root; defaults to `$STACKD_ROOT` or `.`
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,

    /// Skip downloading terraform/terragrunt binaries
    #[arg(short = 'B', long = "no-binaries")]
    pub no_binaries: bool,
}

pub async fn execute(args: UpdateArgs) -> anyhow::Result<()> {
    let root = args.path.unwrap_or_else(Orchestrator::root_from_env);
    let orchestrator = Orchestrator::configure(root)?;

    orchestrator.checkout_repos()?;
    if !args.no_binaries {
        orchestrator.download_binaries().await?;
    }

    tracing::info!("update complete");
    Ok(())
}
