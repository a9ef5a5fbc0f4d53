//! `build`: materialize Terragrunt/Terraform build directories.

use std::path::PathBuf;

use clap::Args;

use stackctl_orchestrator::{BuildTarget, Orchestrator};

#[derive(Args)]
pub struct BuildArgs {
    /// Restrict the build to `CLUSTER[:STACK]`; builds everything if absent
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Project root; defaults to `$STACKD_ROOT` or `.`
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,
}

pub async fn execute(args: BuildArgs) -> anyhow::Result<()> {
    let root = args.path.unwrap_or_else(Orchestrator::root_from_env);
    let mut orchestrator = Orchestrator::configure(root)?;

    let target = args.target.as_deref().map(BuildTarget::parse);
    orchestrator.build(target.as_ref()).await?;

    Ok(())
}
