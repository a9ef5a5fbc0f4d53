//! `op`: run a named operation pipeline against a cluster/stack.

use std::path::PathBuf;

use clap::Args;

use stackctl_orchestrator::{OperationTarget, Orchestrator};

#[derive(Args)]
pub struct OpArgs {
    /// Target operation as `CLUSTER/STACK/OPERATION`
    pub target: String,

    /// Project root; defaults to `$STACKD_ROOT` or `.`
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,
}

pub async fn execute(args: OpArgs) -> anyhow::Result<()> {
    let target = OperationTarget::parse(&args.target)?;

    let root = args.path.unwrap_or_else(Orchestrator::root_from_env);
    let mut orchestrator = Orchestrator::configure(root)?;

    let runner = orchestrator.external_runner();
    orchestrator.run_operation(&target, &runner).await?;

    Ok(())
}
