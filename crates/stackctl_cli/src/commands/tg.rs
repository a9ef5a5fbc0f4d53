//! `tg`: ensure a module is built, then pass arguments through to the
//! external runner (terragrunt) inside its build directory.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use stackctl_orchestrator::{BuildTarget, Orchestrator};

#[derive(Args)]
pub struct TgArgs {
    /// Target module as `CLUSTER/STACK/MODULE`
    pub target: String,

    /// Arguments passed through to terragrunt (e.g. `plan`, `apply -auto-approve`)
    pub args: Vec<String>,

    /// Project root; defaults to `$STACKD_ROOT` or `.`
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,
}

pub async fn execute(args: TgArgs) -> anyhow::Result<()> {
    let mut parts = args.target.splitn(3, '/');
    let (cluster, stack, module) = match (parts.next(), parts.next(), parts.next()) {
        (Some(c), Some(s), Some(m)) => (c, s, m),
        _ => bail!("invalid target '{}': expected CLUSTER/STACK/MODULE", args.target),
    };

    let root = args.path.unwrap_or_else(Orchestrator::root_from_env);
    let mut orchestrator = Orchestrator::configure(root)?;

    let build_target = BuildTarget {
        cluster: cluster.to_string(),
        stack: Some(stack.to_string()),
    };
    orchestrator.build(Some(&build_target)).await.context("ensuring module is built")?;

    let module_dir = orchestrator.build_root().join(cluster).join(stack).join(module);
    let runner = orchestrator.external_runner();
    runner.run(&module_dir, &args.args)?;

    Ok(())
}
