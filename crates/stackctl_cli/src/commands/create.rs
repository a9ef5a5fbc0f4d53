//! `create`: write a new `stackd.yaml` for a project.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use stackctl_core::initial_config;

#[derive(Args)]
pub struct CreateArgs {
    /// Project name
    #[arg(short = 'n', long)]
    pub name: String,

    /// DNS domain, seeds the cluster DNS zone
    #[arg(short = 'd', long)]
    pub domain: String,

    /// Vault address for the secret store
    #[arg(long = "vault-address")]
    pub vault_address: Option<String>,

    /// Human-readable project title
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Project root; defaults to the current directory
    #[arg(short = 'p', long, default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing stackd.yaml
    #[arg(short = 'f', long)]
    pub force: bool,
}

pub async fn execute(args: CreateArgs) -> anyhow::Result<()> {
    let config_path = args.path.join("stackd.yaml");
    if config_path.exists() && !args.force {
        bail!("stackd.yaml already exists at {}; pass -f to overwrite", config_path.display());
    }

    std::fs::create_dir_all(&args.path).context("creating project directory")?;

    let config = initial_config(&args.name, &args.domain, args.vault_address, args.title);
    let yaml = serde_yaml::to_string(&config).context("serializing config")?;
    std::fs::write(&config_path, yaml).context("writing stackd.yaml")?;

    tracing::info!(path = %config_path.display(), "wrote stackd.yaml");
    Ok(())
}
