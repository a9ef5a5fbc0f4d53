//! `ui`: serve the HTTP facade.

use clap::Args;

#[derive(Args)]
pub struct UiArgs {
    /// Address to bind
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short = 'P', long, default_value_t = 8080)]
    pub port: u16,
}

pub async fn execute(args: UiArgs) -> anyhow::Result<()> {
    stackctl_api::serve(&args.host, args.port).await
}
