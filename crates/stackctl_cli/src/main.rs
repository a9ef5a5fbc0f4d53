//! stackctl CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Config error
//! - 4: Resolve/template error
//! - 5: IaC/secrets error
//! - 6: External runner (terragrunt/terraform) process error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const RESOLVE_ERROR: u8 = 4;
    pub const IAC_ERROR: u8 = 5;
    pub const PROCESS_ERROR: u8 = 6;
}

#[tokio::main]
async fn main() -> ExitCode {
    let default_directive = if std::env::var("DEBUG").as_deref() == Ok("1") {
        "stackctl=debug"
    } else {
        "stackctl=info"
    };

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(args).await,
        Commands::Update(args) => commands::update::execute(args).await,
        Commands::Build(args) => commands::build::execute(args).await,
        Commands::Tg(args) => commands::tg::execute(args).await,
        Commands::Op(args) => commands::op::execute(args).await,
        Commands::Ui(args) => commands::ui::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            tracing::error!("{e:#}");
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = e.to_string().to_lowercase();

    if msg.contains("process exception") || msg.contains("exit code") {
        ExitCodes::PROCESS_ERROR
    } else if msg.contains("secret") || msg.contains("iac error") || msg.contains("vault") {
        ExitCodes::IAC_ERROR
    } else if msg.contains("resolve") || msg.contains("unknown scheme") || msg.contains("include") || msg.contains("template") {
        ExitCodes::RESOLVE_ERROR
    } else if msg.contains("config") || msg.contains("stackd.yaml") {
        ExitCodes::CONFIG_ERROR
    } else if msg.contains("argument") || msg.contains("invalid target") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
