//! CLI command definitions.
//!
//! This module defines the command structure for the stackctl CLI. Each
//! subcommand maps directly to an `Orchestrator` verb.

use clap::{Parser, Subcommand};

pub mod build;
pub mod create;
pub mod op;
pub mod tg;
pub mod ui;
pub mod update;

/// stackctl - compiles declarative multi-cluster infra descriptions into
/// Terragrunt/Terraform build directories.
#[derive(Parser)]
#[command(name = "stackctl")]
#[command(version, about = "Compile declarative infra descriptions into Terragrunt build directories")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new stackd.yaml for a project
    Create(create::CreateArgs),

    /// Checkout all configured repos and download tool binaries
    Update(update::UpdateArgs),

    /// Materialize Terragrunt/Terraform build directories
    Build(build::BuildArgs),

    /// Ensure-built, then pass arguments through to the external runner
    Tg(tg::TgArgs),

    /// Run an operation pipeline against a cluster/stack
    Op(op::OpArgs),

    /// Serve the HTTP facade
    Ui(ui::UiArgs),
}
