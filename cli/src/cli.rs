//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::output::OutputContext;

/// Provision a remote host with an Ansible playbook over SSH
#[derive(Parser)]
#[command(
    name = "ansible-provision",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bootstrap the host, upload the playbook directory and run the playbook
    Apply(commands::apply::ConfigArgs),

    /// Check the provisioning file without connecting
    Validate(commands::apply::ConfigArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails and has not reported it itself.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
            Command::Apply(args) => {
                let ctx = OutputContext::new(no_color, quiet);
                commands::apply::run(&ctx, &args, json).await
            }
            Command::Validate(args) => {
                let ctx = OutputContext::new(no_color, quiet);
                commands::validate::run(&ctx, &args, json)
            }
        }
    }
}
