//! rctsync - back up remote virtual disks using resilient change tracking.

mod commands;
mod error;
mod runner;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::common::{resolve_max_bytes_per_request, ServiceArgs};
use commands::config::ConfigCommands;
use commands::download::DownloadArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "rctsync", version, about)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Service(ServiceCommands),

    /// View or change settings in config.ini
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Commands that talk to the RCT service.
#[derive(Debug, Subcommand)]
enum ServiceCommands {
    /// Show virtual disk metadata and RCT status
    Info {
        /// Path of the virtual disk on the remote host
        disk: String,
    },

    /// Enable resilient change tracking for a disk
    EnableRct {
        /// Path of the virtual disk on the remote host
        disk: String,
    },

    /// Disable resilient change tracking for a disk
    DisableRct {
        /// Path of the virtual disk on the remote host
        disk: String,
    },

    /// Download a whole disk, or the ranges changed since an RCT checkpoint
    Download(DownloadArgs),
}

impl ServiceCommands {
    fn name(&self) -> &'static str {
        match self {
            ServiceCommands::Info { .. } => "info",
            ServiceCommands::EnableRct { .. } => "enable-rct",
            ServiceCommands::DisableRct { .. } => "disable-rct",
            ServiceCommands::Download(_) => "download",
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Service(command) => run_service_command(command, &cli.service, cli.verbose),
    }
}

fn run_service_command(
    command: ServiceCommands,
    service: &ServiceArgs,
    verbose: bool,
) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup(command.name());
    let client = runner.service_client(service)?;

    match command {
        ServiceCommands::Info { disk } => commands::info::run(&client, &disk),
        ServiceCommands::EnableRct { disk } => commands::tracking::run(&client, &disk, true),
        ServiceCommands::DisableRct { disk } => commands::tracking::run(&client, &disk, false),
        ServiceCommands::Download(args) => {
            let max_bytes =
                resolve_max_bytes_per_request(args.max_bytes_per_request, runner.config());
            commands::download::run(client, &args, max_bytes).map(|_| ())
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
