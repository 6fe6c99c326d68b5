mod commands;
mod config;
mod render;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, Overrides};

/// Exit status of a `--strict` sync where some birthdays failed.
const EXIT_PARTIAL_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "birthdays365")]
#[command(about = "Keep a Microsoft 365 calendar of your contacts' birthdays")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calendar to sync into (overrides CALENDAR_NAME)
    #[arg(short, long, global = true)]
    calendar: Option<String>,

    /// Mailbox to sync (overrides TARGET_USER_UPN)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Create events without a reminder
    #[arg(long, global = true)]
    no_reminder: bool,

    /// Debug logging and list unchanged birthdays
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and update birthday events from contacts
    Sync {
        /// Exit with status 2 if any birthday could not be synced
        #[arg(long)]
        strict: bool,
    },
    /// Show what a sync would change
    Status,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "birthdays365=debug,birthdays365_core=debug,birthdays365_graph=debug"
    } else {
        "birthdays365=info,birthdays365_core=info,birthdays365_graph=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let overrides = Overrides {
        calendar: cli.calendar,
        user: cli.user,
        no_reminder: cli.no_reminder,
    };
    let config = AppConfig::load(&overrides)?;

    match cli.command {
        Commands::Sync { strict } => {
            let summary = commands::sync::run(&config, cli.verbose).await?;
            if strict && summary.has_failures() {
                return Ok(ExitCode::from(EXIT_PARTIAL_FAILURE));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status => {
            commands::status::run(&config, cli.verbose).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
