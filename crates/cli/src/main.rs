use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::commands;
use std::process::ExitCode;
use tagmap_core::config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    let status = match cli.command {
        Commands::Unmapped { json } => commands::run_unmapped(&cfg, json)?.exit_status(false),
        Commands::Validate { json, strict } => {
            commands::run_validate(&cfg, json)?.exit_status(strict)
        }
        Commands::Verify { json, strict } => {
            commands::run_verify(&cfg, json)?.exit_status(strict)
        }
    };
    Ok(ExitCode::from(status))
}

#[derive(Parser)]
#[command(name = "tagmap-audit")]
#[command(
    about = "Cross-check tag vocabulary, folder taxonomy and tag mappings",
    long_about = None
)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find vocabulary tags without a folder mapping and write the unmapped report
    Unmapped {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Check tuple mappings against the folder structure and write the invalid paths report
    Validate {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
        /// Exit non-zero when invalid folder references are found
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Check array mappings against the folder structure, console only
    Verify {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
        /// Exit non-zero when invalid folder references are found
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}
