//! Argon CLI
//!
//! Coalesced capture source listing for screen sharing.
//!
//! # Usage
//!
//! ```bash
//! # List capturable sources
//! argon list
//!
//! # Run the enumeration daemon
//! argon serve
//!
//! # Query the daemon
//! argon status
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Argon - coalesced capture source listing for screen sharing
#[derive(Parser)]
#[command(name = "argon")]
#[command(author = "GhostKellz")]
#[command(version)]
#[command(about = "Coalesced capture source listing for screen sharing", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List capturable sources
    #[command(alias = "ls")]
    List(commands::ListArgs),

    /// Run the enumeration daemon
    Serve,

    /// Show status of the running daemon
    Status,

    /// Stop the running daemon
    Stop,

    /// Manage configuration files
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("argon_core={}", level).parse().unwrap())
                .add_directive(format!("argon_cli={}", level).parse().unwrap()),
        )
        .with_target(false)
        .init();

    // Run the appropriate command
    match cli.command {
        Commands::List(args) => commands::list(args).await?,
        Commands::Serve => commands::serve().await?,
        Commands::Status => commands::status().await?,
        Commands::Stop => commands::stop().await?,
        Commands::Config(args) => commands::config(args).await?,
    }

    Ok(())
}
