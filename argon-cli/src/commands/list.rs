//! List command - enumerate capturable sources

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use argon_core::capture::{PortalBackend, SourceCoalescer};
use argon_core::config::ConfigFile;
use argon_core::ipc::{daemon_running, IpcClient};
use argon_core::types::{SourceEntry, ThumbnailSize};

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Exclude window sources
    #[arg(long)]
    no_windows: bool,

    /// Exclude screen sources
    #[arg(long)]
    no_screens: bool,

    /// Thumbnail size as WIDTHxHEIGHT (e.g. "150x150")
    #[arg(short, long)]
    thumbnail_size: Option<String>,

    /// Also fetch window application icons
    #[arg(long)]
    icons: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Require a running daemon instead of falling back to a direct query
    #[arg(long)]
    daemon: bool,
}

/// List capturable sources
pub async fn list(args: ListArgs) -> Result<()> {
    let config = ConfigFile::load_or_default();
    let mut options = config.defaults.source_options();

    if args.no_windows {
        options.capture_window = false;
    }
    if args.no_screens {
        options.capture_screen = false;
    }
    if let Some(ref size) = args.thumbnail_size {
        options.thumbnail_size = parse_size(size)?;
    }
    if args.icons {
        options.fetch_window_icons = true;
    }

    // Prefer a running daemon so concurrent callers coalesce onto one
    // enumeration; fall back to a direct portal query.
    let use_daemon = args.daemon || daemon_running().await;

    let sources = if use_daemon {
        let mut client = match config.daemon.socket {
            Some(path) => IpcClient::connect_to(path).await,
            None => IpcClient::connect().await,
        }
        .context("Failed to connect to the argon daemon (is 'argon serve' running?)")?;
        client.sources(options).await.context("Enumeration failed")?
    } else {
        let backend = Arc::new(
            PortalBackend::new()
                .await
                .context("Failed to connect to the screencast portal")?,
        );
        let coalescer = SourceCoalescer::new(backend);
        coalescer
            .request(options)
            .wait()
            .await
            .context("Enumeration failed")?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    print_table(&sources);
    Ok(())
}

fn print_table(sources: &[SourceEntry]) {
    println!("Argon - Capturable Sources\n");

    if sources.is_empty() {
        println!("No sources found.");
        println!("\nNote: On Wayland, concrete sources appear through the portal picker.");
        return;
    }

    println!(
        "{:<18} {:<34} {:<12} {:<12} {:<5}",
        "ID", "Name", "Display", "Thumbnail", "Icon"
    );
    println!("{}", "-".repeat(85));

    for source in sources {
        println!(
            "{:<18} {:<34} {:<12} {:<12} {:<5}",
            truncate(&source.id, 16),
            truncate(&source.name, 32),
            source.display_id.as_deref().unwrap_or("-"),
            format!("{} bytes", source.thumbnail.len()),
            if source.app_icon.is_some() { "yes" } else { "-" },
        );
    }

    println!("\nNote: On Wayland, use the portal picker to select a concrete source.");
}

fn parse_size(s: &str) -> Result<ThumbnailSize> {
    let (width, height) = s
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("Invalid size '{}'. Expected WIDTHxHEIGHT", s))?;
    Ok(ThumbnailSize::new(
        width
            .parse()
            .with_context(|| format!("Invalid width in '{}'", s))?,
        height
            .parse()
            .with_context(|| format!("Invalid height in '{}'", s))?,
    ))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max - 3])
    }
}
