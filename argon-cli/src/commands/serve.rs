//! Serve command - run the enumeration daemon

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use argon_core::capture::{PortalBackend, SourceCoalescer};
use argon_core::config::ConfigFile;
use argon_core::ipc::{socket_path, IpcServer};

/// Run the enumeration daemon
pub async fn serve() -> Result<()> {
    println!("Argon - Enumeration Daemon\n");

    let config = ConfigFile::load_or_default();

    let backend = Arc::new(
        PortalBackend::new()
            .await
            .context("Failed to connect to the screencast portal")?,
    );
    let coalescer = Arc::new(SourceCoalescer::new(backend));

    let socket = config.daemon.socket.unwrap_or_else(socket_path);
    let mut server = IpcServer::with_socket(coalescer, socket.clone())
        .context("Failed to create IPC server")?;
    server.start().await.context("Failed to start IPC server")?;

    println!("Listening on {}", socket.display());
    println!("Press Ctrl+C to stop, or run 'argon stop'.\n");

    tokio::select! {
        result = server.run() => {
            result.context("IPC server failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    server.cleanup();
    println!("Daemon stopped.");

    Ok(())
}
