//! Status command - show status of the running daemon

use anyhow::Result;

use argon_core::error::ArgonError;
use argon_core::ipc::IpcClient;

/// Show status of the running daemon
pub async fn status() -> Result<()> {
    println!("Argon - Status\n");

    let mut client = match IpcClient::connect().await {
        Ok(client) => client,
        Err(ArgonError::NoActiveDaemon) => {
            println!("Daemon is not running.");
            println!("\nStart it with: argon serve");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let status = client.status().await?;

    println!("  State:      running");
    println!("  PID:        {}", status.pid);
    println!("  Uptime:     {:.0}s", status.uptime_seconds);
    println!("  In flight:  {} enumeration(s)", status.in_flight);

    Ok(())
}
