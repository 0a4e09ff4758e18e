//! Stop command - stop the running daemon

use anyhow::Result;

use argon_core::error::ArgonError;
use argon_core::ipc::IpcClient;

/// Stop the running daemon
pub async fn stop() -> Result<()> {
    println!("Argon - Stop Daemon\n");

    let mut client = match IpcClient::connect().await {
        Ok(client) => client,
        Err(ArgonError::NoActiveDaemon) => {
            println!("Daemon is not running.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    client.stop().await?;
    println!("Stop requested.");

    Ok(())
}
