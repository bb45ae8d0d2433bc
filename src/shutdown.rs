use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use crate::palette::RED;
use crate::registry::Registry;

/// Resolves once SIGINT or SIGTERM arrives.
pub async fn wait() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received, shutting down"),
        _ = sigterm.recv() => info!("SIGTERM received, shutting down"),
    }

    Ok(())
}

/// Tells every connected client the server is going away and shuts their
/// streams down. Each notify+close is independent: one dead peer is logged
/// and skipped, never a reason to stop the sweep. The process exits right
/// after, so handler-side cleanup past this point is best-effort.
pub async fn notify_all(registry: &Registry) {
    let goodbye = RED.paint("\nServer is shutting down. Goodbye!\n");

    let writers = registry.writers();
    info!(clients = writers.len(), "notifying connected clients");

    for (id, writer) in writers {
        let mut writer = writer.lock().await;
        if let Err(err) = writer.write_all(goodbye.as_bytes()).await {
            warn!(conn = id, "failed to send shutdown notice: {err}");
        }
        if let Err(err) = writer.shutdown().await {
            warn!(conn = id, "failed to close connection: {err}");
        }
    }
}
