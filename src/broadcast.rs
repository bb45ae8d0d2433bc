use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::palette::CYAN;
use crate::registry::{ConnId, Registry};

/// Delivers `payload` to every registered client except `exclude`.
///
/// The writer set is snapshotted up front, so no registry lock is held
/// during the sends. A failed write is logged and the fan-out moves on;
/// the broken connection's own read loop will notice soon enough.
pub async fn broadcast(registry: &Registry, payload: &str, exclude: Option<ConnId>) {
    for (id, writer) in registry.writers() {
        if Some(id) == exclude {
            continue;
        }

        let mut writer = writer.lock().await;
        if let Err(err) = writer.write_all(payload.as_bytes()).await {
            warn!(conn = id, "failed to deliver message: {err}");
        }
    }
}

/// Resends the full member list to everyone. Called after every join and
/// departure; no diffing.
pub async fn roster(registry: &Registry) {
    let mut listing = String::from("\nCurrently in the chat room:\n");
    for name in registry.names() {
        listing.push_str(&format!("  - {name}\n"));
    }

    broadcast(registry, &CYAN.paint(&listing), None).await;
}
