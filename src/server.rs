use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::registry::{ConnId, Registry};

/// Binds `listen_addr` and serves until the process exits. A bind failure
/// is fatal; nothing after that is.
pub async fn run(listen_addr: &str, registry: Registry) -> Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;

    info!("listening on {listen_addr}");

    serve(listener, registry).await
}

/// Accept loop over a pre-bound listener. Every connection gets its own id
/// and its own task; a stalled handshake never delays the next accept.
pub async fn serve(listener: TcpListener, registry: Registry) -> Result<()> {
    let mut next_id: ConnId = 0;

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                next_id = next_id.wrapping_add(1);
                let id = next_id;

                info!(%peer, "new client connected");

                let registry = registry.clone();
                tokio::spawn(async move {
                    if let Err(err) = crate::conn::handle(registry, socket, id, peer).await {
                        warn!(%peer, "connection error: {err:?}");
                    }
                });
            }
            // Transient accept failures must not take the listener down.
            Err(err) => warn!("accept failed: {err}"),
        }
    }
}
