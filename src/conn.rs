use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::broadcast;
use crate::palette::{self, CYAN, GREEN, RED};
use crate::protocol::{self, Input};
use crate::registry::{ConnId, Registry, SharedWriter};

/// Drives one client from handshake to cleanup.
pub async fn handle(
    registry: Registry,
    socket: TcpStream,
    id: ConnId,
    peer: SocketAddr,
) -> Result<()> {
    let (reader, writer) = socket.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(writer));

    let mut lines = BufReader::new(reader).lines();

    send(&writer, &CYAN.paint("\nWelcome! Please enter your username: "), id).await;

    // Handshake: one line, taken as the display name after trimming. No
    // timeout, no validation; empty names and duplicates are allowed.
    let name = match lines.next_line().await {
        Ok(Some(line)) => line.trim().to_string(),
        Ok(None) | Err(_) => {
            // Never registered, so nobody gets told.
            debug!(%peer, "closed before handshake");
            return Ok(());
        }
    };

    let color = palette::random();
    registry.register(id, name.clone(), color, writer.clone());
    info!(%peer, %name, online = registry.len(), "client joined");

    send(&writer, &GREEN.paint(&format!("\nWelcome to the chat, {name}!\n")), id).await;
    send(&writer, &CYAN.paint("Type /exit to leave the chat room.\n"), id).await;
    broadcast::roster(&registry).await;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match protocol::parse(&line) {
                Input::Exit => {
                    send(&writer, &RED.paint("\nYou have left the chat room.\n"), id).await;
                    info!(%peer, "client left");
                    break;
                }
                Input::Chat(text) => {
                    // Attribution comes from the registry entry for this
                    // connection, not from anything the client claims.
                    let Some((name, color)) = registry.lookup(id) else {
                        break;
                    };
                    let message = color.paint(&format!("{name}: {text}\n"));
                    broadcast::broadcast(&registry, &message, Some(id)).await;
                    // The sender sees the same line everyone else got.
                    send(&writer, &message, id).await;
                }
            },
            Ok(None) => {
                info!(%peer, "client disconnected");
                break;
            }
            Err(err) => {
                info!(%peer, "client disconnected: {err}");
                break;
            }
        }
    }

    // Every exit path lands here: drop the registry entry first, then tell
    // whoever is left.
    if let Some(name) = registry.unregister(id) {
        let notice = RED.paint(&format!("{name} has left the chat room.\n"));
        broadcast::broadcast(&registry, &notice, None).await;
        broadcast::roster(&registry).await;
    }

    Ok(())
}

/// Best-effort write to this handler's own client. Failures are logged;
/// the read loop is the sole judge of when the connection is dead.
async fn send(writer: &SharedWriter, payload: &str, id: ConnId) {
    let mut writer = writer.lock().await;
    if let Err(err) = writer.write_all(payload.as_bytes()).await {
        warn!(conn = id, "write failed: {err}");
    }
}
