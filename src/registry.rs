use dashmap::DashMap;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::palette::Color;

/// Identifies one open connection, minted by the accept loop.
pub type ConnId = u64;

/// Write half of a client's socket. Shared between that client's own
/// handler and every other handler broadcasting to it; the mutex keeps
/// concurrent writers from interleaving output.
pub type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

struct Client {
    name: String,
    color: Color,
    writer: SharedWriter,
}

/// Map of everyone currently in the room. A connection appears here from
/// handshake completion until it disconnects, exits, or is shut down.
#[derive(Clone, Default)]
pub struct Registry {
    clients: Arc<DashMap<ConnId, Client>>,
}

impl Registry {
    pub fn register(&self, id: ConnId, name: String, color: Color, writer: SharedWriter) {
        self.clients.insert(id, Client { name, color, writer });
    }

    /// Removes the client and hands back its display name. Removing an
    /// absent id is a no-op: the disconnect path, the explicit-exit path
    /// and the shutdown sweep may race.
    pub fn unregister(&self, id: ConnId) -> Option<String> {
        self.clients.remove(&id).map(|(_, client)| client.name)
    }

    pub fn lookup(&self, id: ConnId) -> Option<(String, Color)> {
        self.clients.get(&id).map(|c| (c.name.clone(), c.color))
    }

    /// Display names of everyone currently registered, in map order.
    pub fn names(&self) -> Vec<String> {
        self.clients.iter().map(|c| c.name.clone()).collect()
    }

    /// Snapshot of live writers for fan-out and the shutdown sweep.
    /// Collected into an owned Vec so no map lock is held while sending.
    pub fn writers(&self) -> Vec<(ConnId, SharedWriter)> {
        self.clients
            .iter()
            .map(|c| (*c.key(), c.writer.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinSet;

    // Registry entries want a real write half; make one from a loopback
    // pair. The returned stream keeps the peer end alive.
    async fn socket_writer() -> (SharedWriter, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = TcpStream::connect(addr).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();
        let (_read, write) = accepted.into_split();
        (Arc::new(Mutex::new(write)), peer)
    }

    #[tokio::test]
    async fn unregister_returns_the_name_once() {
        let registry = Registry::default();
        let (writer, _peer) = socket_writer().await;
        registry.register(7, "alice".into(), palette::random(), writer);

        assert_eq!(registry.unregister(7), Some("alice".into()));
        assert_eq!(registry.unregister(7), None);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn duplicate_names_are_separate_entries() {
        let registry = Registry::default();
        let (w1, _p1) = socket_writer().await;
        let (w2, _p2) = socket_writer().await;
        registry.register(1, "sam".into(), palette::random(), w1);
        registry.register(2, "sam".into(), palette::random(), w2);

        let names = registry.names();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n == "sam"));
        assert_eq!(registry.lookup(1).unwrap().0, "sam");
        assert_eq!(registry.unregister(1), Some("sam".into()));
        assert_eq!(registry.lookup(2).unwrap().0, "sam");
    }

    #[tokio::test]
    async fn concurrent_joins_and_leaves_keep_the_count_exact() {
        let registry = Registry::default();
        let mut tasks = JoinSet::new();
        for id in 0..16u64 {
            let registry = registry.clone();
            tasks.spawn(async move {
                let (writer, peer) = socket_writer().await;
                registry.register(id, format!("user{id}"), palette::random(), writer);
                peer
            });
        }
        let mut peers = Vec::new();
        while let Some(res) = tasks.join_next().await {
            peers.push(res.unwrap());
        }
        assert_eq!(registry.len(), 16);

        for id in 0..8u64 {
            assert!(registry.unregister(id).is_some());
        }
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.writers().len(), 8);
    }
}
