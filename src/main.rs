use anyhow::Result;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

use chatroom::registry::Registry;
use chatroom::{server, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listen = std::env::args().nth(1).unwrap_or_else(|| "0.0.0.0:2000".to_string());

    let registry = Registry::default();

    tokio::select! {
        res = server::run(&listen, registry.clone()) => res,
        res = shutdown::wait() => {
            res?;
            shutdown::notify_all(&registry).await;
            info!("server shut down");
            Ok(())
        }
    }
}
