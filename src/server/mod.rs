//! HTTP surface for configuration lookups.
//!
//! `GET /config/{application}[/{profile}[/{key}]]` returns the matching rows
//! as a JSON array, 404 with the slash-joined lookup key when nothing matches,
//! and 500 with a generic message when the store cannot be read.

mod routes;

pub use routes::build_router;

use crate::query::Resolver;
use crate::store::PropertySource;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A running server. Dropping it leaves the server running.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            error!("Config server task failed: {}", e);
        }
    }
}

/// Bind `addr` and serve lookups from `resolver` in a background task.
///
/// Port 0 binds an ephemeral port; see [`ServerHandle::addr`].
pub async fn start_server<S>(resolver: Resolver<S>, addr: SocketAddr) -> anyhow::Result<ServerHandle>
where
    S: PropertySource + Send + Sync + 'static,
{
    let app = build_router(Arc::new(resolver));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Config server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Config server shutting down");
            })
            .await
        {
            error!("Config server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx,
        task,
    })
}
