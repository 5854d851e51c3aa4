use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use gravity_store::StoreDb;

use crate::routes::router;

/// Shared state passed to every handler.
pub struct ApiState {
    pub db: Arc<StoreDb>,
}

/// The HTTP server.
pub struct ApiServer {
    state: Arc<ApiState>,
}

/// A running server: the bound address and the serving task.
pub struct ApiHandle {
    pub local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ApiHandle {
    /// Wait until the server stops.
    pub async fn stopped(self) {
        match self.task.await {
            Err(e) if !e.is_cancelled() => {
                error!(error = %e, "API server task ended abnormally");
            }
            _ => {}
        }
    }

    /// Abort the serving task. In-flight requests are dropped.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl ApiServer {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }

    /// Bind `addr` and start serving. Port 0 picks a free port; the real
    /// address is on the returned handle.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ApiHandle> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = router(self.state);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "API server stopped");
            }
        });
        info!(%local_addr, "API server started");
        Ok(ApiHandle { local_addr, task })
    }
}
