use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::auth::cleanup_service::CleanupService;
use crate::errors::{Error, Result};

use super::{routes::build_router, state::AppState};

/// Bind the configured address and serve until Ctrl-C.
///
/// The session cleanup task runs alongside the server and is stopped with it.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .server
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid server address: {}", e)))?;

    let cleanup = state
        .config
        .session
        .cleanup_interval()
        .map(|interval| CleanupService::new(state.sessions.clone()).spawn(interval));

    let router = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Starting HTTP server");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "shutdown listener failed");
            }
        })
        .await;

    if let Some(task) = cleanup {
        task.abort();
    }
    served?;

    info!("HTTP server shutdown completed");
    Ok(())
}
