//! HTTP surface: askama pages driven by htmx, plus the JSON API.

pub mod api;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod templates;

pub use router::app_router;
pub use state::AppState;

use tokio::net::TcpListener;
use tracing::info;

use crate::error::Result;

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Profile explorer listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "could not listen for shutdown signal");
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
