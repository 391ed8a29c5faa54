use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::feed::StatusFeed;
use crate::status::FeedEntry;

/// Router serving the dashboard feed at `GET /`, open to any origin.
pub fn router(feed: Arc<StatusFeed>) -> Router {
    Router::new()
        .route("/", get(latest_states))
        .layer(CorsLayer::permissive())
        .with_state(feed)
}

/// Always answers 200; failed pipelines show up as `ERROR` entries.
async fn latest_states(State(feed): State<Arc<StatusFeed>>) -> Json<Vec<FeedEntry>> {
    debug!("Serving feed for {} pipelines", feed.pipeline_count());
    Json(feed.collect().await)
}

/// Serves the feed on `addr` until ctrl-c.
pub async fn serve(feed: Arc<StatusFeed>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("server is listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(feed))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(signal::ctrl_c()).await;
}

/// Resolves when `signal` fires; if it cannot be installed, never resolves.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for ctrl-c, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
