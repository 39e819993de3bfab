//! HTTP server for digiclawd

use crate::aggregator::Aggregator;
use crate::routes;
use anyhow::{Context, Result};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers.
///
/// Nothing here is mutable: each request aggregates its own snapshot.
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub document_root: PathBuf,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(aggregator: Aggregator, document_root: impl Into<PathBuf>) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            document_root: document_root.into(),
            start_time: Instant::now(),
        }
    }
}

/// Build the router: API routes, then static files for everything else
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.document_root);

    Router::new()
        .merge(routes::data_routes())
        .merge(routes::health_routes())
        .fallback_service(static_files)
        .with_state(state)
        .layer(middleware::map_response(routes::apply_response_headers))
        .layer(TraceLayer::new_for_http())
}

/// Bind the listening socket. Failure here is fatal at startup.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))
}

/// Run the HTTP server until Ctrl-C
pub async fn run(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(Arc::new(state));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down gracefully"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
