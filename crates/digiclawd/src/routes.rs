//! API routes for digiclawd
//!
//! `/api/status` serves the full snapshot, `/api/system` the legacy view for
//! older dashboard builds, `/api/health` a liveness summary. Both data
//! endpoints aggregate from scratch on every request.

use crate::server::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Response},
    routing::get,
    Json, Router,
};
use digiclaw_common::{legacy, LegacyView, StatusSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

type AppStateArc = Arc<AppState>;

pub const STATUS_PATH: &str = "/api/status";
pub const LEGACY_PATH: &str = "/api/system";
pub const HEALTH_PATH: &str = "/api/health";

// ============================================================================
// Data Routes
// ============================================================================

pub fn data_routes() -> Router<AppStateArc> {
    Router::new()
        .route(STATUS_PATH, get(status))
        .route(LEGACY_PATH, get(legacy_system))
}

async fn status(State(state): State<AppStateArc>) -> Json<StatusSnapshot> {
    debug!("  Building status snapshot");
    Json(state.aggregator.aggregate().await)
}

async fn legacy_system(State(state): State<AppStateArc>) -> Json<LegacyView> {
    debug!("  Building legacy view");
    let snapshot = state.aggregator.aggregate().await;
    Json(legacy::project(&snapshot))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub sections: Vec<String>,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route(HEALTH_PATH, get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sections: state
            .aggregator
            .section_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

// ============================================================================
// Response Headers
// ============================================================================

/// Stamp every response with no-cache and allow-all CORS headers
pub async fn apply_response_headers<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
