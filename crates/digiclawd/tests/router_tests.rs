//! Router Tests
//!
//! Drives the full axum router in-process: data endpoints, legacy shape,
//! static files, and the uniform response headers.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use digiclaw_common::SectionResult;
use digiclawd::aggregator::Aggregator;
use digiclawd::server::{build_router, AppState};
use digiclawd::sources::{MetricSource, SeededSource};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Test Helpers
// ============================================================================

struct FakeSystem {
    healthy: bool,
}

impl MetricSource for FakeSystem {
    fn name(&self) -> &str {
        "system"
    }

    fn collect(&self) -> SectionResult {
        if self.healthy {
            SectionResult::ok(json!({
                "memory_total": "3906MB",
                "memory_available": "2254MB",
                "memory_usage": "42.3%",
                "disk_used": "7.9G",
                "disk_free": "20G",
                "disk_usage": "29%",
                "cpu_usage": "3.1%",
                "uptime": "2 days, 4:01:09",
                "load_avg": 0.42
            }))
        } else {
            SectionResult::error("Command `df -hP /` failed: not found")
        }
    }
}

fn test_router(healthy: bool, document_root: &std::path::Path) -> Router {
    let sources: Vec<Arc<dyn MetricSource>> = vec![
        Arc::new(FakeSystem { healthy }),
        Arc::new(SeededSource::new(
            "autonomous_work",
            json!([{"action": "Built status API", "time": "17:30", "type": "initiative"}]),
        )),
        Arc::new(SeededSource::new(
            "projects",
            json!([{"name": "Dashboard", "status": "Live", "progress": 95, "last_update": "17:30", "files": 4}]),
        )),
    ];
    let aggregator = Aggregator::new(sources, Duration::from_secs(1)).unwrap();
    build_router(Arc::new(AppState::new(aggregator, document_root)))
}

async fn get(router: &Router, path: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_uniform_headers(response: &Response<Body>) {
    let headers = response.headers();
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::EXPIRES], "0");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

fn is_percentage(text: &str) -> bool {
    text.strip_suffix('%')
        .map(|number| number.contains('.') && number.parse::<f64>().is_ok())
        .unwrap_or(false)
}

// ============================================================================
// Status Endpoint
// ============================================================================

#[tokio::test]
async fn test_status_returns_full_snapshot() {
    let docs = TempDir::new().unwrap();
    let router = test_router(true, docs.path());

    let response = get(&router, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_uniform_headers(&response);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let body = json_body(response).await;
    assert!(body["generated_at"].is_string());
    let usage = body["sections"]["system"]["memory_usage"].as_str().unwrap();
    assert!(is_percentage(usage), "not a percentage: {}", usage);
}

#[tokio::test]
async fn test_status_with_failed_source_is_still_200() {
    let docs = TempDir::new().unwrap();
    let router = test_router(false, docs.path());

    let response = get(&router, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["sections"]["system"]["error"].is_string());
    assert_eq!(body["sections"]["projects"][0]["name"], "Dashboard");
}

#[tokio::test]
async fn test_sequential_status_calls_are_fresh() {
    let docs = TempDir::new().unwrap();
    let router = test_router(true, docs.path());

    let first = json_body(get(&router, "/api/status").await).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = json_body(get(&router, "/api/status").await).await;

    let parse = |v: &Value| {
        chrono::DateTime::parse_from_rfc3339(v["generated_at"].as_str().unwrap()).unwrap()
    };
    assert!(parse(&second) > parse(&first));
}

// ============================================================================
// Legacy Endpoint
// ============================================================================

#[tokio::test]
async fn test_legacy_shape() {
    let docs = TempDir::new().unwrap();
    let router = test_router(true, docs.path());

    let response = get(&router, "/api/system").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_uniform_headers(&response);

    let body = json_body(response).await;
    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["activities", "memory", "projects", "storage"]);
    assert_eq!(body["memory"], "2254MB available");
    assert_eq!(body["storage"], "20G free");
    assert_eq!(body["activities"][0], json!({"time": "17:30", "text": "Built status API"}));
    assert_eq!(
        body["projects"][0],
        json!({"title": "Dashboard", "status": "Live", "progress": 95})
    );
}

#[tokio::test]
async fn test_legacy_never_exposes_error_objects() {
    let docs = TempDir::new().unwrap();
    let router = test_router(false, docs.path());

    let body = json_body(get(&router, "/api/system").await).await;
    assert_eq!(body["memory"], "Unknown");
    assert_eq!(body["storage"], "Unknown");
    assert!(body.get("error").is_none());
}

// ============================================================================
// Static Files
// ============================================================================

#[tokio::test]
async fn test_unknown_path_is_404_and_isolated() {
    let docs = TempDir::new().unwrap();
    let router = test_router(true, docs.path());

    let missing = get(&router, "/does-not-exist.html").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let response = get(&router, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["sections"]["system"]["memory_usage"], "42.3%");
}

#[tokio::test]
async fn test_static_files_served_from_document_root() {
    let docs = TempDir::new().unwrap();
    fs::write(docs.path().join("index.html"), "<h1>Digiclaw</h1>").unwrap();
    fs::write(docs.path().join("dashboard.js"), "console.log(1);").unwrap();
    let router = test_router(true, docs.path());

    let response = get(&router, "/dashboard.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_uniform_headers(&response);

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Digiclaw</h1>");
}

// ============================================================================
// Health Endpoint
// ============================================================================

#[tokio::test]
async fn test_health_lists_sections() {
    let docs = TempDir::new().unwrap();
    let router = test_router(true, docs.path());

    let body = json_body(get(&router, "/api/health").await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sections"], json!(["system", "autonomous_work", "projects"]));
}
