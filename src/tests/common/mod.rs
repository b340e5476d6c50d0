// tests/common/mod.rs
pub use axum::{Router, response::{IntoResponse, Response}};
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::path::Path;

use http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde_json::Value;

use crate::config::settings::ExporterConfig;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Config pointed at a local mock with short delays.
pub fn test_config(base_url: &str, output: &Path) -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.api.base_url = base_url.to_owned();
    config.credentials.client_id = "test-id".to_owned();
    config.credentials.client_secret = "test-secret".to_owned();
    config.settings.retry.attempts = 3;
    config.settings.retry.base_delay_ms = 10;
    config.settings.retry.max_delay_ms = 10;
    config.settings.rate_limit.fallback_wait_seconds = 0;
    config.export.output_path = output.to_string_lossy().into_owned();
    config
}

/// One page of the internal users list with `count` users numbered from `start`.
pub fn users_page(start: usize, count: usize, next: Option<&str>) -> Value {
    let users: Vec<Value> = (start..start + count)
        .map(|i| json!({"emailAddress": format!("user{}@x.com", i), "alias": false, "name": format!("User {}", i)}))
        .collect();
    json!({
        "meta": {"status": 200, "pagination": {"pageSize": count, "next": next}},
        "data": [{"users": users}],
        "fail": []
    })
}

pub fn json_response(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

pub fn page_token(body: &Value) -> Option<String> {
    body["meta"]["pagination"]["pageToken"].as_str().map(str::to_owned)
}

pub fn bearer(headers: &HeaderMap) -> String {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
