// Token endpoint fails a few times before answering; the acquirer must keep
// trying up to the configured attempts and no further.

#[cfg(test)]
mod test {

use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

use axum::{routing::post, Form, Router};
use http::StatusCode;
use httpmock::Method::POST;
use httpmock::MockServer;
use std::collections::HashMap;

use crate::auth::acquirer::TokenAcquirer;
use crate::error::ExportError;
use crate::tests::common::{build_reqwest_client, json, json_response, spawn_axum, test_config};

fn flaky_token_router(counter: Arc<AtomicUsize>, failures: usize) -> Router {
    Router::new().route("/oauth/token", post(move |Form(form): Form<HashMap<String, String>>| {
        let c = counter.clone();
        async move {
            let n = c.fetch_add(1, Ordering::SeqCst);
            assert_eq!(form.get("grant_type").map(String::as_str), Some("client_credentials"));
            assert_eq!(form.get("client_id").map(String::as_str), Some("test-id"));
            assert_eq!(form.get("client_secret").map(String::as_str), Some("test-secret"));
            if n < failures {
                json_response(StatusCode::INTERNAL_SERVER_ERROR, json!({"fail": [{"code": "transient"}]}))
            } else {
                json_response(StatusCode::OK, json!({"access_token": "token-xyz", "token_type": "Bearer", "expires_in": 1800}))
            }
        }
    }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn token_acquired_on_third_attempt() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (handle, addr) = spawn_axum(flaky_token_router(counter.clone(), 2)).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{}", addr), &dir.path().join("out.csv"));

    let acquirer = TokenAcquirer::new(build_reqwest_client(), &config);
    let token = acquirer.acquire().await.expect("token after retries");

    assert_eq!(token.value(), "token-xyz");
    assert_eq!(counter.load(Ordering::SeqCst), 3, "server should have seen exactly 3 attempts");
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn token_failure_after_all_attempts_is_authentication_error() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (handle, addr) = spawn_axum(flaky_token_router(counter.clone(), usize::MAX)).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{}", addr), &dir.path().join("out.csv"));

    let err = TokenAcquirer::new(build_reqwest_client(), &config)
        .acquire()
        .await
        .expect_err("token endpoint never succeeds");

    assert!(matches!(
        err.downcast_ref::<ExportError>(),
        Some(ExportError::Authentication { attempts: 3 })
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ok_response_without_access_token_is_retried() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"token_type": "Bearer"}));
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.base_url(), &dir.path().join("out.csv"));

    let result = TokenAcquirer::new(build_reqwest_client(), &config).acquire().await;

    assert!(result.is_err());
    assert_eq!(mock.hits_async().await, 3);
}

}
