use anyhow::Result;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::auth::token::BearerToken;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

/// What a caller should do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    /// 401: the bearer token expired
    Expired,
    /// 429: wait for X-RateLimit-Reset
    RateLimited,
    Failed,
}

impl From<StatusCode> for ResponseClass {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => ResponseClass::Success,
            StatusCode::UNAUTHORIZED => ResponseClass::Expired,
            StatusCode::TOO_MANY_REQUESTS => ResponseClass::RateLimited,
            _ => ResponseClass::Failed,
        }
    }
}

/// Fully read response; the body is kept as text so failures can be logged verbatim.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn class(&self) -> ResponseClass {
        ResponseClass::from(self.status)
    }
}

/// POST a JSON payload with the bearer token and read the whole response.
pub async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    endpoint: &'static str,
    url: &str,
    token: &BearerToken,
    payload: &B,
) -> Result<ApiResponse> {
    let metrics = get_metrics().await;
    let start = get_instant();

    let response = client
        .post(url)
        .header(http::header::AUTHORIZATION, token.authorization_header())
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    metrics.api_request_duration.with_label_values(&[endpoint]).observe(start.elapsed().as_secs_f64());
    metrics.api_requests.with_label_values(&[endpoint, status.as_str()]).inc();
    debug!("{} responded {} ({} bytes)", endpoint, status, body.len());

    Ok(ApiResponse { status, headers, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert_eq!(ResponseClass::from(StatusCode::OK), ResponseClass::Success);
        assert_eq!(ResponseClass::from(StatusCode::UNAUTHORIZED), ResponseClass::Expired);
        assert_eq!(ResponseClass::from(StatusCode::TOO_MANY_REQUESTS), ResponseClass::RateLimited);
        assert_eq!(ResponseClass::from(StatusCode::CREATED), ResponseClass::Failed);
        assert_eq!(ResponseClass::from(StatusCode::BAD_GATEWAY), ResponseClass::Failed);
    }
}
