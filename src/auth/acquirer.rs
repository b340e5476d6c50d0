use anyhow::{anyhow, Result};
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::auth::token::BearerToken;
use crate::config::settings::ExporterConfig;
use crate::error::ExportError;
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::utils::constants::GRANT_TYPE_CLIENT_CREDENTIALS;

static SUCCESS_MSG: &str = "success";
static ERROR_MSG: &str = "error";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges the client credentials for a bearer token.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    client: Client,
    url: String,
    client_id: String,
    client_secret: String,
    retry: RetrySettings,
}

impl TokenAcquirer {
    pub fn new(client: Client, config: &ExporterConfig) -> Self {
        Self {
            client,
            url: config.api.token_url(),
            client_id: config.credentials.client_id.to_owned(),
            client_secret: config.credentials.client_secret.to_owned(),
            retry: RetrySettings::from(&config.settings.retry),
        }
    }

    /// Request a fresh token, retrying failed attempts.
    /// Exhausting the attempts yields `ExportError::Authentication`.
    pub async fn acquire(&self) -> Result<BearerToken> {
        let attempts = self.retry.attempts;
        self.retry
            .run_with_retry(|_| self.request_token())
            .await
            .map_err(|_| anyhow!(ExportError::Authentication { attempts }))
    }

    async fn request_token(&self) -> Result<BearerToken> {
        let metrics = get_metrics().await;
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
        ];

        let response = self.client.post(&self.url).form(&form).send().await
            .inspect_err(|_| { metrics.token_acquisitions.with_label_values(&[ERROR_MSG]).inc(); })?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            metrics.token_acquisitions.with_label_values(&[ERROR_MSG]).inc();
            // run_with_retry logs the attempt number with this error
            return Err(anyhow!("token endpoint responded {}: {}", status, body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        match parsed.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                metrics.token_acquisitions.with_label_values(&[SUCCESS_MSG]).inc();
                info!("Token acquired successfully (expires_in: {:?}).", parsed.expires_in);
                Ok(BearerToken::new(token))
            }
            None => {
                metrics.token_acquisitions.with_label_values(&[ERROR_MSG]).inc();
                Err(anyhow!("token endpoint response has no access_token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn rejected_attempt_error_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(json!({"error": "invalid_client"}));
        });
        let mut config = ExporterConfig::default();
        config.api.base_url = server.base_url();

        let err = TokenAcquirer::new(Client::new(), &config)
            .request_token()
            .await
            .expect_err("400 is a failed attempt");

        let msg = err.to_string();
        assert!(msg.contains("400"), "{msg}");
        assert!(msg.contains("invalid_client"), "{msg}");
    }
}
