use anyhow::{anyhow, Result};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::api::model::{ProfileRequest, ProfileResponse};
use crate::api::request::{post_json, ResponseClass};
use crate::api::PROFILE_ENDPOINT;
use crate::auth::acquirer::TokenAcquirer;
use crate::auth::token::BearerToken;
use crate::config::settings::ExporterConfig;
use crate::error::ExportError;
use crate::observability::metrics::get_metrics;
use crate::resilience::rate_limit::wait_for_rate_limit;
use crate::resilience::retry::RetrySettings;

static RESOLVED_MSG: &str = "resolved";
static FAILED_MSG: &str = "failed";
static SKIPPED_MSG: &str = "skipped";

/// Look up the role assigned to `email`.
///
/// Returns `None` when the lookup gave up for this user: the retry budget ran
/// out, the token could not be refreshed, or the profile carries a null role.
/// 401 and 429 responses do not count against the retry budget.
pub async fn resolve_role(
    client: &Client,
    acquirer: &TokenAcquirer,
    config: &ExporterConfig,
    email: &str,
    mut token: BearerToken,
) -> Result<(Option<String>, BearerToken)> {
    let metrics = get_metrics().await;
    let url = config.api.profile_url();
    let retry = RetrySettings::from(&config.settings.retry);
    let payload = ProfileRequest::for_email(email);

    let mut attempt = 0u32;
    let mut refreshes = 0u32;

    while attempt < retry.attempts {
        let response = post_json(client, PROFILE_ENDPOINT, &url, &token, &payload).await?;

        match response.class() {
            ResponseClass::Expired => {
                refreshes += 1;
                if refreshes > retry.attempts {
                    warn!("still unauthorized after {} refreshes. Skipping user {}.", retry.attempts, email);
                    metrics.role_lookups.with_label_values(&[SKIPPED_MSG]).inc();
                    return Ok((None, token));
                }
                info!("Token expired while fetching user role. Refreshing token.");
                match acquirer.acquire().await {
                    Ok(fresh) => token = fresh,
                    Err(e) => {
                        warn!("Failed to refresh token ({}). Skipping user {}.", e, email);
                        metrics.role_lookups.with_label_values(&[SKIPPED_MSG]).inc();
                        return Ok((None, token));
                    }
                }
                continue;
            }
            ResponseClass::RateLimited => {
                wait_for_rate_limit(PROFILE_ENDPOINT, &response.headers, &config.settings.rate_limit).await;
                continue;
            }
            ResponseClass::Success => {
                let profile: ProfileResponse = serde_json::from_str(&response.body).map_err(|e| {
                    anyhow!(ExportError::MalformedResponse { endpoint: PROFILE_ENDPOINT, reason: e.to_string() })
                })?;
                if let Some(first) = profile.data.into_iter().next() {
                    metrics.role_lookups.with_label_values(&[lookup_outcome(&first.role)]).inc();
                    return Ok((first.role, token));
                }
            }
            ResponseClass::Failed => {}
        }

        attempt += 1;
        warn!(
            "Error getting user role (Attempt {}/{}): {} {}",
            attempt, retry.attempts, response.status, response.body
        );
        if attempt < retry.attempts {
            sleep(retry.delay_for(attempt)).await;
        }
    }

    error!("Failed to get role for {} after {} attempts.", email, retry.attempts);
    metrics.role_lookups.with_label_values(&[FAILED_MSG]).inc();
    Ok((None, token))
}

/// Metric outcome for a profile that answered; an explicit null role is a failed lookup.
fn lookup_outcome(role: &Option<String>) -> &'static str {
    match role {
        Some(_) => RESOLVED_MSG,
        None => FAILED_MSG,
    }
}
