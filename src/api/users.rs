use anyhow::{anyhow, bail, Result};
use reqwest::Client;
use tracing::{error, info};

use crate::api::model::{ListUsersRequest, ListUsersResponse, UserRecord};
use crate::api::request::{post_json, ResponseClass};
use crate::api::USERS_ENDPOINT;
use crate::auth::acquirer::TokenAcquirer;
use crate::auth::token::BearerToken;
use crate::config::settings::ExporterConfig;
use crate::error::ExportError;
use crate::observability::metrics::get_metrics;
use crate::resilience::rate_limit::wait_for_rate_limit;

/// Users accumulated by one listing run.
#[derive(Debug, Default)]
pub struct UserListing {
    pub users: Vec<UserRecord>,
    pub pages: u32,
    /// false when an error status stopped the listing before the last page
    pub complete: bool,
}

/// Page through the internal users list.
///
/// A 401 refreshes the token and a 429 waits for the reset window; both
/// resend the same page with the same cursor. Any other error status stops
/// the loop and keeps what was already accumulated.
pub async fn list_users(
    client: &Client,
    acquirer: &TokenAcquirer,
    config: &ExporterConfig,
    mut token: BearerToken,
) -> Result<(UserListing, BearerToken)> {
    let url = config.api.users_url();
    let page_size = config.export.page_size;
    let max_pages = config.export.max_pages;
    let max_refreshes = config.settings.retry.attempts.max(1);

    let mut listing = UserListing::default();
    let mut cursor: Option<String> = None;
    let mut refreshes = 0u32;

    loop {
        let payload = ListUsersRequest::page(page_size, cursor.as_deref());
        let response = post_json(client, USERS_ENDPOINT, &url, &token, &payload).await?;

        match response.class() {
            ResponseClass::Expired => {
                refreshes += 1;
                if refreshes > max_refreshes {
                    bail!(ExportError::TokenRefresh {
                        endpoint: USERS_ENDPOINT,
                        reason: format!("still unauthorized after {} refreshes", max_refreshes),
                    });
                }
                info!("Token expired. Refreshing token.");
                token = acquirer.acquire().await.map_err(|e| {
                    error!("Failed to refresh token. Exiting.");
                    anyhow!(ExportError::TokenRefresh { endpoint: USERS_ENDPOINT, reason: e.to_string() })
                })?;
                continue;
            }
            ResponseClass::RateLimited => {
                wait_for_rate_limit(USERS_ENDPOINT, &response.headers, &config.settings.rate_limit).await;
                continue;
            }
            ResponseClass::Failed => {
                error!("Error fetching users: {} {}", response.status, response.body);
                break;
            }
            ResponseClass::Success => refreshes = 0,
        }

        let page: ListUsersResponse = serde_json::from_str(&response.body).map_err(|e| {
            anyhow!(ExportError::MalformedResponse { endpoint: USERS_ENDPOINT, reason: e.to_string() })
        })?;
        let next = page.next_cursor();
        let users = page
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!(ExportError::MalformedResponse {
                endpoint: USERS_ENDPOINT,
                reason: "empty data array".to_owned(),
            }))?
            .users;

        get_metrics().await.users_listed.inc_by(users.len() as u64);
        listing.users.extend(users);
        listing.pages += 1;
        info!("Page {}: next {:?}, total users {}", listing.pages, next, listing.users.len());

        cursor = next;
        if cursor.is_none() {
            listing.complete = true;
            break;
        }
        if max_pages.is_some_and(|max| listing.pages >= max) {
            info!("page limit {} reached, stop listing", listing.pages);
            listing.complete = true;
            break;
        }
    }

    Ok((listing, token))
}
