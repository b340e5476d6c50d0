use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api::model::UserRecord;
use crate::api::profile::resolve_role;
use crate::api::users::list_users;
use crate::auth::acquirer::TokenAcquirer;
use crate::config::settings::ExporterConfig;
use crate::export::csv_file::write_rows;
use crate::export::row::ExportRow;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub users_listed: usize,
    pub listing_complete: bool,
    pub candidates: usize,
    pub roles_resolved: usize,
    pub lookups_failed: usize,
    pub rows_excluded: usize,
    pub rows_exported: usize,
    pub output_path: Option<PathBuf>,
}

pub fn build_client(config: &ExporterConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_millis(config.settings.http.timeout_ms))
        .build()?)
}

/// Users whose role should be looked up, with their position in the listing.
/// Aliases, missing or '@'-less emails and repeated emails are dropped.
pub fn lookup_candidates(users: &[UserRecord]) -> Vec<(usize, &str)> {
    let mut seen = HashSet::new();
    users
        .iter()
        .enumerate()
        .filter_map(|(index, user)| user.lookup_email().map(|email| (index, email)))
        .filter(|(_, email)| seen.insert(*email))
        .collect()
}

/// Acquire a token, list all users, resolve each candidate's role and write the CSV.
///
/// Only a failed initial token request, a failed refresh during listing, or a
/// transport/parse error is returned as `Err`. Users whose lookup fails are skipped.
pub async fn run_export(config: &ExporterConfig, client: &Client) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    let acquirer = TokenAcquirer::new(client.clone(), config);

    let token = acquirer.acquire().await?;
    let (listing, mut token) = list_users(client, &acquirer, config, token).await?;

    summary.users_listed = listing.users.len();
    summary.listing_complete = listing.complete;
    info!("Total users fetched: {} ({} pages)", listing.users.len(), listing.pages);
    if !listing.complete {
        warn!("user listing stopped early, continuing with {} users", listing.users.len());
    }

    let candidates = lookup_candidates(&listing.users);
    summary.candidates = candidates.len();
    let total = listing.users.len();
    let excluded = &config.export.excluded_roles;
    let mut rows = Vec::new();

    for (index, email) in candidates {
        info!("Processing user {}/{}: {}", index + 1, total, email);
        let (role, fresh) = resolve_role(client, &acquirer, config, email, token).await?;
        token = fresh;

        match role {
            Some(role) => {
                info!("  Role: {}", role);
                summary.roles_resolved += 1;
                match ExportRow::exportable(email, &role, excluded) {
                    Some(row) => rows.push(row),
                    None => {
                        debug!("  role '{}' is excluded from export", role);
                        summary.rows_excluded += 1;
                    }
                }
            }
            None => {
                warn!("  Failed to get role for {}", email);
                summary.lookups_failed += 1;
            }
        }
    }

    if rows.is_empty() {
        info!("No user roles were found to export.");
        return Ok(summary);
    }

    let path = PathBuf::from(&config.export.output_path);
    write_rows(&path, &rows).await?;
    summary.rows_exported = rows.len();
    summary.output_path = Some(path);
    Ok(summary)
}
