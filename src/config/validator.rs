//! Configuration validation with aggregated errors.
//! Every problem found is collected, then reported once as `ExportError::Config`.

use anyhow::{anyhow, Result};
use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::{ApiConfig, CredentialsConfig, ExportConfig, ExporterConfig, RetryConfig};
use crate::error::ExportError;

pub fn validate_exporter_config(cfg: &ExporterConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_retry("settings.retry", &cfg.settings.retry, &mut errors);
    validate_api(&cfg.api, &mut errors);
    validate_credentials(&cfg.credentials, &mut errors);
    validate_export(&cfg.export, &mut errors);

    if let Some(logging) = &cfg.settings.logging {
        let level = logging.level.to_ascii_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!("settings.logging.level '{}' is not a known level", logging.level));
        }
    }
    if cfg.settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(anyhow!(ExportError::Config(errors)))
    }
}

fn validate_retry(prefix: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == 0 {
        errors.push(format!("{}.attempts must be >= 1", prefix));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(format!(
            "{}.base_delay_ms ({}) must be <= max_delay_ms ({})",
            prefix, retry.base_delay_ms, retry.max_delay_ms
        ));
    }
}

fn validate_api(api: &ApiConfig, errors: &mut Vec<String>) {
    match Url::parse(&api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("api.base_url scheme '{}' must be http or https", url.scheme())),
        Err(e) => errors.push(format!("api.base_url '{}' is not a valid URL: {}", api.base_url, e)),
    }
    for (name, path) in [
        ("token_path", &api.token_path),
        ("users_path", &api.users_path),
        ("profile_path", &api.profile_path),
    ] {
        if path.trim().is_empty() {
            errors.push(format!("api.{} must not be empty", name));
        }
    }
}

fn validate_credentials(creds: &CredentialsConfig, errors: &mut Vec<String>) {
    if creds.client_id.trim().is_empty() {
        errors.push("credentials.client_id is empty".to_string());
    }
    if creds.client_secret.trim().is_empty() {
        errors.push("credentials.client_secret is empty".to_string());
    }
}

fn validate_export(export: &ExportConfig, errors: &mut Vec<String>) {
    if export.page_size == 0 {
        errors.push("export.page_size must be >= 1".to_string());
    }
    if export.max_pages == Some(0) {
        errors.push("export.max_pages must be >= 1 when set".to_string());
    }
    if export.output_path.trim().is_empty() {
        errors.push("export.output_path must not be empty".to_string());
    }
}
