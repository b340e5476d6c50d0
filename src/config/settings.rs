use serde::Deserialize;

use crate::utils::constants::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_OUTPUT_PATH, DEFAULT_PAGE_SIZE, DEFAULT_PROFILE_PATH, DEFAULT_RATE_LIMIT_FALLBACK_SECS,
    DEFAULT_RATE_LIMIT_MAX_WAIT_SECS, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TOKEN_PATH, DEFAULT_USERS_PATH, EXCLUDED_ROLE_NA,
};

/// ================================
/// Full exporter configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ExporterConfig {
    pub settings: SettingsConfig,
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub export: ExportConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SettingsConfig {
    pub retry: RetryConfig,
    pub rate_limit: RateLimitConfig,
    pub http: HttpConfig,
    pub logging: Option<LoggingConfig>,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: u64,
    /// invariant: >= base_delay_ms. equal values give a fixed delay
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    /// used when X-RateLimit-Reset is missing or already passed
    pub fallback_wait_seconds: u64,
    pub max_wait_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            fallback_wait_seconds: DEFAULT_RATE_LIMIT_FALLBACK_SECS,
            max_wait_seconds: DEFAULT_RATE_LIMIT_MAX_WAIT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_HTTP_TIMEOUT_MS }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// node_exporter textfile collector target, written once after the run
    pub textfile_path: Option<String>,
}

/// ================================
/// Provider API
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_path: String,
    pub users_path: String,
    pub profile_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token_path: DEFAULT_TOKEN_PATH.to_owned(),
            users_path: DEFAULT_USERS_PATH.to_owned(),
            profile_path: DEFAULT_PROFILE_PATH.to_owned(),
        }
    }
}

impl ApiConfig {
    pub fn token_url(&self) -> String {
        self.join(&self.token_path)
    }

    pub fn users_url(&self) -> String {
        self.join(&self.users_path)
    }

    pub fn profile_url(&self) -> String {
        self.join(&self.profile_path)
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct CredentialsConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            client_id: std::env::var(CLIENT_ID_ENV).unwrap_or_default(),
            client_secret: std::env::var(CLIENT_SECRET_ENV).unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// ================================
/// Export
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub page_size: u32,
    /// stop after this many pages; None lists everything
    pub max_pages: Option<u32>,
    pub output_path: String,
    /// empty roles are always excluded
    pub excluded_roles: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            output_path: DEFAULT_OUTPUT_PATH.to_owned(),
            excluded_roles: vec![EXCLUDED_ROLE_NA.to_owned()],
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
