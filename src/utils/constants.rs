//! Shared constants and defaults

pub const DEFAULT_BASE_URL: &str = "https://api.services.mimecast.com";
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/token";
pub const DEFAULT_USERS_PATH: &str = "/api/user/get-internal-users";
pub const DEFAULT_PROFILE_PATH: &str = "/api/user/get-profile";

pub const CLIENT_ID_ENV: &str = "MIMECAST_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "MIMECAST_CLIENT_SECRET";

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RATE_LIMIT_FALLBACK_SECS: u64 = 1;
pub const DEFAULT_RATE_LIMIT_MAX_WAIT_SECS: u64 = 3600;

pub const DEFAULT_OUTPUT_PATH: &str = "mimecast-user-with-role.csv";
pub const EXCLUDED_ROLE_NA: &str = "na";
pub const ROLE_NOT_FOUND: &str = "Role not found";

pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
