use thiserror::Error;

/// Failures that end a run or a single lookup.
///
/// Functions return `anyhow::Result` and wrap these, so callers match them
/// with `downcast_ref::<ExportError>()`.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to obtain bearer token after {attempts} attempts")]
    Authentication { attempts: u32 },

    #[error("token refresh failed while calling {endpoint}: {reason}")]
    TokenRefresh { endpoint: &'static str, reason: String },

    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: &'static str, reason: String },

    #[error("config is not valid: {}", .0.join("; "))]
    Config(Vec<String>),
}
