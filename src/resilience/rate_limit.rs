use http::HeaderMap;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::settings::RateLimitConfig;
use crate::helpers::time::{now_i64, seconds_until};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::RATE_LIMIT_RESET_HEADER;

/// How long to wait after a 429, given the response headers and the current unix time.
pub fn rate_limit_wait(headers: &HeaderMap, now: i64, cfg: &RateLimitConfig) -> Duration {
    let reset = headers
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    let secs = match reset.and_then(|ts| seconds_until(ts, now)) {
        Some(secs) => secs.min(cfg.max_wait_seconds),
        None => {
            debug!("no usable {} header, falling back to {}s", RATE_LIMIT_RESET_HEADER, cfg.fallback_wait_seconds);
            cfg.fallback_wait_seconds
        }
    };
    Duration::from_secs(secs)
}

/// Sleep until the provider allows the next request.
pub async fn wait_for_rate_limit(endpoint: &'static str, headers: &HeaderMap, cfg: &RateLimitConfig) {
    let wait = rate_limit_wait(headers, now_i64(), cfg);
    get_metrics().await.rate_limit_waits.with_label_values(&[endpoint]).inc();
    warn!("Rate limit exceeded on {}. Waiting {} seconds.", endpoint, wait.as_secs());
    sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn cfg() -> RateLimitConfig {
        RateLimitConfig { fallback_wait_seconds: 1, max_wait_seconds: 60 }
    }

    fn headers_with_reset(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn waits_until_reset_timestamp() {
        let now = 1_700_000_000;
        let headers = headers_with_reset(&(now + 5).to_string());
        assert_eq!(rate_limit_wait(&headers, now, &cfg()), Duration::from_secs(5));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let now = 1_700_000_000;
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_str(&(now + 3).to_string()).unwrap());
        assert_eq!(rate_limit_wait(&headers, now, &cfg()), Duration::from_secs(3));
    }

    #[test]
    fn missing_or_past_reset_uses_fallback() {
        let now = 1_700_000_000;
        assert_eq!(rate_limit_wait(&HeaderMap::new(), now, &cfg()), Duration::from_secs(1));
        let past = headers_with_reset(&(now - 10).to_string());
        assert_eq!(rate_limit_wait(&past, now, &cfg()), Duration::from_secs(1));
        let garbage = headers_with_reset("soon");
        assert_eq!(rate_limit_wait(&garbage, now, &cfg()), Duration::from_secs(1));
        let overflowing = headers_with_reset("-9223372036854775808");
        assert_eq!(rate_limit_wait(&overflowing, now, &cfg()), Duration::from_secs(1));
    }

    #[test]
    fn wait_is_capped() {
        let now = 1_700_000_000;
        let headers = headers_with_reset(&(now + 86_400).to_string());
        assert_eq!(rate_limit_wait(&headers, now, &cfg()), Duration::from_secs(60));
    }
}
