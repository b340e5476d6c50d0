use chrono::Utc;
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Whole seconds from `now` until `unix_ts`, None when it already passed.
pub fn seconds_until(unix_ts: i64, now: i64) -> Option<u64> {
    let diff = unix_ts.checked_sub(now)?;
    (diff > 0).then_some(diff as u64)
}
