//! Calls against the provider's user API: paginated listing and per-user profile lookup.

pub mod model;
pub mod profile;
pub mod request;
pub mod users;

// endpoint labels used in logs and metrics
pub const USERS_ENDPOINT: &str = "users";
pub const PROFILE_ENDPOINT: &str = "profile";
