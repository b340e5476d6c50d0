use serde::{Deserialize, Serialize};

use crate::utils::constants::ROLE_NOT_FOUND;

/// ================================
/// get-internal-users
/// ================================
#[derive(Debug, Serialize)]
pub struct ListUsersRequest<'a> {
    pub meta: RequestMeta<'a>,
}

#[derive(Debug, Serialize)]
pub struct RequestMeta<'a> {
    pub pagination: RequestPagination<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPagination<'a> {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

impl<'a> ListUsersRequest<'a> {
    pub fn page(page_size: u32, page_token: Option<&'a str>) -> Self {
        Self { meta: RequestMeta { pagination: RequestPagination { page_size, page_token } } }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersResponse {
    #[serde(default)]
    pub data: Vec<UsersPage>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

#[derive(Debug, Deserialize, Default)]
pub struct UsersPage {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResponseMeta {
    #[serde(default)]
    pub pagination: ResponsePagination,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResponsePagination {
    pub next: Option<String>,
}

impl ListUsersResponse {
    /// Cursor for the following page; empty strings end the listing too.
    pub fn next_cursor(&self) -> Option<String> {
        self.meta.pagination.next.clone().filter(|next| !next.is_empty())
    }
}

/// One entry of the internal users list. Other attributes are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub alias: bool,
}

impl UserRecord {
    /// Email worth looking up: not an alias and contains '@'.
    pub fn lookup_email(&self) -> Option<&str> {
        if self.alias {
            return None;
        }
        self.email_address
            .as_deref()
            .filter(|email| email.contains('@'))
    }
}

/// Accepts true/false, null, 0/1 and "true"/"false" for boolean-ish flags.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        serde_json::Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

/// ================================
/// get-profile
/// ================================
#[derive(Debug, Serialize)]
pub struct ProfileRequest<'a> {
    pub data: [ProfileQuery<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery<'a> {
    pub show_avatar: bool,
    pub email_address: &'a str,
}

impl<'a> ProfileRequest<'a> {
    pub fn for_email(email_address: &'a str) -> Self {
        Self { data: [ProfileQuery { show_avatar: false, email_address }] }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub data: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    /// missing attribute means "Role not found", explicit null means no role
    #[serde(default = "role_not_found")]
    pub role: Option<String>,
}

fn role_not_found() -> Option<String> {
    Some(ROLE_NOT_FOUND.to_owned())
}
