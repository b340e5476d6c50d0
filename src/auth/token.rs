use std::fmt;

/// Short-lived credential returned by the token endpoint.
///
/// The value is threaded through every API call and replaced whenever a call
/// observes a 401; nothing holds it globally.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(***{} chars)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_redacted_debug() {
        let token = BearerToken::new("abc123");
        assert_eq!(token.authorization_header(), "Bearer abc123");
        assert_eq!(token.value(), "abc123");
        assert!(!format!("{:?}", token).contains("abc123"));
    }
}
