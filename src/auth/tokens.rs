//! Session token storage

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Tokens with less than this many seconds left are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Stored session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    /// Unix seconds
    pub expires_at: Option<i64>,
}

impl StoredToken {
    pub fn new(token: String, expires_in_secs: Option<u64>) -> Self {
        let now = Utc::now().timestamp();
        let expires_at = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now.saturating_add(secs));

        Self { token, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map_or(false, |exp| Utc::now().timestamp() + EXPIRY_MARGIN_SECS >= exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_valid() {
        let token = StoredToken::new("abc".to_string(), Some(7200));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_inside_margin_is_expired() {
        let token = StoredToken::new("abc".to_string(), Some(60));
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = StoredToken::new("abc".to_string(), None);
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());
    }
}
