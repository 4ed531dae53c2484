use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a bearer token.
///
/// Created at issuance and never mutated. `exp` is required: every issued
/// token is short-lived by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user/entity identifier)
    pub sub: String,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims with an explicit expiration timestamp.
    pub fn new(sub: impl Into<String>, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            exp,
        }
    }

    /// Create claims expiring `ttl_seconds` from now.
    pub fn with_ttl(sub: impl Into<String>, ttl_seconds: i64) -> Self {
        Self::new(sub, Utc::now().timestamp() + ttl_seconds)
    }

    /// Check whether the claims are expired at `now` (Unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }
}
