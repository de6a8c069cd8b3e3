//! Challenge entity representing an outstanding verification request

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An outstanding verification challenge for a mobile number.
///
/// At most one live challenge exists per mobile number at a time; the
/// fast store enforces this through the reverse index keyed by mobile.
/// The challenge is deleted atomically when the matching SMS is accepted,
/// otherwise it is garbage-collected by the store's own key expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// E.164-normalized mobile number the challenge was issued for
    pub mobile: String,
    /// Opaque fixed-length alphanumeric token the user must echo back
    pub token: String,
    /// When the challenge was issued
    pub issued_at: DateTime<Utc>,
    /// When the challenge stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    /// Create a new challenge expiring `ttl_seconds` after `issued_at`
    pub fn new(
        mobile: impl Into<String>,
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            mobile: mobile.into(),
            token: token.into(),
            issued_at,
            expires_at: issued_at + Duration::seconds(ttl_seconds as i64),
        }
    }

    /// Check whether the challenge has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Remaining lifetime in whole seconds, zero when already expired
    pub fn remaining_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}
