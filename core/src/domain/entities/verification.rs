//! Verification flag entity for numbers that passed SMS validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mobile number that passed the validation pipeline and is awaiting
/// credential submission.
///
/// Created only inside the same atomic store transaction that deletes the
/// matching [`Challenge`](super::Challenge); consumed exactly once by the
/// credential-submission step, otherwise it expires untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationFlag {
    /// E.164-normalized mobile number
    pub mobile: String,
    /// The challenge token that produced this flag
    pub token: String,
    /// When validation succeeded
    pub verified_at: DateTime<Utc>,
}

impl VerificationFlag {
    /// Create a flag stamped with the current time
    pub fn new(mobile: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            mobile: mobile.into(),
            token: token.into(),
            verified_at: Utc::now(),
        }
    }
}
