//! Sync item entity queued for delivery to the external backend

use serde::{Deserialize, Serialize};

/// A verified credential payload awaiting delivery to the backend.
///
/// Appended by the credential-submission step, removed by the hot-path
/// sync worker on successful delivery, moved to the retry queue on
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncItem {
    /// Verified mobile number
    pub mobile: String,
    /// The user's submitted secret
    pub pin: String,
    /// The challenge token from onboarding
    #[serde(rename = "hash")]
    pub token: String,
}

impl SyncItem {
    pub fn new(
        mobile: impl Into<String>,
        pin: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            mobile: mobile.into(),
            pin: pin.into(),
            token: token.into(),
        }
    }
}
