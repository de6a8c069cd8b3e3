//! Inbound SMS event as forwarded by the gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One SMS forwarded by the gateway for validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundSms {
    /// Sender mobile number (E.164)
    pub mobile_number: String,
    /// Raw message body (e.g. "ONBOARD:A3B7K2M9")
    pub message: String,
    /// When the gateway received the SMS
    pub received_at: DateTime<Utc>,
}

impl InboundSms {
    pub fn new(
        mobile_number: impl Into<String>,
        message: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            message: message.into(),
            received_at,
        }
    }
}

/// A pending inbound SMS persisted in the durable store while the fast
/// store is unavailable. Replayed through the normal pipeline during
/// recovery, then deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSms {
    /// Durable-store row identifier
    pub id: i64,
    /// The queued SMS event
    pub sms: InboundSms,
}
