//! Audit event entity and event kinds
//!
//! Every state-changing operation appends one of these to the fast-store
//! audit buffer; the cold-path worker archives them into the durable log
//! in batches. Event kinds are serialized with their wire names so the
//! buffered JSON matches the `sms_bridge_logs.event` column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of audit event, closed set known at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// A challenge token was issued
    #[serde(rename = "HASH_GEN")]
    HashGenerated,
    /// An inbound SMS passed the full validation pipeline
    #[serde(rename = "SMS_VERIFIED")]
    SmsVerified,
    /// An inbound SMS was rejected by a pipeline stage
    #[serde(rename = "SMS_FAILED")]
    SmsFailed,
    /// A credential was collected for a verified mobile
    #[serde(rename = "PIN_COLLECTED")]
    PinCollected,
    /// A sync item was delivered to the external backend
    #[serde(rename = "SYNC_DELIVERED")]
    SyncDelivered,
    /// A sync item delivery failed and was moved to the retry queue
    #[serde(rename = "SYNC_FAILED")]
    SyncFailed,
    /// The administrative recovery trigger drained the retry queue
    #[serde(rename = "RECOVERY_TRIGGERED")]
    RecoveryTriggered,
    /// The resilience manager entered fallback mode
    #[serde(rename = "FALLBACK_ENTERED")]
    FallbackEntered,
    /// The resilience manager completed recovery
    #[serde(rename = "FALLBACK_RECOVERED")]
    FallbackRecovered,
}

impl AuditEventKind {
    /// Wire name stored in the durable audit log
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::HashGenerated => "HASH_GEN",
            AuditEventKind::SmsVerified => "SMS_VERIFIED",
            AuditEventKind::SmsFailed => "SMS_FAILED",
            AuditEventKind::PinCollected => "PIN_COLLECTED",
            AuditEventKind::SyncDelivered => "SYNC_DELIVERED",
            AuditEventKind::SyncFailed => "SYNC_FAILED",
            AuditEventKind::RecoveryTriggered => "RECOVERY_TRIGGERED",
            AuditEventKind::FallbackEntered => "FALLBACK_ENTERED",
            AuditEventKind::FallbackRecovered => "FALLBACK_RECOVERED",
        }
    }
}

impl std::fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record queued for durable archival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event kind
    pub event: AuditEventKind,
    /// Structured event-specific details
    pub details: serde_json::Value,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an event stamped with the current time
    pub fn new(event: AuditEventKind, details: serde_json::Value) -> Self {
        Self {
            event,
            details,
            timestamp: Utc::now(),
        }
    }
}

/// Credential backup row derived from a `PIN_COLLECTED` event.
///
/// Keyed by (mobile, token) with upsert semantics so re-archiving the same
/// event is harmless. The secret is stored only as a SHA-256 hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupCredential {
    pub mobile: String,
    pub pin_hash: String,
    pub token: String,
}

impl BackupCredential {
    /// Extract a backup row from a `PIN_COLLECTED` event's details.
    ///
    /// Returns `None` for other kinds or malformed details.
    pub fn from_event(event: &AuditEvent) -> Option<Self> {
        if event.event != AuditEventKind::PinCollected {
            return None;
        }
        let details = event.details.as_object()?;
        Some(Self {
            mobile: details.get("mobile")?.as_str()?.to_string(),
            pin_hash: details.get("pin_hash")?.as_str()?.to_string(),
            token: details.get("hash")?.as_str()?.to_string(),
        })
    }
}
