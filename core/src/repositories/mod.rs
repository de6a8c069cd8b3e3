//! Durable-store repository traits
//!
//! The durable relational store holds the append-only audit log, the
//! credential backups, the power-down records, the authoritative
//! blacklist, pending inbound SMS captured in fallback mode, and the
//! settings history. Implementations live in the infrastructure crate.

pub mod mock;

use async_trait::async_trait;

use crate::domain::entities::{AuditEvent, BackupCredential, InboundSms, PendingSms, PowerDownRecord};
use crate::errors::DomainResult;
use crate::settings::SettingsSnapshot;

/// Append-only audit log with the credential-backup side table.
///
/// `archive_batch` must write the events and the backup upserts in one
/// transaction; the caller trims the fast-store buffer only after this
/// returns. The write is called at-least-once, so duplicate events must be
/// harmless (append-only log, upsert-keyed backups).
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn archive_batch(
        &self,
        events: &[AuditEvent],
        backups: &[BackupCredential],
    ) -> DomainResult<()>;
}

/// Power-down record storage for fast-store outage dumps
#[async_trait]
pub trait PowerDownRepository: Send + Sync {
    /// Persist dumped records, replacing any previous record for the same
    /// key name
    async fn save_records(&self, records: &[PowerDownRecord]) -> DomainResult<()>;

    async fn load_records(&self) -> DomainResult<Vec<PowerDownRecord>>;

    /// Delete all records after a successful replay
    async fn clear(&self) -> DomainResult<()>;
}

/// Authoritative blacklist table
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Every blacklisted mobile, for mirroring into the fast store
    async fn all_mobiles(&self) -> DomainResult<Vec<String>>;
}

/// Pending inbound SMS captured while in fallback mode
#[async_trait]
pub trait PendingSmsRepository: Send + Sync {
    async fn enqueue(&self, sms: &InboundSms) -> DomainResult<()>;

    /// All pending rows in arrival order
    async fn fetch_all(&self) -> DomainResult<Vec<PendingSms>>;

    /// Delete one replayed row
    async fn delete(&self, id: i64) -> DomainResult<()>;
}

/// Append-only settings history
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the active settings payload, if one exists
    async fn load_active(&self) -> DomainResult<Option<SettingsSnapshot>>;
}

/// Bounded-timeout health probe against the durable store
#[async_trait]
pub trait DurableHealth: Send + Sync {
    async fn ping(&self) -> DomainResult<()>;
}
