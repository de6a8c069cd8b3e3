//! Domain entities for the verification state machine

pub mod audit;
pub mod challenge;
pub mod inbound_sms;
pub mod power_down;
pub mod sync_item;
pub mod verification;

pub use audit::{AuditEvent, AuditEventKind, BackupCredential};
pub use challenge::Challenge;
pub use inbound_sms::{InboundSms, PendingSms};
pub use power_down::{PowerDownRecord, StoredKeyKind};
pub use sync_item::SyncItem;
pub use verification::VerificationFlag;
