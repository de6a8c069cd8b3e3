//! Fast-store traits
//!
//! The fast key-value store is an external collaborator; the core reaches
//! it only through these traits. Cross-step atomicity (consume a challenge
//! and create the verification flag, consume a flag and enqueue the sync
//! item) is pushed into the store's own transactional primitive, never an
//! in-process lock, because multiple process instances may run behind a
//! load balancer.

pub mod memory;

use async_trait::async_trait;

use crate::domain::entities::{
    AuditEvent, Challenge, PowerDownRecord, SyncItem, VerificationFlag,
};
use crate::errors::DomainResult;

pub use memory::MemoryFastStore;

/// Challenge storage with the mobile reverse index
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Store a challenge and its mobile reverse index atomically, both
    /// with the given TTL
    async fn put_challenge(&self, challenge: &Challenge, ttl_seconds: u64) -> DomainResult<()>;

    /// Look up a live challenge by token
    async fn find_challenge(&self, token: &str) -> DomainResult<Option<Challenge>>;

    /// Token of the live challenge for a mobile, if any
    async fn active_token_for(&self, mobile: &str) -> DomainResult<Option<String>>;

    /// Atomically delete the challenge pair and create the verification
    /// flag for the sender. Both happen or neither does.
    async fn consume_challenge(
        &self,
        token: &str,
        challenge_mobile: &str,
        flag: &VerificationFlag,
        flag_ttl_seconds: u64,
    ) -> DomainResult<()>;
}

/// Verification flag storage
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Look up a live verification flag for a mobile
    async fn find_flag(&self, mobile: &str) -> DomainResult<Option<VerificationFlag>>;

    /// Atomically enqueue the sync item and delete the flag (one-time
    /// use). Both happen or neither does.
    async fn consume_flag(&self, mobile: &str, item: &SyncItem) -> DomainResult<()>;
}

/// Rolling per-mobile rate counter
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Increment the counter for a mobile, creating it with the window
    /// TTL on first increment. Returns the new count.
    async fn increment_rate(&self, mobile: &str, window_seconds: u64) -> DomainResult<i64>;
}

/// Blacklist set mirrored from the authoritative durable table
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn is_blacklisted(&self, mobile: &str) -> DomainResult<bool>;

    /// Atomically replace the whole set with the given members
    async fn replace_blacklist(&self, mobiles: &[String]) -> DomainResult<()>;
}

/// Sync and retry queues (FIFO lists)
#[async_trait]
pub trait SyncQueueStore: Send + Sync {
    async fn push_sync(&self, item: &SyncItem) -> DomainResult<()>;

    /// Pop the oldest sync item, if any
    async fn pop_sync(&self) -> DomainResult<Option<SyncItem>>;

    async fn push_retry(&self, item: &SyncItem) -> DomainResult<()>;

    /// Pop the oldest retry item, if any
    async fn pop_retry(&self) -> DomainResult<Option<SyncItem>>;

    async fn retry_len(&self) -> DomainResult<usize>;
}

/// Audit event buffer (FIFO list)
#[async_trait]
pub trait AuditQueueStore: Send + Sync {
    async fn push_event(&self, event: &AuditEvent) -> DomainResult<()>;

    /// Oldest `limit` events without removing them. Events stay buffered
    /// until [`remove_oldest`](Self::remove_oldest) confirms archival.
    async fn oldest_events(&self, limit: usize) -> DomainResult<Vec<AuditEvent>>;

    /// Remove the oldest `count` events after a successful archive
    async fn remove_oldest(&self, count: usize) -> DomainResult<()>;
}

/// Umbrella trait for the request-path fast-store operations
pub trait FastStore:
    ChallengeStore + VerificationStore + RateLimitStore + BlacklistStore
{
}

impl<T> FastStore for T where
    T: ChallengeStore + VerificationStore + RateLimitStore + BlacklistStore
{
}

/// Bounded-timeout health probe against the fast store.
///
/// Implementations must use their own connection budget; a probe must
/// never block behind a stuck request.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> DomainResult<()>;
}

/// Result of a best-effort state dump
#[derive(Debug, Default)]
pub struct StateDump {
    /// Keys captured successfully
    pub records: Vec<PowerDownRecord>,
    /// Keys that could not be read, with the error text
    pub failed_keys: Vec<(String, String)>,
}

/// Dump and restore of challenge/verification state across fast-store
/// outages
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Capture every live challenge and verification key. Each key is an
    /// independently failable read; partial failure is reported per key,
    /// not as an error.
    async fn dump_state(&self) -> DomainResult<StateDump>;

    /// Write records back with their original remaining TTLs. Records
    /// whose TTL already ran out are skipped.
    async fn restore_state(&self, records: &[PowerDownRecord]) -> DomainResult<()>;
}
