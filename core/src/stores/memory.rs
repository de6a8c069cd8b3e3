//! In-memory fast-store implementation for tests and local development
//!
//! Mirrors the Redis key layout closely enough to exercise every service:
//! challenges with a mobile reverse index, verification flags, rate
//! counters, the blacklist set, the sync/retry queues and the audit
//! buffer. Key expiry is driven manually through the `expire_*` helpers
//! instead of wall-clock TTLs so tests stay deterministic.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::{
    AuditEvent, Challenge, PowerDownRecord, SyncItem, VerificationFlag,
};
use crate::errors::{DomainError, DomainResult};

use super::{
    AuditQueueStore, BlacklistStore, ChallengeStore, RateLimitStore, SnapshotStore, StateDump,
    StoreHealth, SyncQueueStore, VerificationStore,
};

#[derive(Default)]
struct Inner {
    challenges: HashMap<String, Challenge>,
    mobile_index: HashMap<String, String>,
    flags: HashMap<String, VerificationFlag>,
    rates: HashMap<String, i64>,
    blacklist: HashSet<String>,
    sync_queue: VecDeque<SyncItem>,
    retry_queue: VecDeque<SyncItem>,
    audit_buffer: VecDeque<AuditEvent>,
    unavailable: bool,
}

/// In-memory implementation of every fast-store trait
#[derive(Default)]
pub struct MemoryFastStore {
    inner: Mutex<Inner>,
}

impl MemoryFastStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn guard(&self) -> DomainResult<std::sync::MutexGuard<'_, Inner>> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(DomainError::fast_store_unavailable());
        }
        Ok(inner)
    }

    /// Simulate the fast store going down (every operation fails)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Simulate TTL expiry of a challenge
    pub fn expire_challenge(&self, token: &str) {
        let mut inner = self.lock();
        if let Some(challenge) = inner.challenges.remove(token) {
            inner.mobile_index.remove(&challenge.mobile);
        }
    }

    /// Simulate TTL expiry of a verification flag
    pub fn expire_flag(&self, mobile: &str) {
        self.lock().flags.remove(mobile);
    }

    /// Simulate rate-window expiry for a mobile
    pub fn expire_rate(&self, mobile: &str) {
        self.lock().rates.remove(mobile);
    }

    pub fn challenge_count(&self) -> usize {
        self.lock().challenges.len()
    }

    /// Seed a verification flag directly, bypassing the pipeline
    pub fn insert_flag(&self, flag: VerificationFlag) {
        self.lock().flags.insert(flag.mobile.clone(), flag);
    }

    pub fn flag_for(&self, mobile: &str) -> Option<VerificationFlag> {
        self.lock().flags.get(mobile).cloned()
    }

    pub fn sync_queue_len(&self) -> usize {
        self.lock().sync_queue.len()
    }

    pub fn retry_items(&self) -> Vec<SyncItem> {
        self.lock().retry_queue.iter().cloned().collect()
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.lock().audit_buffer.iter().cloned().collect()
    }
}

#[async_trait]
impl ChallengeStore for MemoryFastStore {
    async fn put_challenge(&self, challenge: &Challenge, _ttl_seconds: u64) -> DomainResult<()> {
        let mut inner = self.guard()?;
        inner
            .mobile_index
            .insert(challenge.mobile.clone(), challenge.token.clone());
        inner
            .challenges
            .insert(challenge.token.clone(), challenge.clone());
        Ok(())
    }

    async fn find_challenge(&self, token: &str) -> DomainResult<Option<Challenge>> {
        Ok(self.guard()?.challenges.get(token).cloned())
    }

    async fn active_token_for(&self, mobile: &str) -> DomainResult<Option<String>> {
        Ok(self.guard()?.mobile_index.get(mobile).cloned())
    }

    async fn consume_challenge(
        &self,
        token: &str,
        challenge_mobile: &str,
        flag: &VerificationFlag,
        _flag_ttl_seconds: u64,
    ) -> DomainResult<()> {
        let mut inner = self.guard()?;
        inner.challenges.remove(token);
        inner.mobile_index.remove(challenge_mobile);
        inner.flags.insert(flag.mobile.clone(), flag.clone());
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for MemoryFastStore {
    async fn find_flag(&self, mobile: &str) -> DomainResult<Option<VerificationFlag>> {
        Ok(self.guard()?.flags.get(mobile).cloned())
    }

    async fn consume_flag(&self, mobile: &str, item: &SyncItem) -> DomainResult<()> {
        let mut inner = self.guard()?;
        inner.sync_queue.push_back(item.clone());
        inner.flags.remove(mobile);
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for MemoryFastStore {
    async fn increment_rate(&self, mobile: &str, _window_seconds: u64) -> DomainResult<i64> {
        let mut inner = self.guard()?;
        let count = inner.rates.entry(mobile.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

#[async_trait]
impl BlacklistStore for MemoryFastStore {
    async fn is_blacklisted(&self, mobile: &str) -> DomainResult<bool> {
        Ok(self.guard()?.blacklist.contains(mobile))
    }

    async fn replace_blacklist(&self, mobiles: &[String]) -> DomainResult<()> {
        let mut inner = self.guard()?;
        inner.blacklist = mobiles.iter().cloned().collect();
        Ok(())
    }
}

#[async_trait]
impl SyncQueueStore for MemoryFastStore {
    async fn push_sync(&self, item: &SyncItem) -> DomainResult<()> {
        self.guard()?.sync_queue.push_back(item.clone());
        Ok(())
    }

    async fn pop_sync(&self) -> DomainResult<Option<SyncItem>> {
        Ok(self.guard()?.sync_queue.pop_front())
    }

    async fn push_retry(&self, item: &SyncItem) -> DomainResult<()> {
        self.guard()?.retry_queue.push_back(item.clone());
        Ok(())
    }

    async fn pop_retry(&self) -> DomainResult<Option<SyncItem>> {
        Ok(self.guard()?.retry_queue.pop_front())
    }

    async fn retry_len(&self) -> DomainResult<usize> {
        Ok(self.guard()?.retry_queue.len())
    }
}

#[async_trait]
impl AuditQueueStore for MemoryFastStore {
    async fn push_event(&self, event: &AuditEvent) -> DomainResult<()> {
        self.guard()?.audit_buffer.push_back(event.clone());
        Ok(())
    }

    async fn oldest_events(&self, limit: usize) -> DomainResult<Vec<AuditEvent>> {
        Ok(self
            .guard()?
            .audit_buffer
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn remove_oldest(&self, count: usize) -> DomainResult<()> {
        let mut inner = self.guard()?;
        for _ in 0..count {
            inner.audit_buffer.pop_front();
        }
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MemoryFastStore {
    async fn ping(&self) -> DomainResult<()> {
        self.guard().map(|_| ())
    }
}

#[async_trait]
impl SnapshotStore for MemoryFastStore {
    async fn dump_state(&self) -> DomainResult<StateDump> {
        let inner = self.guard()?;
        let mut dump = StateDump::default();
        for (token, challenge) in &inner.challenges {
            match serde_json::to_string(challenge) {
                Ok(value) => dump.records.push(PowerDownRecord::string_key(
                    format!("challenge:{}", token),
                    value,
                    Some(challenge.remaining_seconds()),
                )),
                Err(e) => dump
                    .failed_keys
                    .push((format!("challenge:{}", token), e.to_string())),
            }
        }
        for (mobile, token) in &inner.mobile_index {
            dump.records.push(PowerDownRecord::string_key(
                format!("challenge_mobile:{}", mobile),
                token.clone(),
                None,
            ));
        }
        for (mobile, flag) in &inner.flags {
            match serde_json::to_string(flag) {
                Ok(value) => dump.records.push(PowerDownRecord::string_key(
                    format!("verified:{}", mobile),
                    value,
                    None,
                )),
                Err(e) => dump
                    .failed_keys
                    .push((format!("verified:{}", mobile), e.to_string())),
            }
        }
        Ok(dump)
    }

    async fn restore_state(&self, records: &[PowerDownRecord]) -> DomainResult<()> {
        let mut inner = self.guard()?;
        for record in records {
            if record.original_ttl.is_some_and(|ttl| ttl <= 0) {
                continue;
            }
            if let Some(token) = record.key_name.strip_prefix("challenge:") {
                if let Ok(challenge) = serde_json::from_str::<Challenge>(&record.value) {
                    inner.challenges.insert(token.to_string(), challenge);
                }
            } else if let Some(mobile) = record.key_name.strip_prefix("challenge_mobile:") {
                inner
                    .mobile_index
                    .insert(mobile.to_string(), record.value.clone());
            } else if let Some(mobile) = record.key_name.strip_prefix("verified:") {
                if let Ok(flag) = serde_json::from_str::<VerificationFlag>(&record.value) {
                    inner.flags.insert(mobile.to_string(), flag);
                }
            }
        }
        Ok(())
    }
}
