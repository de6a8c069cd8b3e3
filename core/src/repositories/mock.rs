//! In-memory mock repositories for unit and route tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::{
    AuditEvent, BackupCredential, InboundSms, PendingSms, PowerDownRecord,
};
use crate::errors::{DomainError, DomainResult};
use crate::settings::SettingsSnapshot;

use super::{
    AuditLogRepository, BlacklistRepository, DurableHealth, PendingSmsRepository,
    PowerDownRepository, SettingsRepository,
};

/// Mock audit log capturing archived events and backup rows
#[derive(Default)]
pub struct MockAuditLogRepository {
    pub archived: Mutex<Vec<AuditEvent>>,
    pub backups: Mutex<HashMap<(String, String), BackupCredential>>,
    pub should_fail: Mutex<bool>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock().unwrap() = fail;
    }

    pub fn archived_events(&self) -> Vec<AuditEvent> {
        self.archived.lock().unwrap().clone()
    }

    pub fn backup_for(&self, mobile: &str, token: &str) -> Option<BackupCredential> {
        self.backups
            .lock()
            .unwrap()
            .get(&(mobile.to_string(), token.to_string()))
            .cloned()
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn archive_batch(
        &self,
        events: &[AuditEvent],
        backups: &[BackupCredential],
    ) -> DomainResult<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::durable_store_unavailable());
        }
        self.archived.lock().unwrap().extend_from_slice(events);
        let mut map = self.backups.lock().unwrap();
        for backup in backups {
            map.insert((backup.mobile.clone(), backup.token.clone()), backup.clone());
        }
        Ok(())
    }
}

/// Mock power-down record storage
#[derive(Default)]
pub struct MockPowerDownRepository {
    records: Mutex<Vec<PowerDownRecord>>,
}

impl MockPowerDownRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<PowerDownRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PowerDownRepository for MockPowerDownRepository {
    async fn save_records(&self, records: &[PowerDownRecord]) -> DomainResult<()> {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.retain(|r| r.key_name != record.key_name);
            stored.push(record.clone());
        }
        Ok(())
    }

    async fn load_records(&self) -> DomainResult<Vec<PowerDownRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}

/// Mock authoritative blacklist
#[derive(Default)]
pub struct MockBlacklistRepository {
    pub mobiles: Mutex<Vec<String>>,
}

impl MockBlacklistRepository {
    pub fn with_mobiles(mobiles: Vec<String>) -> Self {
        Self {
            mobiles: Mutex::new(mobiles),
        }
    }
}

#[async_trait]
impl BlacklistRepository for MockBlacklistRepository {
    async fn all_mobiles(&self) -> DomainResult<Vec<String>> {
        Ok(self.mobiles.lock().unwrap().clone())
    }
}

/// Mock pending-SMS table
#[derive(Default)]
pub struct MockPendingSmsRepository {
    rows: Mutex<Vec<PendingSms>>,
    next_id: Mutex<i64>,
}

impl MockPendingSmsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl PendingSmsRepository for MockPendingSmsRepository {
    async fn enqueue(&self, sms: &InboundSms) -> DomainResult<()> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.rows.lock().unwrap().push(PendingSms {
            id: *next_id,
            sms: sms.clone(),
        });
        Ok(())
    }

    async fn fetch_all(&self) -> DomainResult<Vec<PendingSms>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}

/// Mock settings history with a single active payload
#[derive(Default)]
pub struct MockSettingsRepository {
    pub active: Mutex<Option<SettingsSnapshot>>,
}

impl MockSettingsRepository {
    pub fn with_active(snapshot: SettingsSnapshot) -> Self {
        Self {
            active: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl SettingsRepository for MockSettingsRepository {
    async fn load_active(&self) -> DomainResult<Option<SettingsSnapshot>> {
        Ok(self.active.lock().unwrap().clone())
    }
}

/// Mock durable-store health probe
#[derive(Default)]
pub struct MockDurableHealth {
    pub healthy: Mutex<bool>,
}

impl MockDurableHealth {
    pub fn healthy() -> Self {
        Self {
            healthy: Mutex::new(true),
        }
    }
}

#[async_trait]
impl DurableHealth for MockDurableHealth {
    async fn ping(&self) -> DomainResult<()> {
        if *self.healthy.lock().unwrap() {
            Ok(())
        } else {
            Err(DomainError::durable_store_unavailable())
        }
    }
}
