//! Shared fixtures for route tests
//!
//! Routes are exercised against the in-memory fast store and the mock
//! repositories from the core crate, so every test drives the real
//! services end to end without external dependencies.

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;

use sb_api::state::AppState;
use sb_core::domain::entities::SyncItem;
use sb_core::repositories::mock::{
    MockAuditLogRepository, MockDurableHealth, MockPendingSmsRepository, MockPowerDownRepository,
};
use sb_core::services::resilience::HealthMonitor;
use sb_core::services::sync::SyncBackend;
use sb_core::settings::{SettingsHandle, SettingsSnapshot};
use sb_core::stores::MemoryFastStore;

pub const MOBILE: &str = "+919876543210";

/// Backend stub recording deliveries and batches
pub struct TestBackend {
    pub delivered: Mutex<Vec<SyncItem>>,
    pub batches: Mutex<Vec<Vec<SyncItem>>>,
    pub should_fail: Mutex<bool>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            should_fail: Mutex::new(false),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock().unwrap() = fail;
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl SyncBackend for TestBackend {
    async fn deliver(&self, item: &SyncItem) -> Result<(), String> {
        if *self.should_fail.lock().unwrap() {
            return Err("connection refused".to_string());
        }
        self.delivered.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn deliver_recovery_batch(&self, items: &[SyncItem]) -> Result<(), String> {
        if *self.should_fail.lock().unwrap() {
            return Err("connection refused".to_string());
        }
        self.batches.lock().unwrap().push(items.to_vec());
        Ok(())
    }
}

pub type TestState = AppState<
    MemoryFastStore,
    TestBackend,
    MockAuditLogRepository,
    MockPowerDownRepository,
    MockPendingSmsRepository,
    MockDurableHealth,
>;

/// Handles the tests poke at directly
pub struct TestHarness {
    pub state: web::Data<TestState>,
    pub store: Arc<MemoryFastStore>,
    pub backend: Arc<TestBackend>,
    pub pending: Arc<MockPendingSmsRepository>,
    pub monitor: Arc<HealthMonitor>,
}

pub fn test_settings() -> SettingsSnapshot {
    let mut snapshot = SettingsSnapshot::default();
    snapshot.hmac_secret = "route-test-secret".to_string();
    snapshot.sms_receiver_number = "+918800001111".to_string();
    snapshot
}

pub fn build_harness(snapshot: SettingsSnapshot) -> TestHarness {
    let store = Arc::new(MemoryFastStore::new());
    let backend = Arc::new(TestBackend::new());
    let pending = Arc::new(MockPendingSmsRepository::new());
    let monitor = Arc::new(HealthMonitor::new(
        snapshot.probe_failure_threshold,
        snapshot.probe_recovery_threshold,
    ));

    let state = web::Data::new(AppState::new(
        store.clone(),
        backend.clone(),
        Arc::new(MockAuditLogRepository::new()),
        Arc::new(MockPowerDownRepository::new()),
        pending.clone(),
        Arc::new(MockDurableHealth::healthy()),
        Arc::new(SettingsHandle::new(snapshot)),
        monitor.clone(),
    ));

    // Workers are not spawned in route tests; report them as running so
    // /health reflects steady state.
    state.workers.mark_sync_running();
    state.workers.mark_audit_running();
    state.workers.mark_probe_running();

    TestHarness {
        state,
        store,
        backend,
        pending,
        monitor,
    }
}

/// Drive the monitor into fallback mode the way the probe would
pub fn force_fallback(monitor: &HealthMonitor) {
    for _ in 0..10 {
        if monitor.record_failure().is_some() {
            break;
        }
    }
}
