//! Unit tests for fallback dump, pending replay and recovery

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::{Challenge, InboundSms};
use crate::repositories::mock::{
    MockAuditLogRepository, MockPendingSmsRepository, MockPowerDownRepository,
};
use crate::services::pipeline::SmsService;
use crate::services::resilience::{restore_on_startup, HealthMonitor, ResilienceService};
use crate::settings::{SettingsHandle, SettingsSnapshot};
use crate::stores::{ChallengeStore, MemoryFastStore};

const MOBILE: &str = "+919876543210";
const TOKEN: &str = "A3B7K2M9";

struct Fixture {
    store: Arc<MemoryFastStore>,
    power_down: Arc<MockPowerDownRepository>,
    pending: Arc<MockPendingSmsRepository>,
    audit_log: Arc<MockAuditLogRepository>,
    monitor: Arc<HealthMonitor>,
    service: ResilienceService<
        MemoryFastStore,
        MockPowerDownRepository,
        MockPendingSmsRepository,
        MockAuditLogRepository,
    >,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryFastStore::new());
    let power_down = Arc::new(MockPowerDownRepository::new());
    let pending = Arc::new(MockPendingSmsRepository::new());
    let audit_log = Arc::new(MockAuditLogRepository::new());
    let monitor = Arc::new(HealthMonitor::new(1, 1));
    let service = ResilienceService::new(
        store.clone(),
        power_down.clone(),
        pending.clone(),
        audit_log.clone(),
        monitor.clone(),
    );
    Fixture {
        store,
        power_down,
        pending,
        audit_log,
        monitor,
        service,
    }
}

fn pipeline(store: Arc<MemoryFastStore>) -> SmsService<MemoryFastStore, MemoryFastStore> {
    let mut snapshot = SettingsSnapshot::default();
    snapshot.hmac_secret = "test-secret".to_string();
    SmsService::new(store.clone(), store, Arc::new(SettingsHandle::new(snapshot)))
}

async fn seed_challenge(store: &MemoryFastStore) {
    let challenge = Challenge::new(MOBILE, TOKEN, Utc::now(), 900);
    store.put_challenge(&challenge, 900).await.unwrap();
}

#[tokio::test]
async fn test_enter_fallback_dumps_live_state() {
    let f = fixture();
    seed_challenge(&f.store).await;

    f.service.enter_fallback().await;

    let stored = f.power_down.stored();
    // The challenge key and its mobile reverse index were both captured
    assert!(stored
        .iter()
        .any(|r| r.key_name == format!("challenge:{}", TOKEN)));
    assert!(stored
        .iter()
        .any(|r| r.key_name == format!("challenge_mobile:{}", MOBILE)));

    // The transition bypassed the fast-store buffer
    let archived = f.audit_log.archived_events();
    assert_eq!(archived.last().unwrap().event.as_str(), "FALLBACK_ENTERED");
}

#[tokio::test]
async fn test_enter_fallback_survives_a_dead_store() {
    let f = fixture();
    f.store.set_unavailable(true);

    // Dump is best-effort: a completely failed scan is logged, fallback
    // mode stays on, and the entry is still audited
    f.service.enter_fallback().await;

    assert!(f.power_down.stored().is_empty());
    let archived = f.audit_log.archived_events();
    assert_eq!(archived.last().unwrap().event.as_str(), "FALLBACK_ENTERED");
}

#[tokio::test]
async fn test_recover_replays_dump_and_pending_sms() {
    let f = fixture();
    seed_challenge(&f.store).await;

    f.monitor.record_failure();
    f.service.enter_fallback().await;
    // Simulate the outage wiping the store
    f.store.expire_challenge(TOKEN);
    assert_eq!(f.store.challenge_count(), 0);

    // An SMS arrives during the outage and is queued durably
    let sms = InboundSms::new(MOBILE, "ONBOARD:A3B7K2M9", Utc::now());
    f.service.queue_pending_sms(&sms).await.unwrap();
    assert_eq!(f.pending.row_count(), 1);

    f.monitor.record_success();
    let processor = pipeline(f.store.clone());
    let outcome = f.service.recover(&processor).await.unwrap();

    // The challenge came back from the dump, then the replayed SMS
    // consumed it through the normal pipeline
    assert!(outcome.restored_keys >= 2);
    assert_eq!(outcome.replayed_sms, 1);
    assert_eq!(f.store.challenge_count(), 0);
    assert!(f.store.flag_for(MOBILE).is_some());

    // Replayed rows are gone: nothing can be processed twice
    assert_eq!(f.pending.row_count(), 0);
    assert!(f.power_down.stored().is_empty());
    assert!(f.monitor.accepts_requests());

    let archived = f.audit_log.archived_events();
    assert_eq!(
        archived.last().unwrap().event.as_str(),
        "FALLBACK_RECOVERED"
    );
}

#[tokio::test]
async fn test_recover_failure_stays_in_fallback() {
    let f = fixture();
    seed_challenge(&f.store).await;
    f.monitor.record_failure();
    f.service.enter_fallback().await;

    // The store is still down when recovery is attempted
    f.store.set_unavailable(true);
    f.monitor.record_success();
    let processor = pipeline(f.store.clone());
    assert!(f.service.recover(&processor).await.is_err());

    assert!(!f.monitor.accepts_requests());
    // The dump survives for the next attempt
    assert!(!f.power_down.stored().is_empty());

    f.store.set_unavailable(false);
    f.monitor.record_success();
    let outcome = f.service.recover(&processor).await.unwrap();
    assert!(outcome.restored_keys >= 2);
    assert!(f.monitor.accepts_requests());
}

#[tokio::test]
async fn test_pending_sms_replayed_exactly_once() {
    let f = fixture();
    seed_challenge(&f.store).await;
    f.monitor.record_failure();

    let sms = InboundSms::new(MOBILE, "ONBOARD:A3B7K2M9", Utc::now());
    f.service.queue_pending_sms(&sms).await.unwrap();

    f.monitor.record_success();
    let processor = pipeline(f.store.clone());
    f.service.recover(&processor).await.unwrap();
    assert!(f.store.flag_for(MOBILE).is_some());

    // A second recovery cycle finds nothing left to replay
    f.monitor.record_failure();
    f.monitor.record_success();
    let outcome = f.service.recover(&processor).await.unwrap();
    assert_eq!(outcome.replayed_sms, 0);
    assert_eq!(outcome.restored_keys, 0);
}

#[tokio::test]
async fn test_startup_restore_replays_leftover_records() {
    let f = fixture();
    seed_challenge(&f.store).await;
    f.service.enter_fallback().await;
    let dumped = f.power_down.stored().len();
    f.store.expire_challenge(TOKEN);

    // A process restart replays what the previous run dumped
    let restored = restore_on_startup(f.store.as_ref(), f.power_down.as_ref())
        .await
        .unwrap();
    assert_eq!(restored, dumped);
    assert_eq!(f.store.challenge_count(), 1);
    assert!(f.power_down.stored().is_empty());
}

#[tokio::test]
async fn test_startup_restore_with_no_records_is_noop() {
    let f = fixture();
    let restored = restore_on_startup(f.store.as_ref(), f.power_down.as_ref())
        .await
        .unwrap();
    assert_eq!(restored, 0);
}
