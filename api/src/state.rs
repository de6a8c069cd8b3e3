//! Shared application state
//!
//! One [`AppState`] instance is built at startup and handed to every
//! request handler and worker loop via `web::Data`. The state is generic
//! over the storage seams so route tests can run against the in-memory
//! store and mock repositories.

use std::sync::Arc;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::audit::AuditService;
use sb_core::services::credential::CredentialService;
use sb_core::services::onboarding::OnboardingService;
use sb_core::services::pipeline::SmsService;
use sb_core::services::resilience::{HealthMonitor, ResilienceService};
use sb_core::services::sync::{SyncBackend, SyncService};
use sb_core::settings::SettingsHandle;
use sb_core::stores::{
    AuditQueueStore, FastStore, SnapshotStore, StoreHealth, SyncQueueStore,
};

use crate::workers::WorkerStatus;

/// Everything the HTTP surface needs from the fast store, in one type
pub trait AppFastStore:
    FastStore + SyncQueueStore + AuditQueueStore + SnapshotStore + StoreHealth + 'static
{
}

impl<T> AppFastStore for T where
    T: FastStore + SyncQueueStore + AuditQueueStore + SnapshotStore + StoreHealth + 'static
{
}

/// Shared services and handles for request handlers and workers
pub struct AppState<S, B, A, P, M, D>
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    pub onboarding: OnboardingService<S, S>,
    pub sms: Arc<SmsService<S, S>>,
    pub credential: CredentialService<S, S>,
    pub sync: Arc<SyncService<S, B, S>>,
    pub audit: Arc<AuditService<S, A>>,
    pub resilience: Arc<ResilienceService<S, P, M, A>>,
    pub monitor: Arc<HealthMonitor>,
    pub store: Arc<S>,
    pub durable: Arc<D>,
    pub settings: Arc<SettingsHandle>,
    pub workers: Arc<WorkerStatus>,
}

impl<S, B, A, P, M, D> AppState<S, B, A, P, M, D>
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<S>,
        backend: Arc<B>,
        audit_log: Arc<A>,
        power_down: Arc<P>,
        pending: Arc<M>,
        durable: Arc<D>,
        settings: Arc<SettingsHandle>,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        let sms = Arc::new(SmsService::new(
            store.clone(),
            store.clone(),
            settings.clone(),
        ));
        Self {
            onboarding: OnboardingService::new(
                store.clone(),
                store.clone(),
                settings.clone(),
                monitor.clone(),
            ),
            sms,
            credential: CredentialService::new(
                store.clone(),
                store.clone(),
                settings.clone(),
                monitor.clone(),
            ),
            sync: Arc::new(SyncService::new(store.clone(), backend, store.clone())),
            audit: Arc::new(AuditService::new(store.clone(), audit_log.clone())),
            resilience: Arc::new(ResilienceService::new(
                store.clone(),
                power_down,
                pending,
                audit_log,
                monitor.clone(),
            )),
            monitor,
            store,
            durable,
            settings,
            workers: Arc::new(WorkerStatus::new()),
        }
    }
}
