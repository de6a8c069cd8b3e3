//! Background worker loops
//!
//! Three long-lived tasks share the process with the request handlers:
//! the hot-path sync worker (short interval, one delivery per tick), the
//! cold-path audit worker (long interval, batched archival) and the
//! fast-store health probe that drives the resilience state machine.
//! Each loop owns its own timer; none of them ever blocks a request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::resilience::Transition;
use sb_core::services::sync::SyncBackend;
use sb_core::stores::StoreHealth;

use crate::state::{AppFastStore, AppState};

/// Liveness flags surfaced by the health endpoint
pub struct WorkerStatus {
    sync_running: AtomicBool,
    audit_running: AtomicBool,
    probe_running: AtomicBool,
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self {
            sync_running: AtomicBool::new(false),
            audit_running: AtomicBool::new(false),
            probe_running: AtomicBool::new(false),
        }
    }

    pub fn mark_sync_running(&self) {
        self.sync_running.store(true, Ordering::Relaxed);
    }

    pub fn mark_audit_running(&self) {
        self.audit_running.store(true, Ordering::Relaxed);
    }

    pub fn mark_probe_running(&self) {
        self.probe_running.store(true, Ordering::Relaxed);
    }

    /// "running" once every loop has started, "starting" before that
    pub fn summary(&self) -> &'static str {
        let all = self.sync_running.load(Ordering::Relaxed)
            && self.audit_running.load(Ordering::Relaxed)
            && self.probe_running.load(Ordering::Relaxed);
        if all {
            "running"
        } else {
            "starting"
        }
    }
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the three worker loops. Intervals come from the settings
/// snapshot taken at spawn time.
pub fn spawn_workers<S, B, A, P, M, D>(state: &AppState<S, B, A, P, M, D>)
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    let cfg = state.settings.current();

    // Hot-path sync worker: one queued credential per tick
    {
        let sync = state.sync.clone();
        let monitor = state.monitor.clone();
        let status = state.workers.clone();
        let interval = Duration::from_secs(cfg.sync_interval_seconds.max(1));
        tokio::spawn(async move {
            status.mark_sync_running();
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !monitor.accepts_requests() {
                    continue;
                }
                if let Err(e) = sync.tick().await {
                    log::warn!("Sync worker tick failed: {}", e);
                }
            }
        });
    }

    // Cold-path audit worker: batched archival to the durable store
    {
        let audit = state.audit.clone();
        let monitor = state.monitor.clone();
        let status = state.workers.clone();
        let interval = Duration::from_secs(cfg.audit_interval_seconds.max(1));
        let batch_size = cfg.audit_batch_size;
        tokio::spawn(async move {
            status.mark_audit_running();
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !monitor.accepts_requests() {
                    continue;
                }
                // Failures leave events buffered for the next tick
                if let Err(e) = audit.flush(batch_size).await {
                    log::warn!("Audit worker flush failed: {}", e);
                }
            }
        });
    }

    // Health probe: drives Normal -> Degraded -> FallbackActive ->
    // Recovering -> Normal
    {
        let store = state.store.clone();
        let monitor = state.monitor.clone();
        let resilience = state.resilience.clone();
        let sms = state.sms.clone();
        let status = state.workers.clone();
        let interval = Duration::from_secs(cfg.probe_interval_seconds.max(1));
        tokio::spawn(async move {
            status.mark_probe_running();
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let transition = match store.ping().await {
                    Ok(()) => monitor.record_success(),
                    Err(e) => {
                        log::warn!("Fast-store probe failed: {}", e);
                        monitor.record_failure()
                    }
                };
                match transition {
                    Some(Transition::EnterFallback) => {
                        log::error!("Entering fallback mode: dumping fast-store state");
                        resilience.enter_fallback().await;
                    }
                    Some(Transition::BeginRecovery) => {
                        log::info!("Fast store recovered: replaying dumped state");
                        if let Err(e) = resilience.recover(sms.as_ref()).await {
                            log::error!("Recovery failed, staying in fallback mode: {}", e);
                        }
                    }
                    None => {}
                }
            }
        });
    }

    log::info!(
        "Workers spawned (sync every {}s, audit every {}s, probe every {}s)",
        cfg.sync_interval_seconds.max(1),
        cfg.audit_interval_seconds.max(1),
        cfg.probe_interval_seconds.max(1)
    );
}
