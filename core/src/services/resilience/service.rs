//! Dump and replay orchestration around fast-store outages

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{AuditEvent, AuditEventKind, InboundSms};
use crate::errors::DomainResult;
use crate::repositories::{AuditLogRepository, PendingSmsRepository, PowerDownRepository};
use crate::services::pipeline::ProcessSms;
use crate::stores::SnapshotStore;

use super::monitor::HealthMonitor;

/// What a completed recovery replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecoveryOutcome {
    /// Fast-store keys restored from power-down records
    pub restored_keys: usize,
    /// Pending SMS rows replayed through the pipeline
    pub replayed_sms: usize,
}

/// Orchestrates the power-down dump, the fallback SMS queue and the
/// recovery replay.
///
/// Fallback/recovery transitions are written straight to the durable
/// audit log: the fast-store buffer is unusable exactly when they happen.
pub struct ResilienceService<S, P, M, A>
where
    S: SnapshotStore,
    P: PowerDownRepository,
    M: PendingSmsRepository,
    A: AuditLogRepository,
{
    snapshot: Arc<S>,
    power_down: Arc<P>,
    pending: Arc<M>,
    audit_log: Arc<A>,
    monitor: Arc<HealthMonitor>,
}

impl<S, P, M, A> ResilienceService<S, P, M, A>
where
    S: SnapshotStore,
    P: PowerDownRepository,
    M: PendingSmsRepository,
    A: AuditLogRepository,
{
    pub fn new(
        snapshot: Arc<S>,
        power_down: Arc<P>,
        pending: Arc<M>,
        audit_log: Arc<A>,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        Self {
            snapshot,
            power_down,
            pending,
            audit_log,
            monitor,
        }
    }

    pub fn monitor(&self) -> Arc<HealthMonitor> {
        self.monitor.clone()
    }

    /// Dump unexpired challenge and verification state into the durable
    /// store. Best-effort: the trigger condition implies the store may be
    /// partially unresponsive, so each key is captured independently and
    /// a completely failed scan still leaves fallback mode active.
    pub async fn enter_fallback(&self) {
        match self.snapshot.dump_state().await {
            Ok(dump) => {
                for (key, error) in &dump.failed_keys {
                    tracing::warn!(
                        key = %key,
                        error = %error,
                        event = "power_down_key_failed",
                        "Could not capture fast-store key during dump"
                    );
                }
                if dump.records.is_empty() {
                    tracing::info!(
                        event = "power_down_dump_empty",
                        "No live fast-store state to dump"
                    );
                } else if let Err(e) = self.power_down.save_records(&dump.records).await {
                    tracing::error!(
                        error = %e,
                        event = "power_down_save_failed",
                        "Failed to persist power-down records"
                    );
                } else {
                    tracing::info!(
                        saved = dump.records.len(),
                        failed = dump.failed_keys.len(),
                        event = "power_down_dump_saved",
                        "Dumped fast-store state to durable store"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event = "power_down_dump_failed",
                    "Fast-store scan failed entirely during dump"
                );
            }
        }

        self.audit_direct(AuditEvent::new(
            AuditEventKind::FallbackEntered,
            json!({}),
        ))
        .await;
    }

    /// Append an inbound SMS to the durable pending queue while the fast
    /// store is unavailable.
    pub async fn queue_pending_sms(&self, sms: &InboundSms) -> DomainResult<()> {
        self.pending.enqueue(sms).await
    }

    /// Replay power-down records into the fast store, then replay every
    /// pending SMS through the normal pipeline, then return to normal.
    ///
    /// Any failure aborts the replay and drops back to fallback mode; the
    /// durable rows survive for the next attempt, and rows are deleted
    /// one by one as they replay so nothing is processed twice.
    pub async fn recover<R: ProcessSms>(&self, processor: &R) -> DomainResult<RecoveryOutcome> {
        match self.try_recover(processor).await {
            Ok(outcome) => {
                self.monitor.mark_recovered();
                tracing::info!(
                    restored_keys = outcome.restored_keys,
                    replayed_sms = outcome.replayed_sms,
                    event = "fallback_recovered",
                    "Recovery complete; back to normal mode"
                );
                self.audit_direct(AuditEvent::new(
                    AuditEventKind::FallbackRecovered,
                    json!({
                        "restored_keys": outcome.restored_keys,
                        "replayed_sms": outcome.replayed_sms,
                    }),
                ))
                .await;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event = "recovery_aborted",
                    "Recovery failed; staying in fallback mode"
                );
                self.monitor.abort_recovery();
                Err(e)
            }
        }
    }

    async fn try_recover<R: ProcessSms>(&self, processor: &R) -> DomainResult<RecoveryOutcome> {
        let mut outcome = RecoveryOutcome::default();

        let records = self.power_down.load_records().await?;
        if !records.is_empty() {
            self.snapshot.restore_state(&records).await?;
            self.power_down.clear().await?;
            outcome.restored_keys = records.len();
        }

        for pending in self.pending.fetch_all().await? {
            processor.process(&pending.sms).await?;
            self.pending.delete(pending.id).await?;
            outcome.replayed_sms += 1;
        }

        Ok(outcome)
    }

    // Transition events bypass the fast-store buffer
    async fn audit_direct(&self, event: AuditEvent) {
        if let Err(e) = self.audit_log.archive_batch(&[event], &[]).await {
            tracing::warn!(
                error = %e,
                event = "audit_direct_failed",
                "Failed to write transition event to durable log"
            );
        }
    }
}

/// Startup-time replay of records left over from a previous run.
///
/// Mirrors the recovery path but runs before workers start, so it takes
/// the repositories directly.
pub async fn restore_on_startup<S, P>(snapshot: &S, power_down: &P) -> DomainResult<usize>
where
    S: SnapshotStore,
    P: PowerDownRepository,
{
    let records = power_down.load_records().await?;
    if records.is_empty() {
        return Ok(0);
    }
    snapshot.restore_state(&records).await?;
    power_down.clear().await?;
    tracing::info!(
        restored = records.len(),
        event = "startup_restore",
        "Restored fast-store keys from power-down records"
    );
    Ok(records.len())
}
