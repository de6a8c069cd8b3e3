//! Handler for POST /admin/trigger-recovery

use actix_web::{web, HttpResponse};
use chrono::Utc;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::sync::SyncBackend;

use crate::dto::TriggerRecoveryResponse;
use crate::handlers::error::error_response;
use crate::state::{AppFastStore, AppState};

/// Drain the retry queue into one signed batch for the recovery endpoint.
///
/// This is the only path that replays failed deliveries; the hot-path
/// worker never retries on its own. On failure the items are requeued in
/// order and the backend error surfaces as a 502.
pub async fn trigger_recovery<S, B, A, P, M, D>(
    state: web::Data<AppState<S, B, A, P, M, D>>,
) -> HttpResponse
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    let triggered_at = Utc::now();

    match state.sync.drain_retry().await {
        Ok(0) => HttpResponse::Ok().json(TriggerRecoveryResponse {
            status: "success".to_string(),
            triggered_at,
            users_sent: 0,
            message: "No failed users to recover (retry queue is empty)".to_string(),
        }),
        Ok(count) => {
            log::info!("Recovery batch delivered: {} users", count);
            HttpResponse::Ok().json(TriggerRecoveryResponse {
                status: "success".to_string(),
                triggered_at,
                users_sent: count,
                message: format!("Recovery completed: {} users sent to recovery endpoint", count),
            })
        }
        Err(error) => {
            log::error!("Recovery trigger failed: {}", error);
            error_response(&error)
        }
    }
}
