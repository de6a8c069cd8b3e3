//! Handler for GET /health

use actix_web::{web, HttpResponse};
use chrono::Utc;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::resilience::ResilienceState;
use sb_core::services::sync::SyncBackend;
use sb_core::stores::StoreHealth;

use crate::dto::{HealthChecks, HealthResponse};
use crate::state::{AppFastStore, AppState};

/// Report liveness of the fast store, the durable store and the worker
/// loops. Healthy answers 200; degraded or unhealthy answers 503 so load
/// balancers stop routing here.
pub async fn health<S, B, A, P, M, D>(
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
    let mode = state.monitor.state();

    let fast_store = match mode {
        // In fallback/recovery the monitor already knows the store is not
        // serving requests, regardless of what one probe says right now.
        ResilienceState::FallbackActive | ResilienceState::Recovering => "unhealthy",
        _ => match state.store.ping().await {
            Ok(()) => "healthy",
            Err(_) => "unhealthy",
        },
    };

    let durable_store = match state.durable.ping().await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let workers = state.workers.summary();

    let status = if fast_store == "unhealthy" || durable_store == "unhealthy" {
        "unhealthy"
    } else if mode != ResilienceState::Normal || workers != "running" {
        "degraded"
    } else {
        "healthy"
    };

    let body = HealthResponse {
        status: status.to_string(),
        service: "sms-bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: mode.as_str().to_string(),
        timestamp: Utc::now(),
        checks: HealthChecks {
            fast_store: fast_store.to_string(),
            durable_store: durable_store.to_string(),
            workers: workers.to_string(),
        },
    };

    if status == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
