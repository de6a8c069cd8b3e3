//! Application factory
//!
//! Wires the route table, CORS and request logging around a shared
//! [`AppState`]. Generic over the storage seams so tests build the same
//! app against the in-memory store.

use actix_web::{middleware::Logger, web, App, HttpResponse};

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::sync::SyncBackend;

use crate::middleware::cors::create_cors;
use crate::routes::{admin, health, onboarding, pin, sms};
use crate::state::{AppFastStore, AppState};

/// Create the actix application with every route mounted
pub fn create_app<S, B, A, P, M, D>(
    app_state: web::Data<AppState<S, B, A, P, M, D>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    App::new()
        .app_data(app_state)
        .wrap(Logger::default())
        .wrap(create_cors())
        .route(
            "/onboarding/register",
            web::post().to(onboarding::register::<S, B, A, P, M, D>),
        )
        .route("/sms/receive", web::post().to(sms::receive::<S, B, A, P, M, D>))
        .route("/pin-setup", web::post().to(pin::pin_setup::<S, B, A, P, M, D>))
        .route("/health", web::get().to(health::health::<S, B, A, P, M, D>))
        .route(
            "/admin/trigger-recovery",
            web::post().to(admin::trigger_recovery::<S, B, A, P, M, D>),
        )
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "status": "error",
        "code": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
