//! Handler for POST /pin-setup

use actix_web::{web, HttpResponse};
use validator::Validate;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::sync::SyncBackend;
use sb_shared::utils::phone;

use crate::dto::{PinSetupRequest, PinSetupResponse};
use crate::handlers::error::{error_response, validation_failed};
use crate::state::{AppFastStore, AppState};

/// Bind a submitted PIN to a verified mobile number.
///
/// The verification flag is one-time use: a second submission with the
/// same token is rejected exactly like a never-verified number.
pub async fn pin_setup<S, B, A, P, M, D>(
    state: web::Data<AppState<S, B, A, P, M, D>>,
    request: web::Json<PinSetupRequest>,
) -> HttpResponse
where
    S: AppFastStore,
    B: SyncBackend + 'static,
    A: AuditLogRepository + 'static,
    P: PowerDownRepository + 'static,
    M: PendingSmsRepository + 'static,
    D: DurableHealth + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_failed(&errors);
    }

    match state
        .credential
        .submit(&request.mobile_number, &request.pin, &request.hash)
        .await
    {
        Ok(()) => {
            log::info!(
                "Credential accepted for {}",
                phone::mask_mobile(&request.mobile_number)
            );
            HttpResponse::Ok().json(PinSetupResponse {
                status: "success".to_string(),
                message: "PIN accepted, account creation in progress".to_string(),
            })
        }
        Err(error) => {
            log::warn!(
                "Credential rejected for {}: {}",
                phone::mask_mobile(&request.mobile_number),
                error
            );
            error_response(&error)
        }
    }
}
