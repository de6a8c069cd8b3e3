//! Handler for POST /onboarding/register

use actix_web::{web, HttpResponse};
use validator::Validate;

use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::sync::SyncBackend;
use sb_shared::utils::phone;

use crate::dto::{RegisterRequest, RegisterResponse};
use crate::handlers::error::{error_response, validation_failed};
use crate::state::{AppFastStore, AppState};

/// Issue (or re-issue) a verification challenge for a mobile number.
///
/// Returns the challenge token, its expiry and the number the user must
/// send the SMS to. While an unexpired challenge exists for the mobile
/// the same token is returned again.
pub async fn register<S, B, A, P, M, D>(
    state: web::Data<AppState<S, B, A, P, M, D>>,
    request: web::Json<RegisterRequest>,
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
        log::warn!(
            "Register request failed validation for {}",
            phone::mask_mobile(&request.mobile_number)
        );
        return validation_failed(&errors);
    }

    match state.onboarding.register(&request.mobile_number).await {
        Ok(grant) => {
            log::info!(
                "Challenge issued for {}",
                phone::mask_mobile(&grant.mobile)
            );
            HttpResponse::Ok().json(RegisterResponse {
                status: "success".to_string(),
                mobile_number: grant.mobile,
                hash: grant.token,
                sms_receiving_number: grant.sms_receiving_number,
                generated_at: grant.generated_at,
                expires_at: grant.expires_at,
            })
        }
        Err(error) => {
            log::warn!(
                "Register rejected for {}: {}",
                phone::mask_mobile(&request.mobile_number),
                error
            );
            error_response(&error)
        }
    }
}
