//! Handler for POST /sms/receive

use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use sb_core::domain::entities::InboundSms;
use sb_core::repositories::{
    AuditLogRepository, DurableHealth, PendingSmsRepository, PowerDownRepository,
};
use sb_core::services::sync::SyncBackend;
use sb_shared::utils::phone;

use crate::dto::{SmsReceiveRequest, SmsReceiveResponse};
use crate::handlers::error::{error_response, validation_failed};
use crate::state::{AppFastStore, AppState};

/// Accept an inbound SMS from the gateway and run it through the
/// validation pipeline.
///
/// A pipeline rejection is not an HTTP error: the gateway gets a 200 with
/// `status: "failed"` and the rejection is recorded in the audit trail.
/// While the fast store is down the event is captured as a pending row
/// instead and answered with 202; recovery replays it exactly once.
pub async fn receive<S, B, A, P, M, D>(
    state: web::Data<AppState<S, B, A, P, M, D>>,
    request: web::Json<SmsReceiveRequest>,
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

    let message_id = Uuid::new_v4().to_string();
    let sms = InboundSms::new(
        request.mobile_number.clone(),
        request.message.clone(),
        request.received_at.unwrap_or_else(Utc::now),
    );

    if !state.monitor.accepts_requests() {
        return match state.resilience.queue_pending_sms(&sms).await {
            Ok(()) => {
                log::info!(
                    "SMS from {} queued for replay (fallback mode), message_id={}",
                    phone::mask_mobile(&sms.mobile_number),
                    message_id
                );
                HttpResponse::Accepted().json(SmsReceiveResponse {
                    status: "queued".to_string(),
                    message_id,
                })
            }
            Err(error) => {
                log::error!(
                    "Could not queue SMS from {} in fallback mode: {}",
                    phone::mask_mobile(&sms.mobile_number),
                    error
                );
                error_response(&error)
            }
        };
    }

    match state.sms.run_pipeline(&sms).await {
        Ok(report) => {
            let status = if report.accepted { "received" } else { "failed" };
            log::info!(
                "SMS from {} {}, message_id={}",
                phone::mask_mobile(&sms.mobile_number),
                status,
                message_id
            );
            HttpResponse::Ok().json(SmsReceiveResponse {
                status: status.to_string(),
                message_id,
            })
        }
        Err(error) => {
            log::error!(
                "Pipeline failed for SMS from {}: {}",
                phone::mask_mobile(&sms.mobile_number),
                error
            );
            error_response(&error)
        }
    }
}
