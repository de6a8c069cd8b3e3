//! Wire types for the verification endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Mobile number in E.164 format, e.g. "+919876543210"
    #[validate(length(min = 8, max = 16))]
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    pub mobile_number: String,
    /// The challenge token the user must send back via SMS
    pub hash: String,
    /// Number the SMS must be sent to
    pub sms_receiving_number: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SmsReceiveRequest {
    /// Sender mobile number as reported by the gateway
    #[validate(length(min = 8, max = 16))]
    pub mobile_number: String,

    /// Raw message body, e.g. "ONBOARD:A3B7K2M9"
    #[validate(length(min = 1, max = 160))]
    pub message: String,

    /// Gateway receipt time; defaults to now when omitted
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsReceiveResponse {
    /// "received" when processed, "failed" when rejected by the pipeline,
    /// "queued" when captured for replay in fallback mode
    pub status: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PinSetupRequest {
    #[validate(length(min = 8, max = 16))]
    pub mobile_number: String,

    /// The user's chosen secret
    #[validate(length(min = 4, max = 12))]
    pub pin: String,

    /// The challenge token from onboarding
    #[validate(length(min = 4, max = 32))]
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinSetupResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecoveryResponse {
    pub status: String,
    pub triggered_at: DateTime<Utc>,
    /// Retry-queue items delivered in the batch
    pub users_sent: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub fast_store: String,
    pub durable_store: String,
    pub workers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Resilience-manager operating mode
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}
