//! Request and response DTOs

pub mod verification;

pub use verification::{
    HealthChecks, HealthResponse, PinSetupRequest, PinSetupResponse, RegisterRequest,
    RegisterResponse, SmsReceiveRequest, SmsReceiveResponse, TriggerRecoveryResponse,
};
