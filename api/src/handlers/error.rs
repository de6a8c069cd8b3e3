//! Central mapping from domain errors to HTTP responses
//!
//! Deliberate rejections carry a stable machine-readable code and a
//! specific message. Infrastructure failures collapse into a generic
//! temporarily-unavailable body: a caller in fallback mode learns nothing
//! about which internal dependency failed.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use validator::ValidationErrors;

use sb_core::errors::{CredentialError, DomainError, OnboardingError};

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Map a domain error to its HTTP response
pub fn error_response(error: &DomainError) -> HttpResponse {
    let (status, body) = classify(error);
    HttpResponse::build(status).json(body)
}

/// 400 response for DTO validation failures, naming the offending fields
pub fn validation_failed(errors: &ValidationErrors) -> HttpResponse {
    let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    HttpResponse::BadRequest().json(ErrorBody::new(
        "VALIDATION_ERROR",
        format!("Invalid request fields: {}", fields.join(", ")),
    ))
}

fn classify(error: &DomainError) -> (StatusCode, ErrorBody) {
    match error {
        DomainError::Onboarding(OnboardingError::InvalidMobileFormat) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("INVALID_MOBILE_FORMAT", error.to_string()),
        ),
        DomainError::Onboarding(OnboardingError::CountryNotAllowed) => (
            StatusCode::FORBIDDEN,
            ErrorBody::new("COUNTRY_NOT_ALLOWED", error.to_string()),
        ),
        DomainError::Onboarding(OnboardingError::RateLimitExceeded { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            ErrorBody::new("RATE_LIMIT_EXCEEDED", error.to_string()),
        ),
        DomainError::Onboarding(OnboardingError::MobileBlacklisted) => (
            StatusCode::FORBIDDEN,
            ErrorBody::new("MOBILE_BLOCKED", error.to_string()),
        ),
        // Expired, consumed and never-verified flags are deliberately
        // indistinguishable to the caller.
        DomainError::Credential(CredentialError::NotVerified) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("NOT_VERIFIED", error.to_string()),
        ),
        DomainError::Credential(CredentialError::HashMismatch) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("HASH_MISMATCH", error.to_string()),
        ),
        DomainError::Validation { message } => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("VALIDATION_ERROR", message.clone()),
        ),
        DomainError::NotFound { resource } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{} not found", resource)),
        ),
        DomainError::DependencyUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorBody::new(
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable, please retry later",
            ),
        ),
        DomainError::DeliveryFailed { message } => (
            StatusCode::BAD_GATEWAY,
            ErrorBody::new("DELIVERY_FAILED", message.clone()),
        ),
        DomainError::Integrity { .. } | DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("INTERNAL_ERROR", "Internal server error"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_map_to_specific_codes() {
        let (status, body) = classify(&OnboardingError::CountryNotAllowed.into());
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, "COUNTRY_NOT_ALLOWED");

        let (status, body) = classify(
            &OnboardingError::RateLimitExceeded { count: 6, limit: 5 }.into(),
        );
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.code, "RATE_LIMIT_EXCEEDED");

        let (status, body) = classify(&CredentialError::NotVerified.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "NOT_VERIFIED");
    }

    #[test]
    fn test_infrastructure_failures_stay_generic() {
        let (status, body) = classify(&DomainError::fast_store_unavailable());
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "SERVICE_UNAVAILABLE");
        assert!(!body.message.contains("fast_store"));

        let (status, body) = classify(&DomainError::Internal {
            message: "pool exhausted at 10.0.0.3".to_string(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("10.0.0.3"));
    }
}
