//! Operation-specific error types
//!
//! These errors represent deliberate rejections on the request path. The
//! presentation layer maps each variant to a stable error code and HTTP
//! status; infrastructure failures never reach these types.

use thiserror::Error;

/// Challenge-issuance rejections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OnboardingError {
    #[error("Invalid mobile number format")]
    InvalidMobileFormat,

    #[error("Country not supported")]
    CountryNotAllowed,

    #[error("Rate limit exceeded ({count}/{limit})")]
    RateLimitExceeded { count: i64, limit: i64 },

    #[error("Mobile number is blocked")]
    MobileBlacklisted,
}

/// Credential-submission rejections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CredentialError {
    /// No live verification flag for the mobile. Covers never-verified,
    /// already-consumed, and expired flags identically.
    #[error("Mobile not verified")]
    NotVerified,

    #[error("Hash mismatch")]
    HashMismatch,
}
