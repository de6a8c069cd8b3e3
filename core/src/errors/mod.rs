//! Domain-specific error types and error handling.

mod types;

pub use types::{CredentialError, OnboardingError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A required external dependency (fast store, durable store) is
    /// unreachable or timed out. Triggers the degraded/fallback cycle.
    #[error("Dependency unavailable: {dependency}")]
    DependencyUnavailable { dependency: String },

    /// The external sync backend rejected or never received a delivery
    #[error("Delivery failed: {message}")]
    DeliveryFailed { message: String },

    /// An invariant the storage layer must make structurally impossible
    /// was observed broken. Fatal.
    #[error("Integrity violation: {message}")]
    Integrity { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a fast-store unavailability error
    pub fn fast_store_unavailable() -> Self {
        DomainError::DependencyUnavailable {
            dependency: "fast_store".to_string(),
        }
    }

    /// Shorthand for a durable-store unavailability error
    pub fn durable_store_unavailable() -> Self {
        DomainError::DependencyUnavailable {
            dependency: "durable_store".to_string(),
        }
    }
}
