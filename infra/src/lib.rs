//! # Infrastructure Layer
//!
//! Concrete implementations of the storage and delivery seams the core
//! crate defines as traits:
//!
//! - **Cache**: Redis implementations of the fast-store traits (challenges,
//!   verification flags, rate counters, blacklist set, queues, the health
//!   probe and the power-down snapshot).
//! - **Database**: MySQL implementations of the durable repositories using
//!   SQLx (audit log, credential backups, power-down records, blacklist,
//!   pending SMS, settings history).
//! - **Sync**: reqwest-based delivery to the external credential backend.
//!
//! Every external call carries an explicit timeout; a timeout is treated
//! exactly like a hard failure of that dependency.

pub mod cache;
pub mod database;
pub mod sync;

use sb_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Durable store error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Fast store error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for the external sync backend
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// An external call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(_) => DomainError::fast_store_unavailable(),
            InfrastructureError::Database(_) => DomainError::durable_store_unavailable(),
            // A timeout against either store is indistinguishable from the
            // store being down; the caller classifies by operation.
            InfrastructureError::Timeout(message) => DomainError::DependencyUnavailable {
                dependency: message,
            },
            InfrastructureError::Http(e) => DomainError::DeliveryFailed {
                message: e.to_string(),
            },
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}
