//! MySQL repository implementations
//!
//! One implementation per durable-store repository trait. All writes that
//! must land together run inside a single transaction; reads use plain
//! queries against the shared pool.

pub mod audit_log_repository_impl;
pub mod blacklist_repository_impl;
pub mod pending_sms_repository_impl;
pub mod power_down_repository_impl;
pub mod settings_repository_impl;

pub use audit_log_repository_impl::MySqlAuditLogRepository;
pub use blacklist_repository_impl::MySqlBlacklistRepository;
pub use pending_sms_repository_impl::MySqlPendingSmsRepository;
pub use power_down_repository_impl::MySqlPowerDownRepository;
pub use settings_repository_impl::MySqlSettingsRepository;

use sb_core::errors::DomainError;

/// Classify a SQLx error: connectivity problems feed the dependency
/// taxonomy, everything else is internal.
pub(crate) fn db_error(context: &str, error: sqlx::Error) -> DomainError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::error!(
                context = context,
                event = "durable_store_unreachable",
                "Durable store unreachable"
            );
            DomainError::durable_store_unavailable()
        }
        other => DomainError::Internal {
            message: format!("{}: {}", context, other),
        },
    }
}
