//! Trait for external sync backend integration

use async_trait::async_trait;

use crate::domain::entities::SyncItem;

/// Delivery to the external backend.
///
/// Implementations must bound every call with a timeout; a timeout is
/// indistinguishable from any other delivery failure to the caller.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Deliver one verified credential payload
    async fn deliver(&self, item: &SyncItem) -> Result<(), String>;

    /// Deliver the signed recovery batch to the recovery endpoint
    async fn deliver_recovery_batch(&self, items: &[SyncItem]) -> Result<(), String>;
}
