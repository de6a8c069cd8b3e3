//! Main credential submission service implementation

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use serde_json::json;

use crate::domain::entities::{AuditEvent, AuditEventKind, SyncItem};
use crate::errors::{CredentialError, DomainError, DomainResult};
use crate::services::onboarding::{hash_pin, is_valid_token_format};
use crate::services::resilience::HealthMonitor;
use crate::settings::SettingsHandle;
use crate::stores::{AuditQueueStore, VerificationStore};

use sb_shared::utils::phone;

/// Service binding a submitted credential to a verified mobile number.
///
/// The verification flag is one-time use: the sync item is enqueued and
/// the flag deleted in the same store transaction, so a second submission
/// with the same token fails exactly like a never-verified number.
pub struct CredentialService<S, Q>
where
    S: VerificationStore,
    Q: AuditQueueStore,
{
    store: Arc<S>,
    audit: Arc<Q>,
    settings: Arc<SettingsHandle>,
    monitor: Arc<HealthMonitor>,
}

impl<S, Q> CredentialService<S, Q>
where
    S: VerificationStore,
    Q: AuditQueueStore,
{
    pub fn new(
        store: Arc<S>,
        audit: Arc<Q>,
        settings: Arc<SettingsHandle>,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        Self {
            store,
            audit,
            settings,
            monitor,
        }
    }

    /// Accept a credential for a verified mobile and queue it for backend
    /// delivery.
    pub async fn submit(&self, mobile: &str, pin: &str, token: &str) -> DomainResult<()> {
        if !self.monitor.accepts_requests() {
            return Err(DomainError::fast_store_unavailable());
        }

        let cfg = self.settings.current();
        let normalized = phone::normalize_mobile(mobile);

        if !is_valid_token_format(token, cfg.token_length) {
            tracing::warn!(
                mobile = %phone::mask_mobile(&normalized),
                event = "credential_malformed_hash",
                "Credential submitted with malformed hash"
            );
            return Err(CredentialError::HashMismatch.into());
        }

        let flag = match self.store.find_flag(&normalized).await? {
            Some(flag) => flag,
            None => {
                tracing::warn!(
                    mobile = %phone::mask_mobile(&normalized),
                    event = "credential_not_verified",
                    "Credential submitted for unverified mobile"
                );
                return Err(CredentialError::NotVerified.into());
            }
        };

        if !constant_time_eq(flag.token.as_bytes(), token.as_bytes()) {
            tracing::warn!(
                mobile = %phone::mask_mobile(&normalized),
                event = "credential_hash_mismatch",
                "Credential submitted with mismatching hash"
            );
            return Err(CredentialError::HashMismatch.into());
        }

        let item = SyncItem::new(normalized.clone(), pin, token);
        self.store.consume_flag(&normalized, &item).await?;

        tracing::info!(
            mobile = %phone::mask_mobile(&normalized),
            event = "credential_collected",
            "Credential accepted and queued for sync"
        );

        // The full mobile and hashed secret travel in the event details:
        // the cold-path worker derives the backup row from them.
        let pin_hash = hash_pin(pin, &format!("{}{}", normalized, token));
        self.push_audit(AuditEvent::new(
            AuditEventKind::PinCollected,
            json!({
                "mobile": normalized,
                "pin_hash": pin_hash,
                "hash": token,
            }),
        ))
        .await;

        Ok(())
    }

    // Audit buffering is best-effort on the request path
    async fn push_audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.push_event(&event).await {
            tracing::warn!(
                error = %e,
                event = "audit_buffer_failed",
                "Failed to buffer audit event"
            );
        }
    }
}
