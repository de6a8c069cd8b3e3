//! Main challenge issuance service implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{AuditEvent, AuditEventKind, Challenge};
use crate::errors::{DomainError, DomainResult, OnboardingError};
use crate::services::resilience::HealthMonitor;
use crate::settings::SettingsHandle;
use crate::stores::{AuditQueueStore, BlacklistStore, ChallengeStore, RateLimitStore};

use sb_shared::utils::phone;

use super::hash;

/// Result of a successful challenge issuance
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeGrant {
    /// Normalized mobile number the challenge was issued for
    pub mobile: String,
    /// The token the user must echo back
    pub token: String,
    /// Number the user must send the SMS to
    pub sms_receiving_number: String,
    /// When the token was generated
    pub generated_at: DateTime<Utc>,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Service issuing verification challenges for mobile numbers.
///
/// Issuance is idempotent per mobile: while an unexpired challenge exists
/// the same token is returned again with its remaining expiry, so an SMS
/// the user already sent is never silently invalidated.
pub struct OnboardingService<S, Q>
where
    S: ChallengeStore + RateLimitStore + BlacklistStore,
    Q: AuditQueueStore,
{
    store: Arc<S>,
    audit: Arc<Q>,
    settings: Arc<SettingsHandle>,
    monitor: Arc<HealthMonitor>,
}

impl<S, Q> OnboardingService<S, Q>
where
    S: ChallengeStore + RateLimitStore + BlacklistStore,
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

    /// Issue (or re-issue) a challenge for a mobile number.
    ///
    /// Pipeline: format validation, country allow-list, rate limit,
    /// blacklist, then idempotent token issuance.
    pub async fn register(&self, mobile: &str) -> DomainResult<ChallengeGrant> {
        if !self.monitor.accepts_requests() {
            return Err(DomainError::fast_store_unavailable());
        }

        let cfg = self.settings.current();

        let normalized = phone::normalize_mobile(mobile);
        if !phone::is_valid_mobile(&normalized) {
            tracing::warn!(
                mobile = %phone::mask_mobile(mobile),
                event = "register_invalid_mobile",
                "Rejected registration with invalid mobile format"
            );
            return Err(OnboardingError::InvalidMobileFormat.into());
        }

        if cfg.checks.country_check_enabled
            && phone::match_country_prefix(&normalized, &cfg.allowed_countries).is_none()
        {
            tracing::warn!(
                mobile = %phone::mask_mobile(&normalized),
                event = "register_country_rejected",
                "Rejected registration from unsupported country"
            );
            return Err(OnboardingError::CountryNotAllowed.into());
        }

        if cfg.checks.count_check_enabled {
            let count = self
                .store
                .increment_rate(&normalized, cfg.rate_window_seconds)
                .await?;
            if count > cfg.count_threshold {
                tracing::warn!(
                    mobile = %phone::mask_mobile(&normalized),
                    count = count,
                    threshold = cfg.count_threshold,
                    event = "register_rate_limited",
                    "Registration rate limit exceeded"
                );
                return Err(OnboardingError::RateLimitExceeded {
                    count,
                    limit: cfg.count_threshold,
                }
                .into());
            }
        }

        if cfg.checks.blacklist_check_enabled && self.store.is_blacklisted(&normalized).await? {
            tracing::warn!(
                mobile = %phone::mask_mobile(&normalized),
                event = "register_blacklisted",
                "Rejected registration from blacklisted mobile"
            );
            return Err(OnboardingError::MobileBlacklisted.into());
        }

        // Idempotent reuse: a live challenge keeps its token until it
        // expires or is consumed.
        if let Some(token) = self.store.active_token_for(&normalized).await? {
            if let Some(existing) = self.store.find_challenge(&token).await? {
                if !existing.is_expired() {
                    tracing::info!(
                        mobile = %phone::mask_mobile(&normalized),
                        event = "challenge_reused",
                        "Returning existing unexpired challenge"
                    );
                    return Ok(self.grant_from(&cfg.sms_receiver_number, existing));
                }
            }
        }

        let issued_at = Utc::now();
        let token = hash::derive_token(&cfg.hmac_secret, &normalized, issued_at, cfg.token_length);
        let challenge = Challenge::new(
            normalized.clone(),
            token.clone(),
            issued_at,
            cfg.challenge_ttl_seconds,
        );

        self.store
            .put_challenge(&challenge, cfg.challenge_ttl_seconds)
            .await?;

        tracing::info!(
            mobile = %phone::mask_mobile(&normalized),
            event = "challenge_issued",
            "Issued new verification challenge"
        );

        self.push_audit(AuditEvent::new(
            AuditEventKind::HashGenerated,
            json!({
                "mobile": phone::mobile_last4(&normalized),
                "hash": &token[..4.min(token.len())],
            }),
        ))
        .await;

        Ok(self.grant_from(&cfg.sms_receiver_number, challenge))
    }

    fn grant_from(&self, receiver: &str, challenge: Challenge) -> ChallengeGrant {
        ChallengeGrant {
            mobile: challenge.mobile,
            token: challenge.token,
            sms_receiving_number: receiver.to_string(),
            generated_at: challenge.issued_at,
            expires_at: challenge.expires_at,
        }
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
