//! Main validation pipeline service implementation

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::{AuditEvent, AuditEventKind, Challenge, InboundSms, VerificationFlag};
use crate::errors::DomainResult;
use crate::settings::SettingsHandle;
use crate::stores::{AuditQueueStore, FastStore};

use sb_shared::utils::phone;

use super::checks::{stage_plan, CheckKind, CheckStatus, PipelineReport, StageOutcome};

/// Seam for components that replay SMS events through the pipeline
/// (the resilience manager during recovery).
#[async_trait]
pub trait ProcessSms: Send + Sync {
    async fn process(&self, sms: &InboundSms) -> DomainResult<PipelineReport>;
}

/// Service running the ordered validation pipeline over inbound SMS.
///
/// A rejection is a deliberate pipeline outcome, not an error: the report
/// carries the per-stage vector and the event is audited either way. Only
/// store failures surface as `Err`.
pub struct SmsService<S, Q>
where
    S: FastStore,
    Q: AuditQueueStore,
{
    store: Arc<S>,
    audit: Arc<Q>,
    settings: Arc<SettingsHandle>,
}

impl<S, Q> SmsService<S, Q>
where
    S: FastStore,
    Q: AuditQueueStore,
{
    pub fn new(store: Arc<S>, audit: Arc<Q>, settings: Arc<SettingsHandle>) -> Self {
        Self {
            store,
            audit,
            settings,
        }
    }

    /// Run every enabled stage in order, short-circuiting on the first
    /// failure, then perform the atomic challenge-consume transition when
    /// all enabled stages pass.
    pub async fn run_pipeline(&self, sms: &InboundSms) -> DomainResult<PipelineReport> {
        let cfg = self.settings.current();
        let plan = stage_plan(&cfg.checks);

        let token = extract_token(&sms.message, &cfg.allowed_prefix);
        let mut challenge: Option<Challenge> = None;
        let mut stages = Vec::with_capacity(plan.len());
        let mut failed_stage: Option<CheckKind> = None;

        for (kind, enabled) in plan {
            if failed_stage.is_some() {
                stages.push(StageOutcome::new(kind, CheckStatus::NotEvaluated));
                continue;
            }
            if !enabled {
                stages.push(StageOutcome::new(kind, CheckStatus::Skipped));
                continue;
            }

            let outcome = match kind {
                CheckKind::Format => {
                    check_format(&sms.message, &cfg.allowed_prefix, cfg.token_length)
                }
                CheckKind::Token => match &token {
                    None => Err("Message does not carry a challenge token".to_string()),
                    Some(t) => match self.store.find_challenge(t).await? {
                        Some(found) => {
                            challenge = Some(found);
                            Ok(())
                        }
                        None => Err("Hash not found or expired".to_string()),
                    },
                },
                CheckKind::Country => {
                    if phone::match_country_prefix(&sms.mobile_number, &cfg.allowed_countries)
                        .is_some()
                    {
                        Ok(())
                    } else {
                        Err("Country code not supported".to_string())
                    }
                }
                CheckKind::Count => {
                    let count = self
                        .store
                        .increment_rate(&sms.mobile_number, cfg.rate_window_seconds)
                        .await?;
                    if count > cfg.count_threshold {
                        Err(format!(
                            "Rate limit exceeded ({}/{})",
                            count, cfg.count_threshold
                        ))
                    } else {
                        Ok(())
                    }
                }
                CheckKind::Blacklist => {
                    if self.store.is_blacklisted(&sms.mobile_number).await? {
                        Err("Mobile number is blacklisted".to_string())
                    } else {
                        Ok(())
                    }
                }
            };

            match outcome {
                Ok(()) => stages.push(StageOutcome::new(kind, CheckStatus::Passed)),
                Err(detail) => {
                    failed_stage = Some(kind);
                    stages.push(StageOutcome::failed(kind, detail));
                }
            }
        }

        let accepted = failed_stage.is_none();
        let report = PipelineReport {
            stages,
            accepted,
            failed_stage,
            token: token.clone(),
        };

        if !accepted {
            let failing = failed_stage.map(|kind| kind.as_str()).unwrap_or_default();
            tracing::warn!(
                mobile = %phone::mask_mobile(&sms.mobile_number),
                failed_check = failing,
                event = "sms_rejected",
                "Inbound SMS rejected by validation pipeline"
            );
            self.push_audit(AuditEvent::new(
                AuditEventKind::SmsFailed,
                json!({
                    "mobile": phone::mobile_last4(&sms.mobile_number),
                    "failed_check": failing,
                    "stages": report.stages_json(),
                }),
            ))
            .await;
            return Ok(report);
        }

        // When the token stage was disabled the challenge was never looked
        // up; resolve it now so the transition still consumes it.
        if challenge.is_none() {
            if let Some(t) = &token {
                challenge = self.store.find_challenge(t).await?;
            }
        }

        if let Some(found) = &challenge {
            let flag = VerificationFlag::new(&sms.mobile_number, &found.token);
            self.store
                .consume_challenge(&found.token, &found.mobile, &flag, cfg.verified_ttl_seconds)
                .await?;
        }

        tracing::info!(
            mobile = %phone::mask_mobile(&sms.mobile_number),
            event = "sms_verified",
            "Inbound SMS passed validation pipeline"
        );
        self.push_audit(AuditEvent::new(
            AuditEventKind::SmsVerified,
            json!({
                "mobile": phone::mobile_last4(&sms.mobile_number),
                "hash": token.as_deref().map(|t| &t[..4.min(t.len())]),
                "stages": report.stages_json(),
            }),
        ))
        .await;

        Ok(report)
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

#[async_trait]
impl<S, Q> ProcessSms for SmsService<S, Q>
where
    S: FastStore,
    Q: AuditQueueStore,
{
    async fn process(&self, sms: &InboundSms) -> DomainResult<PipelineReport> {
        self.run_pipeline(sms).await
    }
}

fn extract_token(message: &str, prefix: &str) -> Option<String> {
    message
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.to_string())
}

fn check_format(message: &str, prefix: &str, token_length: usize) -> Result<(), String> {
    let expected = prefix.len() + token_length;
    if message.len() != expected {
        return Err(format!(
            "Invalid message length: expected {}, got {}",
            expected,
            message.len()
        ));
    }
    if !message.starts_with(prefix) {
        return Err(format!("Message must start with '{}'", prefix));
    }
    Ok(())
}
