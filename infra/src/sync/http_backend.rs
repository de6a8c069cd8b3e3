//! HTTP delivery to the external credential backend
//!
//! Single items go to the sync endpoint as plain JSON; the administrative
//! recovery trigger sends the whole retry backlog as one HMAC-signed batch
//! to the recovery endpoint. Every request carries a client-level timeout,
//! and a timeout is reported exactly like any other delivery failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use tracing::debug;

use sb_core::domain::entities::SyncItem;
use sb_core::services::sync::SyncBackend;
use sb_core::settings::SettingsHandle;

use crate::InfrastructureError;

type HmacSha256 = Hmac<Sha256>;

/// Timeout for single-item deliveries
const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the recovery batch, which can carry many items
const RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-based [`SyncBackend`]
pub struct HttpSyncBackend {
    client: reqwest::Client,
    settings: Arc<SettingsHandle>,
}

impl HttpSyncBackend {
    pub fn new(settings: Arc<SettingsHandle>) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(SYNC_TIMEOUT)
            .build()
            .map_err(InfrastructureError::Http)?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl SyncBackend for HttpSyncBackend {
    async fn deliver(&self, item: &SyncItem) -> Result<(), String> {
        let cfg = self.settings.current();
        if cfg.sync_url.is_empty() {
            return Err("Sync URL not configured".to_string());
        }

        let response = self
            .client
            .post(&cfg.sync_url)
            .json(item)
            .send()
            .await
            .map_err(|e| format!("Sync request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Sync endpoint returned {}", response.status()));
        }

        debug!(url = %cfg.sync_url, "Delivered sync item");
        Ok(())
    }

    async fn deliver_recovery_batch(&self, items: &[SyncItem]) -> Result<(), String> {
        let cfg = self.settings.current();
        if cfg.recovery_url.is_empty() {
            return Err("Recovery URL not configured".to_string());
        }

        let mut payload = json!({
            "users": items,
            "batch_size": items.len(),
            "triggered_at": Utc::now().to_rfc3339(),
            "triggered_by": "admin",
        });

        if !cfg.hmac_secret.is_empty() {
            let signature = sign_payload(&payload, &cfg.hmac_secret);
            payload["signature"] = json!(signature);
        }

        let response = self
            .client
            .post(&cfg.recovery_url)
            .timeout(RECOVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Recovery request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Recovery endpoint returned {}", response.status()));
        }

        debug!(
            url = %cfg.recovery_url,
            batch_size = items.len(),
            "Delivered recovery batch"
        );
        Ok(())
    }
}

/// Hex HMAC-SHA256 over the serialized payload.
///
/// `serde_json` maps are ordered by key, so the serialized form is
/// canonical and the receiver can verify against the same encoding.
fn sign_payload(payload: &serde_json::Value, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic() {
        let payload = json!({"users": [], "batch_size": 0});
        let a = sign_payload(&payload, "secret");
        let b = sign_payload(&payload, "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_varies_with_secret_and_payload() {
        let payload = json!({"batch_size": 1});
        let base = sign_payload(&payload, "secret");
        assert_ne!(base, sign_payload(&payload, "other"));
        assert_ne!(base, sign_payload(&json!({"batch_size": 2}), "secret"));
    }
}
