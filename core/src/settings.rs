//! Versioned runtime settings
//!
//! Runtime-tunable settings live in the durable store as an append-only
//! history of JSON payloads; the active row is loaded into an immutable
//! [`SettingsSnapshot`] at startup. Concurrent readers always observe a
//! complete snapshot: the [`SettingsHandle`] swaps the whole `Arc` and
//! never mutates a published snapshot in place.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Enable/disable flags for the validation pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_true")]
    pub format_check_enabled: bool,
    #[serde(default = "default_true")]
    pub token_check_enabled: bool,
    #[serde(default = "default_true")]
    pub country_check_enabled: bool,
    #[serde(default = "default_true")]
    pub count_check_enabled: bool,
    #[serde(default = "default_true")]
    pub blacklist_check_enabled: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            format_check_enabled: true,
            token_check_enabled: true,
            country_check_enabled: true,
            count_check_enabled: true,
            blacklist_check_enabled: true,
        }
    }
}

/// Immutable runtime settings snapshot.
///
/// One snapshot is the unit of consistency: a request or worker invocation
/// clones the `Arc` once and reads every field from the same version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Version id of the settings-history row this snapshot came from
    #[serde(default)]
    pub version: i64,

    /// Number the user is instructed to send the SMS to
    #[serde(default)]
    pub sms_receiver_number: String,

    /// Required SMS prefix, e.g. "ONBOARD:"
    #[serde(default = "default_prefix")]
    pub allowed_prefix: String,

    /// Challenge token length in characters
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// TTL for challenge keys in seconds
    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_seconds: u64,

    /// TTL for verification flags in seconds
    #[serde(default = "default_verified_ttl")]
    pub verified_ttl_seconds: u64,

    /// Rolling rate-limit window in seconds
    #[serde(default = "default_rate_window")]
    pub rate_window_seconds: u64,

    /// Maximum attempts per mobile within the rate window
    #[serde(default = "default_count_threshold")]
    pub count_threshold: i64,

    /// Allowed country prefixes, e.g. ["+91", "+44"]
    #[serde(default = "default_countries")]
    pub allowed_countries: Vec<String>,

    /// Endpoint receiving verified credential payloads
    #[serde(default)]
    pub sync_url: String,

    /// Endpoint receiving the signed recovery batch
    #[serde(default)]
    pub recovery_url: String,

    /// Secret key for the challenge-token PRF and batch signatures
    #[serde(default)]
    pub hmac_secret: String,

    /// Hot-path sync worker interval in seconds
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,

    /// Cold-path audit worker interval in seconds
    #[serde(default = "default_audit_interval")]
    pub audit_interval_seconds: u64,

    /// Maximum audit events archived per worker tick
    #[serde(default = "default_audit_batch")]
    pub audit_batch_size: usize,

    /// Fast-store health probe interval in seconds
    #[serde(default = "default_probe_interval")]
    pub probe_interval_seconds: u64,

    /// Consecutive probe failures before entering fallback mode
    #[serde(default = "default_probe_threshold")]
    pub probe_failure_threshold: u32,

    /// Consecutive probe successes before starting recovery
    #[serde(default = "default_probe_threshold")]
    pub probe_recovery_threshold: u32,

    /// Pipeline stage toggles
    #[serde(default)]
    pub checks: ChecksConfig,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            version: 0,
            sms_receiver_number: String::new(),
            allowed_prefix: default_prefix(),
            token_length: default_token_length(),
            challenge_ttl_seconds: default_challenge_ttl(),
            verified_ttl_seconds: default_verified_ttl(),
            rate_window_seconds: default_rate_window(),
            count_threshold: default_count_threshold(),
            allowed_countries: default_countries(),
            sync_url: String::new(),
            recovery_url: String::new(),
            hmac_secret: String::new(),
            sync_interval_seconds: default_sync_interval(),
            audit_interval_seconds: default_audit_interval(),
            audit_batch_size: default_audit_batch(),
            probe_interval_seconds: default_probe_interval(),
            probe_failure_threshold: default_probe_threshold(),
            probe_recovery_threshold: default_probe_threshold(),
            checks: ChecksConfig::default(),
        }
    }
}

/// Atomically swapped handle to the current settings snapshot
pub struct SettingsHandle {
    current: RwLock<Arc<SettingsSnapshot>>,
}

impl SettingsHandle {
    pub fn new(snapshot: SettingsSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Get the current snapshot. The returned `Arc` stays valid and
    /// unchanged even if the handle is swapped afterwards.
    pub fn current(&self) -> Arc<SettingsSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish a new snapshot for subsequent readers
    pub fn replace(&self, snapshot: SettingsSnapshot) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(SettingsSnapshot::default())
    }
}

fn default_true() -> bool {
    true
}

fn default_prefix() -> String {
    "ONBOARD:".to_string()
}

fn default_token_length() -> usize {
    8
}

fn default_challenge_ttl() -> u64 {
    900
}

fn default_verified_ttl() -> u64 {
    900
}

fn default_rate_window() -> u64 {
    3600
}

fn default_count_threshold() -> i64 {
    5
}

fn default_countries() -> Vec<String> {
    vec!["+91".to_string(), "+44".to_string()]
}

fn default_sync_interval() -> u64 {
    1
}

fn default_audit_interval() -> u64 {
    120
}

fn default_audit_batch() -> usize {
    100
}

fn default_probe_interval() -> u64 {
    5
}

fn default_probe_threshold() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let snapshot = SettingsSnapshot::default();
        assert_eq!(snapshot.allowed_prefix, "ONBOARD:");
        assert_eq!(snapshot.token_length, 8);
        assert_eq!(snapshot.count_threshold, 5);
        assert!(snapshot.checks.token_check_enabled);
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let snapshot: SettingsSnapshot =
            serde_json::from_str(r#"{"sms_receiver_number": "+918800001111"}"#).unwrap();
        assert_eq!(snapshot.sms_receiver_number, "+918800001111");
        assert_eq!(snapshot.challenge_ttl_seconds, 900);
        assert!(snapshot.checks.blacklist_check_enabled);
    }

    #[test]
    fn test_handle_swap_keeps_old_snapshot_alive() {
        let handle = SettingsHandle::new(SettingsSnapshot::default());
        let before = handle.current();

        let mut next = SettingsSnapshot::default();
        next.version = 2;
        next.count_threshold = 10;
        handle.replace(next);

        // The previously obtained snapshot is untouched by the swap
        assert_eq!(before.count_threshold, 5);
        assert_eq!(handle.current().count_threshold, 10);
        assert_eq!(handle.current().version, 2);
    }
}
