//! Power-down record entity capturing fast-store state across outages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value type of a dumped fast-store key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredKeyKind {
    String,
    Set,
    List,
}

impl StoredKeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoredKeyKind::String => "string",
            StoredKeyKind::Set => "set",
            StoredKeyKind::List => "list",
        }
    }
}

/// One fast-store key captured at the moment a store failure was detected.
///
/// Replayed into the fast store with its original remaining TTL during
/// recovery, then deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerDownRecord {
    /// Original fast-store key name
    pub key_name: String,
    /// Value type of the key
    pub key_type: StoredKeyKind,
    /// Raw stored value
    pub value: String,
    /// Remaining TTL in seconds at dump time; `None` for keys without expiry
    pub original_ttl: Option<i64>,
    /// When the dump captured this key
    pub created_at: DateTime<Utc>,
}

impl PowerDownRecord {
    /// Capture a plain string key
    pub fn string_key(
        key_name: impl Into<String>,
        value: impl Into<String>,
        original_ttl: Option<i64>,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            key_type: StoredKeyKind::String,
            value: value.into(),
            original_ttl,
            created_at: Utc::now(),
        }
    }
}
