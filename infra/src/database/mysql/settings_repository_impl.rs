//! MySQL implementation of the settings history repository
//!
//! `settings_history` is append-only; exactly one row is flagged active.
//! The payload column holds the JSON settings document, deserialized into
//! a [`SettingsSnapshot`] whose version is the row id.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use sb_core::errors::{DomainError, DomainResult};
use sb_core::repositories::SettingsRepository;
use sb_core::settings::SettingsSnapshot;

use super::db_error;

pub struct MySqlSettingsRepository {
    pool: MySqlPool,
}

impl MySqlSettingsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for MySqlSettingsRepository {
    async fn load_active(&self) -> DomainResult<Option<SettingsSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT version_id, CAST(payload AS CHAR) AS payload
            FROM settings_history
            WHERE is_active = TRUE
            ORDER BY version_id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("load active settings", e))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let version_id: i64 = row
            .try_get("version_id")
            .map_err(|e| db_error("read version_id", e))?;
        let payload: String = row
            .try_get("payload")
            .map_err(|e| db_error("read payload", e))?;

        let mut snapshot: SettingsSnapshot =
            serde_json::from_str(&payload).map_err(|e| DomainError::Internal {
                message: format!("Malformed settings payload (version {}): {}", version_id, e),
            })?;
        snapshot.version = version_id;

        Ok(Some(snapshot))
    }
}
