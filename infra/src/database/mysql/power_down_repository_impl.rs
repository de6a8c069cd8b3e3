//! MySQL implementation of the power-down record repository
//!
//! Rows in `power_down_store` are keyed by the original fast-store key
//! name, so re-dumping the same key during repeated fallback entries
//! overwrites the stale capture instead of duplicating it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use sb_core::domain::entities::{PowerDownRecord, StoredKeyKind};
use sb_core::errors::{DomainError, DomainResult};
use sb_core::repositories::PowerDownRepository;

use super::db_error;

pub struct MySqlPowerDownRepository {
    pool: MySqlPool,
}

impl MySqlPowerDownRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PowerDownRepository for MySqlPowerDownRepository {
    async fn save_records(&self, records: &[PowerDownRecord]) -> DomainResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin power-down save", e))?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO power_down_store (key_name, key_type, value, original_ttl, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    key_type = VALUES(key_type),
                    value = VALUES(value),
                    original_ttl = VALUES(original_ttl),
                    created_at = VALUES(created_at)
                "#,
            )
            .bind(&record.key_name)
            .bind(record.key_type.as_str())
            .bind(&record.value)
            .bind(record.original_ttl)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("upsert power-down record", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit power-down save", e))?;

        Ok(())
    }

    async fn load_records(&self) -> DomainResult<Vec<PowerDownRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT key_name, key_type, value, original_ttl, created_at
            FROM power_down_store
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load power-down records", e))?;

        rows.iter()
            .map(|row| {
                let key_type: String = row
                    .try_get("key_type")
                    .map_err(|e| db_error("read key_type", e))?;
                let key_type = match key_type.as_str() {
                    "string" => StoredKeyKind::String,
                    "set" => StoredKeyKind::Set,
                    "list" => StoredKeyKind::List,
                    other => {
                        return Err(DomainError::Internal {
                            message: format!("Unknown power-down key type: {}", other),
                        })
                    }
                };

                Ok(PowerDownRecord {
                    key_name: row
                        .try_get("key_name")
                        .map_err(|e| db_error("read key_name", e))?,
                    key_type,
                    value: row.try_get("value").map_err(|e| db_error("read value", e))?,
                    original_ttl: row
                        .try_get("original_ttl")
                        .map_err(|e| db_error("read original_ttl", e))?,
                    created_at: row
                        .try_get::<DateTime<Utc>, _>("created_at")
                        .map_err(|e| db_error("read created_at", e))?,
                })
            })
            .collect()
    }

    async fn clear(&self) -> DomainResult<()> {
        sqlx::query("DELETE FROM power_down_store")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("clear power-down records", e))?;
        Ok(())
    }
}
