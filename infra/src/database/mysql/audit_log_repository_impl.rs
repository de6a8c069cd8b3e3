//! MySQL implementation of the audit log repository
//!
//! Events land in the append-only `sms_bridge_logs` table; credential
//! backups upsert into `backup_users` keyed by (mobile, hash). Both writes
//! share one transaction so the caller can trim the fast-store buffer the
//! moment this returns. The worker delivers at-least-once: a replayed
//! batch appends duplicate log rows (harmless in an append-only log) and
//! re-upserts identical backup rows.

use async_trait::async_trait;
use sqlx::MySqlPool;

use sb_core::domain::entities::{AuditEvent, BackupCredential};
use sb_core::errors::DomainResult;
use sb_core::repositories::AuditLogRepository;

use super::db_error;

pub struct MySqlAuditLogRepository {
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn archive_batch(
        &self,
        events: &[AuditEvent],
        backups: &[BackupCredential],
    ) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin archive transaction", e))?;

        for event in events {
            let details = serde_json::to_string(&event.details).map_err(|e| {
                sb_core::errors::DomainError::Internal {
                    message: format!("Failed to serialize audit details: {}", e),
                }
            })?;

            sqlx::query(
                r#"
                INSERT INTO sms_bridge_logs (event, details, created_at)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(event.event.as_str())
            .bind(details)
            .bind(event.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert audit event", e))?;
        }

        for backup in backups {
            sqlx::query(
                r#"
                INSERT INTO backup_users (mobile, pin, hash, created_at)
                VALUES (?, ?, ?, NOW())
                ON DUPLICATE KEY UPDATE pin = VALUES(pin)
                "#,
            )
            .bind(&backup.mobile)
            .bind(&backup.pin_hash)
            .bind(&backup.token)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("upsert credential backup", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit archive transaction", e))?;

        Ok(())
    }
}
