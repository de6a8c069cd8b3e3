//! MySQL implementation of the pending inbound SMS repository
//!
//! While the fast store is down, `/sms/receive` appends rows here instead
//! of running the pipeline. Recovery replays the rows in arrival order and
//! deletes each one after it is processed, so nothing replays twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use sb_core::domain::entities::{InboundSms, PendingSms};
use sb_core::errors::DomainResult;
use sb_core::repositories::PendingSmsRepository;

use super::db_error;

pub struct MySqlPendingSmsRepository {
    pool: MySqlPool,
}

impl MySqlPendingSmsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingSmsRepository for MySqlPendingSmsRepository {
    async fn enqueue(&self, sms: &InboundSms) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_sms (mobile_number, message, received_at, created_at)
            VALUES (?, ?, ?, NOW())
            "#,
        )
        .bind(&sms.mobile_number)
        .bind(&sms.message)
        .bind(sms.received_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("enqueue pending sms", e))?;
        Ok(())
    }

    async fn fetch_all(&self) -> DomainResult<Vec<PendingSms>> {
        let rows = sqlx::query(
            r#"
            SELECT id, mobile_number, message, received_at
            FROM pending_sms
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch pending sms", e))?;

        rows.iter()
            .map(|row| {
                Ok(PendingSms {
                    id: row.try_get("id").map_err(|e| db_error("read id", e))?,
                    sms: InboundSms {
                        mobile_number: row
                            .try_get("mobile_number")
                            .map_err(|e| db_error("read mobile_number", e))?,
                        message: row
                            .try_get("message")
                            .map_err(|e| db_error("read message", e))?,
                        received_at: row
                            .try_get::<DateTime<Utc>, _>("received_at")
                            .map_err(|e| db_error("read received_at", e))?,
                    },
                })
            })
            .collect()
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        sqlx::query("DELETE FROM pending_sms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete pending sms", e))?;
        Ok(())
    }
}
