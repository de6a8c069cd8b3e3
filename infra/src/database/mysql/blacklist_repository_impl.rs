//! MySQL implementation of the authoritative blacklist repository
//!
//! `blacklist_mobiles` is the one table the fast store never owns: the
//! Redis set is rebuilt from these rows on every startup and after every
//! administrative mutation.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use sb_core::errors::DomainResult;
use sb_core::repositories::BlacklistRepository;

use super::db_error;

pub struct MySqlBlacklistRepository {
    pool: MySqlPool,
}

impl MySqlBlacklistRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for MySqlBlacklistRepository {
    async fn all_mobiles(&self) -> DomainResult<Vec<String>> {
        let rows = sqlx::query("SELECT mobile FROM blacklist_mobiles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("load blacklist", e))?;

        rows.iter()
            .map(|row| row.try_get("mobile").map_err(|e| db_error("read mobile", e)))
            .collect()
    }
}
