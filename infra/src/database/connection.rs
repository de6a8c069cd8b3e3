//! Database connection pool management
//!
//! A bounded SQLx MySQL pool shared process-wide by request handlers and
//! the background workers. Acquire carries its own timeout, so a saturated
//! pool surfaces as a failure instead of a hang.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use tracing::log::LevelFilter;

use sb_core::errors::{DomainError, DomainResult};
use sb_core::repositories::DurableHealth;
use sb_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Durable-store connection pool wrapper
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Create a new bounded connection pool
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            max_connections = config.max_connections,
            event = "db_pool_creating",
            "Creating database connection pool"
        );

        let connect_options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_secs(1));

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    event = "db_pool_failed",
                    "Failed to create database pool"
                );
                InfrastructureError::Database(e)
            })?;

        tracing::info!(event = "db_pool_created", "Database connection pool created");

        Ok(Self { pool })
    }

    /// The underlying SQLx pool, for queries and transactions
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Verify connectivity with a trivial query
    pub async fn health_check(&self) -> Result<(), InfrastructureError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;
        Ok(())
    }

    /// Close all connections, for shutdown
    pub async fn close(&self) {
        tracing::info!(event = "db_pool_closing", "Closing database connection pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl DurableHealth for DatabasePool {
    async fn ping(&self) -> DomainResult<()> {
        self.health_check().await.map_err(DomainError::from)
    }
}
