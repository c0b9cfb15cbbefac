//! Database connectivity - pool configuration and setup

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{OrmError, OrmResult};

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a connection before failing
    pub acquire_timeout: u64,
    /// Seconds an idle connection may linger, if any
    pub idle_timeout: Option<u64>,
    /// Seconds a connection may live in total, if capped
    pub max_lifetime: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600),
            max_lifetime: Some(1800),
        }
    }
}

/// Open a connection pool against the given database URL
pub async fn connect(database_url: &str, config: PoolConfig) -> OrmResult<PgPool> {
    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout));
    if let Some(idle) = config.idle_timeout {
        options = options.idle_timeout(Duration::from_secs(idle));
    }
    if let Some(lifetime) = config.max_lifetime {
        options = options.max_lifetime(Duration::from_secs(lifetime));
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(|e| OrmError::Connection(format!("failed to open pool: {}", e)))?;
    tracing::debug!(
        max_connections = config.max_connections,
        "database pool established"
    );
    Ok(pool)
}
