//! PostgreSQL pool for the account store
//!
//! Pool sizing and timings come from [`DatabaseConfig`]; an idle timeout or
//! max lifetime of zero disables that limit.

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Reported to the server as `application_name`
const APPLICATION_NAME: &str = "bank-api";

fn limit(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Pool options derived from the database section of the config
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(limit(config.idle_timeout_secs))
        .max_lifetime(limit(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// Connect to the configured database
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options =
        PgConnectOptions::from_str(&config.url)?.application_name(APPLICATION_NAME);

    let pool = pool_options(config).connect_with(connect_options).await?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool created"
    );
    Ok(pool)
}

/// Round-trip a trivial query
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!(error = %e, "Database health check failed");
            e
        })
}
