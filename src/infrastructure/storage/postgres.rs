//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::domain::DomainError;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Open a pool of at most `max_connections` connections, keeping one warm
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DomainError> {
    let pool = pool_options(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| DomainError::storage(format!("Cannot reach the database: {}", e)))?;

    info!(max_connections, "Database pool ready");
    Ok(pool)
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    let max_connections = max_connections.max(1);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_is_never_empty() {
        assert_eq!(pool_options(0).get_max_connections(), 1);
        assert_eq!(pool_options(8).get_max_connections(), 8);
        assert_eq!(pool_options(8).get_min_connections(), 1);
    }
}
