//! Migrate command - manages the PostgreSQL schema

use clap::Subcommand;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    connect_pool, course_market_migrations, Migrator, PostgresMigrator,
};

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the most recently applied migration
    Down,
    /// Print the current schema version
    Status,
}

/// Run a migration action against `storage.database_url`
pub async fn run(action: MigrateAction) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let database_url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url must be set to run migrations"))?;

    let pool = connect_pool(database_url, 1).await?;
    let migrator = PostgresMigrator::new(pool, course_market_migrations());

    match action {
        MigrateAction::Up => {
            let applied = migrator.run().await?;
            info!(applied, "Migrations applied");
        }
        MigrateAction::Down => match migrator.revert().await? {
            Some(version) => info!(version, "Migration reverted"),
            None => info!("No migrations to revert"),
        },
        MigrateAction::Status => match migrator.version().await? {
            Some(version) => info!(version, "Current schema version"),
            None => info!("No migrations applied"),
        },
    }

    Ok(())
}
