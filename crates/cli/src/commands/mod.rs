//! CLI subcommands.

pub mod migrate;
pub mod seed;

use shop_server::{config::ConfigError, db::RepositoryError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid seed data: {0}")]
    InvalidSeed(#[from] shop_core::PriceError),
}

/// Load configuration and open a pool with the schema up to date.
pub async fn connect() -> Result<sqlx::SqlitePool, CommandError> {
    let config = shop_server::ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = shop_server::db::create_pool(&config.database_url).await?;

    shop_server::db::run_migrations(&pool).await?;
    Ok(pool)
}
