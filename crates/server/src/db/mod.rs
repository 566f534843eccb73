//! Database operations for the shop row store (`SQLite`).
//!
//! ## Tables
//!
//! - `products` - id, name, price, image reference
//! - `users` - id, name, latitude, longitude, `is_card`, cart (comma-separated ids)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/`. They run on server
//! startup and can be run explicitly via:
//! ```bash
//! cargo run -p shop-cli -- migrate
//! ```
//!
//! Every value reaches SQL as a bound parameter. The only SQL text assembled at
//! runtime is the `SET` list of an update, built from [`Column`] names.

pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::planner::{Column, ColumnValue, UpdatePlan};

pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Turn an affected-row count into `RepositoryError::NotFound` when it is zero.
///
/// A zero count after a successful fetch means the row was deleted between
/// the read and the write. That is reported as not found, never as success.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if `rows_affected == 0`.
pub const fn ensure_affected(rows_affected: u64) -> Result<u64, RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(rows_affected)
}

/// Create a `SQLite` connection pool, creating the database file if missing.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(database_url.expose_secret())?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a pool over a private in-memory database.
///
/// The pool holds exactly one connection that never expires, since every
/// `SQLite` in-memory connection is its own database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Execute an [`UpdatePlan`] as a single parameterized `UPDATE`.
///
/// Returns the number of affected rows. Zero means the row vanished after the
/// caller fetched it.
pub(crate) async fn execute_update<C: Column>(
    pool: &SqlitePool,
    plan: &UpdatePlan<C>,
) -> Result<u64, RepositoryError> {
    let mut builder = update_query(plan);
    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

fn update_query<C: Column>(plan: &UpdatePlan<C>) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(C::TABLE).push(" SET ");

    let mut set = builder.separated(", ");
    for (column, value) in plan.assignments() {
        set.push(column.name());
        set.push_unseparated(" = ");
        match value {
            ColumnValue::Text(text) => set.push_bind_unseparated(text.clone()),
            ColumnValue::Integer(int) => set.push_bind_unseparated(*int),
            ColumnValue::Real(real) => set.push_bind_unseparated(*real),
            ColumnValue::Bool(flag) => set.push_bind_unseparated(*flag),
        };
    }

    builder.push(" WHERE id = ").push_bind(plan.id());
    builder
}
