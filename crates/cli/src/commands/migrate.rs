//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! server crate at build time. The server applies them on startup as well;
//! this command exists for deploys that migrate before rolling out.

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Running migrations...");
    let pool = connect().await?;
    pool.close().await;

    tracing::info!("Migrations complete!");
    Ok(())
}
