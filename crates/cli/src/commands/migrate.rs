//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! franklin-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FRANKLIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build time.

use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .map_err(MigrationError::from)?;

    tracing::info!("Migrations complete");
    Ok(())
}
