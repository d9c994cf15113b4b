//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the database named by `FRANKLIN_DATABASE_URL` (or `DATABASE_URL`).
///
/// # Errors
///
/// Returns an error if neither variable is set or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("FRANKLIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "FRANKLIN_DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    let pool = franklin_server::db::create_pool(&database_url).await?;

    Ok(pool)
}
