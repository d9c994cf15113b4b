//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! franklin-cli user create -n "Test User" -p correct-password
//! ```
//!
//! Passwords are hashed exactly as the server hashes them at sign-up. No
//! store lookup is made, so the user has no closest store.

use franklin_core::UserName;
use franklin_server::services::AuthService;

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the name is invalid or taken, or the database is unreachable.
pub async fn create(
    name: &str,
    password: &str,
    zipcode: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = UserName::parse(name)?;
    let pool = super::connect().await?;

    let user = AuthService::new(&pool)
        .register(name, password, zipcode, None)
        .await?;

    tracing::info!(user_id = %user.id, name = %user.name, "User created");
    Ok(())
}
