//! Authentication service.
//!
//! Stateless password authentication: every protected request carries the
//! user's name and password, which are checked against the stored Argon2 hash.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use franklin_core::{UserName, UserNameError};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{GeoPoint, NewUser, User};

/// Hash checked when the user does not exist, so an unknown name takes as
/// long to reject as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("franklin-dummy-password").ok());

/// Authentication service.
///
/// Handles user registration and credential verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// `closest_store` is whatever the store lookup resolved for `zipcode`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the name is already registered.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    /// Returns `AuthError::Repository` for other database errors.
    pub async fn register(
        &self,
        name: UserName,
        password: &str,
        zipcode: Option<i32>,
        closest_store: Option<GeoPoint>,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password)?;

        let new_user = NewUser {
            name,
            password_hash,
            zipcode,
            closest_store,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Verify a name/password pair and return the matching user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUserName` if the name is too long to exist.
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password is wrong.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn verify_credentials(&self, name: &str, password: &str) -> Result<User, AuthError> {
        let name = match UserName::parse(name) {
            Ok(name) => name,
            Err(UserNameError::Empty) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&name).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Hash a password with Argon2id and a random salt (PHC string format).
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
