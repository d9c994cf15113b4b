//! Authentication error types.

use thiserror::Error;

use franklin_core::UserNameError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("missing credentials")]
    MissingCredentials,

    /// The `Authorization` header is not valid Basic credentials.
    #[error("malformed authorization header: {0}")]
    MalformedHeader(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The user name cannot be stored.
    #[error("invalid user name: {0}")]
    InvalidUserName(#[from] UserNameError),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
