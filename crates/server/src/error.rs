//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"error": "<message>"}`; server-side failures are captured to Sentry
//! before responding and never leak their details to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::guard::AccessError;
use crate::services::reconcile::ReconcileError;
use crate::services::store_locator::StoreLocatorError;

/// Message for every failure the client cannot act on.
const INTERNAL_MESSAGE: &str = "Internal server error.";

/// Message for a user name that cannot exist.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "username/password is invalid.";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order reconciliation failed.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Store lookup failed.
    #[error("Store locator error: {0}")]
    StoreLocator(#[from] StoreLocatorError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// The principal may not perform this operation.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Turn an ownership failure into a response error, using `not_found` as
    /// the message for reads.
    #[must_use]
    pub const fn access(err: AccessError, not_found: &'static str) -> Self {
        match err {
            AccessError::NotFound => Self::NotFound(not_found),
            AccessError::Forbidden => Self::Forbidden,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) | RepositoryError::InvalidReference(_) => {
                    StatusCode::BAD_REQUEST
                }
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials
                | AuthError::MalformedHeader(_)
                | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidUserName(_) | AuthError::UserAlreadyExists => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Reconcile(err) => match err {
                ReconcileError::OrderNotFound => StatusCode::NOT_FOUND,
                ReconcileError::Repository(RepositoryError::InvalidReference(_)) => {
                    StatusCode::BAD_REQUEST
                }
                ReconcileError::Mismatch { .. } | ReconcileError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::StoreLocator(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found.".to_owned(),
                RepositoryError::Conflict(_) => "Conflicting request.".to_owned(),
                RepositoryError::InvalidReference(_) => "Item ID is invalid.".to_owned(),
                _ => INTERNAL_MESSAGE.to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials
                | AuthError::MalformedHeader(_)
                | AuthError::InvalidCredentials => "Unauthorized.".to_owned(),
                AuthError::InvalidUserName(_) => INVALID_CREDENTIALS_MESSAGE.to_owned(),
                AuthError::UserAlreadyExists => "User name is already taken.".to_owned(),
                _ => INTERNAL_MESSAGE.to_owned(),
            },
            Self::Reconcile(err) => match err {
                ReconcileError::OrderNotFound => "Order not found.".to_owned(),
                ReconcileError::Repository(RepositoryError::InvalidReference(_)) => {
                    "Item ID is invalid.".to_owned()
                }
                _ => INTERNAL_MESSAGE.to_owned(),
            },
            Self::NotFound(message) => (*message).to_owned(),
            Self::Forbidden => "Forbidden.".to_owned(),
            Self::BadRequest(message) => message.clone(),
            Self::StoreLocator(_) | Self::Internal(_) => INTERNAL_MESSAGE.to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated principal.
pub fn set_sentry_user(user_id: &impl ToString, name: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(name.to_owned()),
            ..Default::default()
        }));
    });
}
