//! HTTP Basic authentication extractor.
//!
//! There are no sessions: every protected request re-presents the user's
//! name and password in the `Authorization` header.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{AppError, set_sentry_user};
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Name and password from an `Authorization: Basic` header.
#[derive(PartialEq, Eq)]
pub struct BasicCredentials {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Read Basic credentials from request headers.
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` if there is no `Authorization` header.
/// Returns `AuthError::MalformedHeader` if it is not valid Basic credentials.
pub fn parse_basic_auth(headers: &HeaderMap) -> Result<BasicCredentials, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("non-ASCII header".to_owned()))?;

    let (scheme, encoded) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::MalformedHeader("missing scheme".to_owned()))?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::MalformedHeader(format!("unsupported scheme {scheme}")));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::MalformedHeader(e.to_string()))?;
    let decoded =
        String::from_utf8(decoded).map_err(|e| AuthError::MalformedHeader(e.to_string()))?;

    let (name, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedHeader("missing ':' separator".to_owned()))?;

    Ok(BasicCredentials {
        name: name.to_owned(),
        password: password.to_owned(),
    })
}

/// Extractor that requires valid Basic credentials.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = parse_basic_auth(&parts.headers)?;

        let user = AuthService::new(state.pool())
            .verify_credentials(&credentials.name, &credentials.password)
            .await?;

        set_sentry_user(&user.id, user.name.as_str());

        Ok(Self(user))
    }
}
