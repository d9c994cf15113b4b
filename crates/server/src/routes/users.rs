//! User route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;

use franklin_core::{UserId, UserName};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::{GeoPoint, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Sign-up request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub zipcode: Option<i32>,
}

/// Handle sign-up.
///
/// The name is validated before anything is hashed, looked up or stored.
/// When a zip code is given, the closest store's coordinates are saved on the
/// user; a failed lookup aborts the sign-up.
#[tracing::instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Invalid sign-up body");
        AppError::BadRequest("Invalid request payload.".to_owned())
    })?;

    let name = UserName::parse(&request.name).map_err(AuthError::from)?;

    let closest_store = match request.zipcode {
        Some(zipcode) => closest_store(&state, zipcode).await?,
        None => None,
    };

    let user = AuthService::new(state.pool())
        .register(name, &request.password, request.zipcode, closest_store)
        .await?;

    Ok(Json(user))
}

async fn closest_store(state: &AppState, zipcode: i32) -> Result<Option<GeoPoint>> {
    let store = state.store_locator().nearest_store(zipcode).await?;
    let location = store.location();

    if location.is_none() {
        tracing::warn!(zipcode, store = ?store.name, "Nearest store has no coordinates");
    }

    Ok(location)
}

/// Get a user by ID.
#[tracing::instrument(skip(state, _principal))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = id
        .parse()
        .map_err(|_| AppError::BadRequest("User ID is invalid.".to_owned()))?;

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    Ok(Json(user))
}
