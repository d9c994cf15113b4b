//! User domain types.

use serde::{Deserialize, Serialize};

use franklin_core::{UserId, UserName};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// A registered user. Carries no password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name (also the owner principal on orders).
    pub name: UserName,
    /// Zip code given at signup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<i32>,
    /// Coordinates of the closest store, resolved at signup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_store: Option<GeoPoint>,
}

/// Data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub password_hash: String,
    pub zipcode: Option<i32>,
    pub closest_store: Option<GeoPoint>,
}
