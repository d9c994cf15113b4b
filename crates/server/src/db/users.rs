//! User repository for database operations.

use sqlx::PgPool;

use franklin_core::{UserId, UserName};

use super::RepositoryError;
use crate::models::user::{GeoPoint, NewUser, User};

/// Row shape shared by every `users` query that returns a [`User`].
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: UserName,
    zip: Option<i32>,
    store_lat: Option<f64>,
    store_lon: Option<f64>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let closest_store = match (row.store_lat, row.store_lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            zipcode: row.zip,
            closest_store,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, zip, store_lat, store_lon
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Create a new user from an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, password, zip, store_lat, store_lon)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, zip, store_lat, store_lon
            ",
        )
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.zipcode)
        .bind(new_user.closest_store.map(|p| p.lat))
        .bind(new_user.closest_store.map(|p| p.lon))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user name already exists"))?;

        Ok(row.into())
    }

    /// Get a user together with their stored password hash.
    ///
    /// Returns `None` if no user has this name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        name: &UserName,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, name, zip, store_lat, store_lon, password
            FROM users
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user.into(), r.password)))
    }
}
