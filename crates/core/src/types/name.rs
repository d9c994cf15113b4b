//! User name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UserName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// The input string is empty.
    #[error("user name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("user name must be shorter than {limit} bytes")]
    TooLong {
        /// Length (in bytes) at which names are rejected.
        limit: usize,
    },
}

/// A user's login name.
///
/// Names are the principal used for HTTP Basic authentication and for
/// ownership checks on orders, so they are compared byte for byte.
///
/// ## Constraints
///
/// - Not empty
/// - Shorter than 255 bytes (the `users.name` column is `VARCHAR(255)`)
///
/// ## Examples
///
/// ```
/// use franklin_core::UserName;
///
/// assert!(UserName::parse("Test User").is_ok());
/// assert!(UserName::parse("").is_err());
/// assert!(UserName::parse(&"x".repeat(255)).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Length (in bytes) from which a name is rejected.
    pub const LENGTH_LIMIT: usize = 255;

    /// Parse a `UserName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or 255 bytes or longer.
    pub fn parse(s: &str) -> Result<Self, UserNameError> {
        if s.is_empty() {
            return Err(UserNameError::Empty);
        }

        if s.len() >= Self::LENGTH_LIMIT {
            return Err(UserNameError::TooLong {
                limit: Self::LENGTH_LIMIT,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `UserName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for UserName {
    type Err = UserNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for UserName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for UserName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for UserName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for UserName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
