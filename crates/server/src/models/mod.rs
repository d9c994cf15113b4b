//! Domain models for the API.
//!
//! These are the shapes returned to clients. Database row types live next to
//! the queries in [`crate::db`].

pub mod order;
pub mod user;

pub use order::{Item, LineItem, Order};
pub use user::{GeoPoint, NewUser, User};
