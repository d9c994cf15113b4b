//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password hashing and credential verification
//! - `guard` - Order ownership checks
//! - `reconcile` - Order line-item reconciliation
//! - `store_locator` - Nearest-store lookup by zip code

pub mod auth;
pub mod guard;
pub mod reconcile;
pub mod store_locator;

pub use auth::{AuthError, AuthService};
pub use guard::AccessError;
pub use reconcile::{OrderReconciler, ReconcileError};
pub use store_locator::{StoreLocatorClient, StoreLocatorError};
