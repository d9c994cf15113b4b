//! Ownership checks for orders.
//!
//! Writes answer `Forbidden` when the order belongs to someone else; reads
//! answer `NotFound` so they never confirm that another user's order exists.

use thiserror::Error;

use franklin_core::UserId;

use crate::db::orders::OrderOwner;
use crate::models::user::User;

/// Why the principal may not touch a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("resource not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
}

/// Allow a mutation only if the principal owns the order.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` if the owner's name differs from the principal's.
pub fn check_owner(principal: &User, owner: &OrderOwner) -> Result<(), AccessError> {
    if owner.name == principal.name {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Resolve the `user_id` filter of a read request.
///
/// A missing filter means the principal's own orders.
///
/// # Errors
///
/// Returns `AccessError::NotFound` if the filter names another user.
pub fn check_read_filter(principal: &User, filter: Option<UserId>) -> Result<UserId, AccessError> {
    match filter {
        Some(id) if id != principal.id => Err(AccessError::NotFound),
        _ => Ok(principal.id),
    }
}

/// Allow an order to be created only on the principal's behalf.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` if the payload names another user.
pub fn check_creation(
    principal: &User,
    user: Option<&str>,
    user_id: Option<UserId>,
) -> Result<(), AccessError> {
    let name_matches = user.is_none_or(|name| principal.name == *name);
    let id_matches = user_id.is_none_or(|id| id == principal.id);

    if name_matches && id_matches {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}
