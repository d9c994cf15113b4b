//! Order line-item reconciliation.
//!
//! Replacing an order's items is done by diffing the stored item ids against
//! the requested ones and writing only the difference:
//!
//! 1. load the current item ids
//! 2. `to_remove` = current − desired (multiset difference)
//! 3. `to_add` = desired − current
//! 4. apply removals, then additions
//! 5. re-count the stored line items and require `count == desired.len()`
//!
//! The multiset difference uses a counting map (id → occurrences still
//! unmatched) consumed left to right, so repeated ids are matched in
//! encounter order.

use std::collections::HashMap;
use std::future::Future;

use sqlx::PgPool;
use thiserror::Error;

use franklin_core::{ItemId, OrderId, UserId};

use crate::db::RepositoryError;
use crate::db::orders::{self, PgLineItems};
use crate::models::order::{LineItem, Order};

/// Errors that can occur while reconciling an order's line items.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// The stored line-item count does not match the requested one after the
    /// writes were applied.
    #[error("reconciliation mismatch: expected {expected} line items, found {actual}")]
    Mismatch { expected: usize, actual: i64 },

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Storage for the line items of a single order.
pub trait LineItemStore {
    /// Item ids currently on the order.
    fn current_items(&mut self) -> impl Future<Output = Result<Vec<ItemId>, RepositoryError>> + Send;

    /// Add one line item.
    fn add_item(&mut self, item: ItemId) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove one line item.
    fn remove_item(
        &mut self,
        item: ItemId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of line items currently stored.
    fn count_items(&mut self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

/// The writes needed to turn one item list into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_add: Vec<ItemId>,
    pub to_remove: Vec<ItemId>,
}

impl ReconcilePlan {
    /// Plan the writes that turn `current` into `desired`.
    #[must_use]
    pub fn new(current: &[ItemId], desired: &[ItemId]) -> Self {
        Self {
            to_add: multiset_difference(desired, current),
            to_remove: multiset_difference(current, desired),
        }
    }

    /// `true` if no writes are needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// `minuend − subtrahend` as multisets, in `minuend` order.
fn multiset_difference(minuend: &[ItemId], subtrahend: &[ItemId]) -> Vec<ItemId> {
    let mut unmatched: HashMap<ItemId, usize> = HashMap::with_capacity(subtrahend.len());
    for id in subtrahend {
        *unmatched.entry(*id).or_insert(0) += 1;
    }

    minuend
        .iter()
        .copied()
        .filter(|id| match unmatched.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

/// What a reconciliation wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Bring the store's line items in line with `desired` and verify the result.
///
/// # Errors
///
/// Returns `ReconcileError::Mismatch` if the stored count differs from
/// `desired.len()` afterwards.
/// Returns `ReconcileError::Repository` if any read or write fails.
pub async fn reconcile<S>(store: &mut S, desired: &[ItemId]) -> Result<ReconcileOutcome, ReconcileError>
where
    S: LineItemStore + Send,
{
    let current = store.current_items().await?;
    let plan = ReconcilePlan::new(&current, desired);

    for item in &plan.to_remove {
        store.remove_item(*item).await?;
    }
    for item in &plan.to_add {
        store.add_item(*item).await?;
    }

    let actual = store.count_items().await?;
    if usize::try_from(actual).ok() != Some(desired.len()) {
        return Err(ReconcileError::Mismatch {
            expected: desired.len(),
            actual,
        });
    }

    Ok(ReconcileOutcome {
        added: plan.to_add.len(),
        removed: plan.to_remove.len(),
    })
}

/// Replaces the line items of stored orders.
pub struct OrderReconciler<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderReconciler<'a> {
    /// Create a new reconciler.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace the items of `order_id` with `items` and return the updated order.
    ///
    /// Runs in one transaction with the order row locked. Repeated item ids
    /// are stored once.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::OrderNotFound` if the order does not exist
    /// (or is not owned by `owner`).
    /// Returns `ReconcileError::Mismatch` if the postcondition check fails.
    /// Returns `ReconcileError::Repository` if a query fails, including
    /// `RepositoryError::InvalidReference` for an unknown item.
    pub async fn replace_items(
        &self,
        order_id: OrderId,
        owner: UserId,
        items: &[LineItem],
    ) -> Result<Order, ReconcileError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        if !orders::lock_order(&mut tx, order_id).await? {
            return Err(ReconcileError::OrderNotFound);
        }

        orders::register_items(&mut tx, items).await?;

        let desired = LineItem::distinct_ids(items);
        let outcome = reconcile(&mut PgLineItems::new(&mut tx, order_id), &desired).await?;

        let order = orders::fetch_order(&mut *tx, order_id, owner)
            .await?
            .ok_or(ReconcileError::OrderNotFound)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %order_id,
            added = outcome.added,
            removed = outcome.removed,
            "Order items reconciled"
        );

        Ok(order)
    }
}
