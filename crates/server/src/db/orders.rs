//! Order repository for database operations.
//!
//! Orders are read with a single join (order → owner, order → line items →
//! items) and reassembled in Rust. Writes that touch more than one row run in
//! a transaction.

use sqlx::{PgConnection, PgExecutor, PgPool};

use franklin_core::{ItemId, OrderId, Page, UserId, UserName};

use super::RepositoryError;
use crate::models::order::{Item, LineItem, Order};
use crate::services::reconcile::LineItemStore;

/// One row of the order join: the order header plus at most one line item.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: OrderId,
    user_id: UserId,
    user_name: UserName,
    item_id: Option<ItemId>,
    item_name: Option<String>,
}

/// The owner of an order, as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderOwner {
    pub id: UserId,
    pub name: UserName,
}

/// Build an [`Order`] from the rows of the order join.
///
/// Returns `None` when there are no rows.
fn assemble(rows: Vec<OrderLineRow>) -> Option<Order> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let mut items = Vec::new();
    let mut push = |id: Option<ItemId>, name: Option<String>| {
        if let Some(id) = id {
            items.push(Item {
                id,
                name: name.unwrap_or_default(),
            });
        }
    };

    push(first.item_id, first.item_name);
    for row in rows {
        push(row.item_id, row.item_name);
    }

    Some(Order {
        id: first.order_id,
        user: first.user_name,
        user_id: first.user_id,
        items: Some(items),
    })
}

/// Read one order, constrained to the given owner.
pub(crate) async fn fetch_order<'e, E>(
    executor: E,
    order_id: OrderId,
    user_id: UserId,
) -> Result<Option<Order>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderLineRow>(
        r"
        SELECT o.id AS order_id, o.user_id, u.name AS user_name,
               i.id AS item_id, i.name AS item_name
        FROM orders o
        JOIN users u ON u.id = o.user_id
        LEFT JOIN order_items oi ON oi.order_id = o.id
        LEFT JOIN items i ON i.id = oi.item_id
        WHERE o.id = $1 AND o.user_id = $2
        ORDER BY i.id
        ",
    )
    .bind(order_id)
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(assemble(rows))
}

/// Lock an order row for the rest of the transaction.
///
/// Returns `false` if the order does not exist.
pub(crate) async fn lock_order(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<bool, RepositoryError> {
    let locked = sqlx::query_scalar::<_, OrderId>("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;

    Ok(locked.is_some())
}

/// Upsert the named items of an order. A submitted name replaces the stored
/// one, so the order reads back with the names it was sent with. Items sent
/// without a name must already exist.
pub(crate) async fn register_items(
    conn: &mut PgConnection,
    items: &[LineItem],
) -> Result<(), RepositoryError> {
    for item in named_items(items) {
        sqlx::query(
            r"
            INSERT INTO items (id, name) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            ",
        )
        .bind(item.id)
        .bind(&item.name)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Named items to upsert, one per id. The last name given for an id wins.
fn named_items(items: &[LineItem]) -> Vec<&LineItem> {
    let mut named: Vec<&LineItem> = Vec::new();
    for item in items.iter().filter(|item| !item.name.is_empty()) {
        match named.iter_mut().find(|seen| seen.id == item.id) {
            Some(seen) => *seen = item,
            None => named.push(item),
        }
    }
    named
}

/// Insert one line item.
async fn insert_line_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    item_id: ItemId,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO order_items (order_id, item_id) VALUES ($1, $2)")
        .bind(order_id)
        .bind(item_id)
        .execute(conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, &format!("unknown item {item_id}")))?;

    Ok(())
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order owned by `user_id`.
    ///
    /// Returns `None` both when the order does not exist and when it belongs
    /// to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        fetch_order(self.pool, order_id, user_id).await
    }

    /// Get one page of a user's order ids, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ids(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<OrderId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, OrderId>(
            r"
            SELECT id
            FROM orders
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(page.count())
        .bind(page.start())
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Get one page of a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the page is empty.
    /// Returns `RepositoryError::DataCorruption` if a listed order cannot be read back.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, user_id: UserId, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let ids = self.list_ids(user_id, page).await?;
        if ids.is_empty() {
            return Err(RepositoryError::NotFound);
        }

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            let order = self.get(id, user_id).await?.ok_or_else(|| {
                RepositoryError::DataCorruption(format!("order {id} listed but not readable"))
            })?;
            orders.push(order);
        }

        Ok(orders)
    }

    /// Get the stored owner of an order, regardless of who is asking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner(&self, order_id: OrderId) -> Result<Option<OrderOwner>, RepositoryError> {
        let owner = sqlx::query_as::<_, OrderOwner>(
            r"
            SELECT u.id, u.name
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner)
    }

    /// Create an order with its line items in one transaction.
    ///
    /// Repeated item ids are stored once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the owner or an item does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        items: &[LineItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id",
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, &format!("unknown user {owner}")))?;

        register_items(&mut tx, items).await?;
        for item_id in LineItem::distinct_ids(items) {
            insert_line_item(&mut tx, order_id, item_id).await?;
        }

        let order = fetch_order(&mut *tx, order_id, owner)
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("order {order_id} vanished after insert"))
            })?;

        tx.commit().await?;

        Ok(order)
    }

    /// Delete an order owned by `owner`. Line items go with it.
    ///
    /// Returns `false` if no order with this id belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, order_id: OrderId, owner: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
            .bind(order_id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Line items of one order, accessed through an open connection or transaction.
pub struct PgLineItems<'c> {
    conn: &'c mut PgConnection,
    order_id: OrderId,
}

impl<'c> PgLineItems<'c> {
    /// Operate on the line items of `order_id` through `conn`.
    pub const fn new(conn: &'c mut PgConnection, order_id: OrderId) -> Self {
        Self { conn, order_id }
    }
}

impl LineItemStore for PgLineItems<'_> {
    async fn current_items(&mut self) -> Result<Vec<ItemId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ItemId>(
            "SELECT item_id FROM order_items WHERE order_id = $1 ORDER BY item_id",
        )
        .bind(self.order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(ids)
    }

    async fn add_item(&mut self, item: ItemId) -> Result<(), RepositoryError> {
        insert_line_item(&mut *self.conn, self.order_id, item).await
    }

    async fn remove_item(&mut self, item: ItemId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND item_id = $2")
            .bind(self.order_id)
            .bind(item)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn count_items(&mut self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM order_items WHERE order_id = $1",
        )
        .bind(self.order_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(item: Option<(i32, &str)>) -> OrderLineRow {
        OrderLineRow {
            order_id: OrderId::new(9),
            user_id: UserId::new(1),
            user_name: UserName::parse("Test User").unwrap(),
            item_id: item.map(|(id, _)| ItemId::new(id)),
            item_name: item.map(|(_, name)| name.to_owned()),
        }
    }

    fn line(id: i32, name: &str) -> LineItem {
        LineItem {
            id: ItemId::new(id),
            name: name.to_owned(),
        }
    }

    #[test]
    fn test_named_items_skips_unnamed() {
        let items = [line(1, "Pears"), line(2, ""), line(3, "Avocado")];
        let named: Vec<_> = named_items(&items).into_iter().map(|i| i.id).collect();
        assert_eq!(named, vec![ItemId::new(1), ItemId::new(3)]);
    }

    #[test]
    fn test_named_items_last_name_wins() {
        let items = [line(1, "Apples"), line(2, "Oranges"), line(1, "Pears")];
        let named: Vec<_> = named_items(&items)
            .into_iter()
            .map(|i| (i.id, i.name.as_str()))
            .collect();
        assert_eq!(
            named,
            vec![(ItemId::new(1), "Pears"), (ItemId::new(2), "Oranges")]
        );
    }

    #[test]
    fn test_assemble_no_rows_is_none() {
        assert!(assemble(Vec::new()).is_none());
    }

    #[test]
    fn test_assemble_collects_items() {
        let order = assemble(vec![row(Some((1, "Apples"))), row(Some((2, "Oranges")))]).unwrap();

        assert_eq!(order.id, OrderId::new(9));
        assert_eq!(order.user.as_str(), "Test User");
        assert_eq!(
            order.items.unwrap(),
            vec![
                Item {
                    id: ItemId::new(1),
                    name: "Apples".to_owned()
                },
                Item {
                    id: ItemId::new(2),
                    name: "Oranges".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_assemble_order_without_items() {
        // LEFT JOIN yields one row with NULL item columns
        let order = assemble(vec![row(None)]).unwrap();
        assert_eq!(order.items, Some(Vec::new()));
    }
}
