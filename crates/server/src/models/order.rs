//! Order domain types.

use serde::{Deserialize, Serialize};

use franklin_core::{ItemId, OrderId, UserId, UserName};

/// A catalog item as it appears on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

/// An order with its owner and line items.
///
/// `items` is `None` for an order that has just been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Owner's name (denormalized from `users`).
    pub user: UserName,
    pub user_id: UserId,
    pub items: Option<Vec<Item>>,
}

/// A requested line item.
///
/// The name is only used to register an item the catalog does not know yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
}

impl LineItem {
    /// Item ids in request order with repeats dropped (first occurrence wins).
    #[must_use]
    pub fn distinct_ids(items: &[Self]) -> Vec<ItemId> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| item.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32) -> LineItem {
        LineItem {
            id: ItemId::new(id),
            name: String::new(),
        }
    }

    #[test]
    fn test_distinct_ids_keeps_first_occurrence_order() {
        let items = vec![line(3), line(1), line(3), line(2), line(1)];
        assert_eq!(
            LineItem::distinct_ids(&items),
            vec![ItemId::new(3), ItemId::new(1), ItemId::new(2)]
        );
    }

    #[test]
    fn test_line_item_name_is_optional() {
        let item: LineItem = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(item.id, ItemId::new(4));
        assert!(item.name.is_empty());
    }

    #[test]
    fn test_deleted_order_serializes_null_items() {
        let order = Order {
            id: OrderId::new(1),
            user: UserName::parse("Test User").unwrap(),
            user_id: UserId::new(1),
            items: None,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["items"], serde_json::Value::Null);
        assert_eq!(json["user"], "Test User");
    }
}
