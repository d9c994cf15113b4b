//! Order route handlers.
//!
//! All order routes require Basic credentials. Mutations check the stored
//! owner and answer 403 for someone else's order; reads are filtered by the
//! principal and answer 404 instead.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::Deserialize;

use franklin_core::{OrderId, Page, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{LineItem, Order};
use crate::models::user::User;
use crate::services::guard;
use crate::services::reconcile::OrderReconciler;
use crate::state::AppState;

/// Order body for create and update.
///
/// `user` / `user_id` may be left out; when present they must name the
/// principal.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Query string of the order read routes.
///
/// Values are kept raw so that unparsable paging parameters fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub user_id: Option<String>,
    pub count: Option<String>,
    pub start: Option<String>,
}

impl OrderQuery {
    fn user_filter(&self) -> Result<Option<UserId>> {
        self.user_id
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| AppError::BadRequest("User ID is invalid.".to_owned()))
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Order ID is invalid.".to_owned()))
}

fn parse_body(payload: std::result::Result<Json<OrderRequest>, JsonRejection>) -> Result<OrderRequest> {
    payload.map(|Json(body)| body).map_err(|e| {
        tracing::debug!(error = %e, "Invalid order body");
        AppError::BadRequest("Invalid request payload.".to_owned())
    })
}

fn check_payload_owner(principal: &User, body: &OrderRequest) -> Result<()> {
    guard::check_creation(principal, body.user.as_deref(), body.user_id).map_err(|e| {
        tracing::warn!(user = %principal.name, "Order payload names another user");
        AppError::access(e, "Order not found.")
    })
}

/// Create an order owned by the principal.
#[tracing::instrument(skip(state, principal, payload), fields(user_id = %principal.id))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    payload: std::result::Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<Order>> {
    let body = parse_body(payload)?;
    check_payload_owner(&principal, &body)?;

    let order = OrderRepository::new(state.pool())
        .create(principal.id, &body.items)
        .await?;

    tracing::info!(order_id = %order.id, "Order created");

    Ok(Json(order))
}

/// Get one of the principal's orders.
#[tracing::instrument(skip(state, principal, query), fields(user_id = %principal.id))]
pub async fn get_order(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Order>> {
    let order_id = parse_order_id(&id)?;
    let user_id = guard::check_read_filter(&principal, query.user_filter()?)
        .map_err(|e| AppError::access(e, "Order not found."))?;

    let order = OrderRepository::new(state.pool())
        .get(order_id, user_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    Ok(Json(order))
}

/// List a page of the principal's orders, newest first.
#[tracing::instrument(skip(state, principal, query), fields(user_id = %principal.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    let user_id = guard::check_read_filter(&principal, query.user_filter()?)
        .map_err(|e| AppError::access(e, "No orders found."))?;
    let page = Page::from_query(query.count.as_deref(), query.start.as_deref());

    let orders = OrderRepository::new(state.pool())
        .list(user_id, page)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("No orders found."),
            other => other.into(),
        })?;

    Ok(Json(orders))
}

/// Replace the items of one of the principal's orders.
#[tracing::instrument(skip(state, principal, payload), fields(user_id = %principal.id))]
pub async fn update_order(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
    payload: std::result::Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<Order>> {
    let order_id = parse_order_id(&id)?;
    let body = parse_body(payload)?;

    let owner = OrderRepository::new(state.pool())
        .owner(order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    guard::check_owner(&principal, &owner).map_err(|e| {
        tracing::warn!(order_id = %order_id, "Attempt to update another user's order");
        AppError::access(e, "Order not found.")
    })?;
    check_payload_owner(&principal, &body)?;

    let order = OrderReconciler::new(state.pool())
        .replace_items(order_id, owner.id, &body.items)
        .await?;

    Ok(Json(order))
}

/// Delete one of the principal's orders.
///
/// Responds with the deleted order, without items. Any request body is ignored.
#[tracing::instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order_id = parse_order_id(&id)?;
    let orders = OrderRepository::new(state.pool());

    let owner = orders
        .owner(order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    guard::check_owner(&principal, &owner).map_err(|e| {
        tracing::warn!(order_id = %order_id, "Attempt to delete another user's order");
        AppError::access(e, "Order not found.")
    })?;

    if !orders.delete(order_id, owner.id).await? {
        return Err(AppError::NotFound("Order not found."));
    }

    tracing::info!(order_id = %order_id, "Order deleted");

    Ok(Json(Order {
        id: order_id,
        user: owner.name,
        user_id: owner.id,
        items: None,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_defaults() {
        let body: OrderRequest = serde_json::from_str(r#"{"items": [{"id": 1, "name": "Apples"}]}"#).unwrap();
        assert!(body.user.is_none());
        assert!(body.user_id.is_none());
        assert_eq!(body.items.len(), 1);

        let body: OrderRequest = serde_json::from_str("{}").unwrap();
        assert!(body.items.is_empty());
    }

    #[test]
    fn test_parse_order_id() {
        assert_eq!(parse_order_id("42").unwrap(), OrderId::new(42));
        assert!(matches!(parse_order_id("abc"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_user_filter() {
        let query = OrderQuery {
            user_id: Some("3".to_owned()),
            ..Default::default()
        };
        assert_eq!(query.user_filter().unwrap(), Some(UserId::new(3)));

        assert_eq!(OrderQuery::default().user_filter().unwrap(), None);

        let query = OrderQuery {
            user_id: Some("x".to_owned()),
            ..Default::default()
        };
        assert!(query.user_filter().is_err());
    }
}
