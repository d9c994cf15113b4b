//! End-to-end tests for orders: creation, reconciliation, ownership and
//! pagination.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`franklin-cli migrate`)
//! - The server running (`cargo run -p franklin-server`)
//!
//! Run with: cargo test -p franklin-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use franklin_core::ItemId;
use franklin_integration_tests::{
    OrderBody, TestContext, error_message, fresh_item_id, order_payload,
};

fn ids(raw: &[i32]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId::new).collect()
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_create_and_read_back() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;

    let created = ctx
        .create_order(&user, &[(1, "Apples"), (2, "Oranges")])
        .await;
    assert_eq!(created.user, user.name);
    assert_eq!(created.user_id, user.id);
    assert_eq!(created.item_ids(), ids(&[1, 2]));

    let resp = ctx
        .authed(
            &user,
            Method::GET,
            &format!("/orders/{}?user_id={}", created.id, user.id),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let read: OrderBody = resp.json().await.unwrap();
    assert_eq!(read.id, created.id);
    assert_eq!(
        read.named_items(),
        vec![(1, "Apples".to_owned()), (2, "Oranges".to_owned())]
    );
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_update_replaces_items() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let order = ctx
        .create_order(&user, &[(1, "Apples"), (2, "Oranges")])
        .await;

    let resp = ctx
        .authed(&user, Method::PUT, &format!("/orders/{}", order.id))
        .json(&order_payload(&user, &[(1, "Apples"), (3, "Pears")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: OrderBody = resp.json().await.unwrap();
    assert_eq!(updated.item_ids(), ids(&[1, 3]));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_submitted_item_names_are_echoed() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let (kept, renamed) = (fresh_item_id(), fresh_item_id());

    let created = ctx
        .create_order(&user, &[(kept, "Apples"), (renamed, "Pears")])
        .await;
    let mut expected = vec![(kept, "Apples".to_owned()), (renamed, "Pears".to_owned())];
    expected.sort();
    assert_eq!(created.named_items(), expected);

    // a known id sent under a new name takes that name
    let resp = ctx
        .authed(&user, Method::PUT, &format!("/orders/{}", created.id))
        .json(&order_payload(&user, &[(kept, "Apples"), (renamed, "avacado")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: OrderBody = resp.json().await.unwrap();
    let mut expected = vec![(kept, "Apples".to_owned()), (renamed, "avacado".to_owned())];
    expected.sort();
    assert_eq!(updated.named_items(), expected);

    let resp = ctx
        .authed(
            &user,
            Method::GET,
            &format!("/orders/{}?user_id={}", created.id, user.id),
        )
        .send()
        .await
        .unwrap();
    let read: OrderBody = resp.json().await.unwrap();
    assert_eq!(read.named_items(), expected);

    // a new order naming the same id renames it again
    let other = ctx.create_order(&user, &[(renamed, "Quinces")]).await;
    assert_eq!(other.named_items(), vec![(renamed, "Quinces".to_owned())]);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_update_with_same_items_is_idempotent() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let items = [(1, "Apples"), (2, "Oranges")];
    let order = ctx.create_order(&user, &items).await;

    for _ in 0..2 {
        let resp = ctx
            .authed(&user, Method::PUT, &format!("/orders/{}", order.id))
            .json(&order_payload(&user, &items))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let updated: OrderBody = resp.json().await.unwrap();
        assert_eq!(updated.item_ids(), ids(&[1, 2]));
    }
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_update_to_no_items() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let order = ctx.create_order(&user, &[(1, "Apples")]).await;

    let resp = ctx
        .authed(&user, Method::PUT, &format!("/orders/{}", order.id))
        .json(&order_payload(&user, &[]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: OrderBody = resp.json().await.unwrap();
    assert_eq!(updated.items.as_deref().map(<[_]>::len), Some(0));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_cannot_create_order_for_someone_else() {
    let ctx = TestContext::new();
    let alice = ctx.sign_up().await;
    let bob = ctx.sign_up().await;

    let resp = ctx
        .authed(&alice, Method::POST, "/orders")
        .json(&order_payload(&bob, &[(1, "Apples")]))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(resp).await, "Forbidden.");
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_ownership_rules() {
    let ctx = TestContext::new();
    let alice = ctx.sign_up().await;
    let bob = ctx.sign_up().await;
    let bobs_order = ctx.create_order(&bob, &[(1, "Apples")]).await;
    let path = format!("/orders/{}", bobs_order.id);

    // writes are forbidden
    let resp = ctx
        .authed(&alice, Method::PUT, &path)
        .json(&order_payload(&alice, &[(2, "Oranges")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ctx.authed(&alice, Method::DELETE, &path).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // reads never confirm the order exists
    let resp = ctx
        .authed(&alice, Method::GET, &format!("{path}?user_id={}", bob.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .authed(&alice, Method::GET, &format!("{path}?user_id={}", alice.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // bob's order is untouched
    let resp = ctx
        .authed(&bob, Method::GET, &format!("{path}?user_id={}", bob.id))
        .send()
        .await
        .unwrap();
    let read: OrderBody = resp.json().await.unwrap();
    assert_eq!(read.item_ids(), ids(&[1]));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_delete_order() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let order = ctx.create_order(&user, &[(1, "Apples")]).await;
    let path = format!("/orders/{}", order.id);

    let resp = ctx.authed(&user, Method::DELETE, &path).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], json!(order.id));
    assert_eq!(body["items"], Value::Null);

    let resp = ctx.authed(&user, Method::DELETE, &path).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .authed(&user, Method::GET, &format!("{path}?user_id={}", user.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_list_orders_newest_first() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let first = ctx.create_order(&user, &[(1, "Apples")]).await;
    let second = ctx.create_order(&user, &[(2, "Oranges")]).await;

    let resp = ctx
        .authed(
            &user,
            Method::GET,
            &format!("/orders?user_id={}&count=10&start=0", user.id),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let orders: Vec<OrderBody> = resp.json().await.unwrap();
    let order_ids: Vec<_> = orders.iter().map(|o| o.id).collect();
    assert_eq!(order_ids, vec![second.id, first.id]);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_list_orders_pages() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;
    let first = ctx.create_order(&user, &[(1, "Apples")]).await;
    ctx.create_order(&user, &[(2, "Oranges")]).await;

    let resp = ctx
        .authed(
            &user,
            Method::GET,
            &format!("/orders?user_id={}&count=1&start=1", user.id),
        )
        .send()
        .await
        .unwrap();
    let orders: Vec<OrderBody> = resp.json().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().map(|o| o.id), Some(first.id));

    // past the end
    let resp = ctx
        .authed(
            &user,
            Method::GET,
            &format!("/orders?user_id={}&count=10&start=5", user.id),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "No orders found.");
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_list_with_no_orders() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;

    let resp = ctx
        .authed(&user, Method::GET, &format!("/orders?user_id={}", user.id))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_bad_order_id() {
    let ctx = TestContext::new();
    let user = ctx.sign_up().await;

    let resp = ctx
        .authed(&user, Method::GET, &format!("/orders/abc?user_id={}", user.id))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Order ID is invalid.");
}
