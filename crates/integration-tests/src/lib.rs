//! End-to-end tests for the Franklin API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database and start the server
//! cargo run -p franklin-cli -- migrate
//! cargo run -p franklin-server
//!
//! # Run the ignored end-to-end tests against it
//! FRANKLIN_BASE_URL=http://localhost:8080 cargo test -p franklin-integration-tests -- --ignored
//! ```
//!
//! Every test signs up its own users (names are random), so tests can run in
//! parallel against a shared database. Sign-ups carry no zip code, so no
//! store lookup is made.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use franklin_core::{ItemId, OrderId, UserId};

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("FRANKLIN_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// A signed-up user and the password it was created with.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub name: String,
    pub password: String,
}

/// An order as returned by the API.
#[derive(Debug, Deserialize)]
pub struct OrderBody {
    pub id: OrderId,
    pub user: String,
    pub user_id: UserId,
    pub items: Option<Vec<ItemBody>>,
}

impl OrderBody {
    /// Item ids on the order, sorted.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.items.iter().flatten().map(|item| item.id).collect();
        ids.sort();
        ids
    }

    /// `(id, name)` of every item on the order, sorted by id.
    #[must_use]
    pub fn named_items(&self) -> Vec<(i32, String)> {
        let mut items: Vec<(i32, String)> = self
            .items
            .iter()
            .flatten()
            .map(|item| (item.id.as_i32(), item.name.clone()))
            .collect();
        items.sort();
        items
    }
}

/// An item id no other test uses, so its name can be changed freely.
#[must_use]
pub fn fresh_item_id() -> i32 {
    let n = Uuid::new_v4().as_u128() % 1_000_000_000;
    1_000 + i32::try_from(n).unwrap_or_default()
}

/// An item as returned by the API.
#[derive(Debug, Deserialize)]
pub struct ItemBody {
    pub id: ItemId,
    pub name: String,
}

/// HTTP client bound to the server under test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context for the configured server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
        }
    }

    /// Build a request to `path`.
    #[must_use]
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base_url))
    }

    /// Build a request to `path` carrying `user`'s credentials.
    #[must_use]
    pub fn authed(&self, user: &TestUser, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .basic_auth(&user.name, Some(&user.password))
    }

    /// Sign up a user with a random name.
    ///
    /// # Panics
    ///
    /// Panics if the sign-up fails.
    #[allow(clippy::expect_used)]
    pub async fn sign_up(&self) -> TestUser {
        let name = format!("test-{}", Uuid::new_v4());
        let password = "correct-password".to_owned();

        let resp = self
            .request(reqwest::Method::POST, "/users")
            .json(&json!({ "name": name, "password": password }))
            .send()
            .await
            .expect("Failed to send sign-up");
        assert_eq!(resp.status(), StatusCode::OK, "sign-up failed");

        let body: Value = resp.json().await.expect("Invalid sign-up response");
        assert!(body.get("password").is_none(), "password leaked: {body}");

        TestUser {
            id: serde_json::from_value(body["id"].clone()).expect("Missing user id"),
            name,
            password,
        }
    }

    /// Create an order for `user` with `(id, name)` items.
    ///
    /// # Panics
    ///
    /// Panics if the order cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn create_order(&self, user: &TestUser, items: &[(i32, &str)]) -> OrderBody {
        let resp = self
            .authed(user, reqwest::Method::POST, "/orders")
            .json(&order_payload(user, items))
            .send()
            .await
            .expect("Failed to send order");
        assert_eq!(resp.status(), StatusCode::OK, "order creation failed");

        resp.json().await.expect("Invalid order response")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON body naming `user` as the owner.
#[must_use]
pub fn order_payload(user: &TestUser, items: &[(i32, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();

    json!({ "user": user.name, "user_id": user.id, "items": items })
}

/// Read the `error` message of a failed response.
///
/// # Panics
///
/// Panics if the body is not the JSON error envelope.
#[allow(clippy::expect_used)]
pub async fn error_message(resp: Response) -> String {
    let body: Value = resp.json().await.expect("Invalid error body");
    body["error"]
        .as_str()
        .expect("Missing error message")
        .to_owned()
}
