//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (database)
//!
//! # Users
//! POST   /users                - Sign up
//! GET    /users/{id}           - Get a user (requires auth)
//!
//! # Auth
//! POST   /signin               - Check credentials (requires auth)
//!
//! # Orders (require auth)
//! POST   /orders               - Create an order
//! GET    /orders?user_id=&count=&start= - List the principal's orders, newest first
//! GET    /orders/{id}?user_id= - Get an order
//! PUT    /orders/{id}          - Replace an order's items
//! DELETE /orders/{id}          - Delete an order
//! ```

pub mod auth;
pub mod health;
pub mod orders;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/{id}", get(users::get_user))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route(
            "/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/users", user_routes())
        .route("/signin", post(auth::signin))
        .nest("/orders", order_routes())
}

/// Build the complete application with request tracing, bound to `state`.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
