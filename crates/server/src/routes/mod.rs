//! HTTP route handlers for the shop server.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (database)
//!
//! # Products (multipart/form-data: name, price, image)
//! GET    /products             - List all products
//! POST   /product              - Create product (image required)
//! GET    /product/{id}         - Product detail
//! PATCH  /product/{id}         - Partial update
//! DELETE /product/{id}         - Delete product and its image
//!
//! # Users (JSON)
//! GET    /users                - List all users
//! POST   /user                 - Create user
//! GET    /user/{id}            - User detail
//! PATCH  /user/{id}            - Partial update
//! DELETE /user/{id}            - Delete user
//!
//! # Static
//! GET    /uploads/*            - Stored product images
//! ```

pub mod products;
pub mod users;

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::{AppError, Result};
use crate::middleware::{request_id_middleware, request_span};
use crate::services::images::PUBLIC_PREFIX;
use crate::state::AppState;

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Create the product and user routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/product", post(products::create))
        .route(
            "/product/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/users", get(users::index))
        .route("/user", post(users::create))
        .route(
            "/user/{id}",
            get(users::show).patch(users::update).delete(users::destroy),
        )
}

/// Build the full application router with middleware and state applied.
///
/// Sentry layers are not included; `main` wraps them around the result.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.images().root());
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Parse a path segment into a typed id, rejecting garbage with 400.
fn parse_id<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e: T::Err| AppError::BadRequest(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use shop_core::ProductId;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;
    use crate::db::{create_memory_pool, run_migrations};

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let config = ServerConfig::new("sqlite::memory:", dir.path());
        (app(AppState::new(config, pool)), dir)
    }

    #[test]
    fn test_parse_id() {
        let id: ProductId = parse_id("42").unwrap();
        assert_eq!(id.as_i64(), 42);
        assert!(matches!(
            parse_id::<ProductId>("abc"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_with_live_database() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("x-request-id").unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
