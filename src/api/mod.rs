//! HTTP interface - axum router, shared state, and the identity extractor.
//!
//! Handlers are thin: they parse the request, resolve the caller's identity
//! once via [`CurrentUser`], and delegate to `core::*`. Errors bubble up as
//! [`crate::errors::Error`] and render through its `IntoResponse` impl.

/// Registration and login endpoints
pub mod auth;
/// Cart endpoints
pub mod cart;
/// Order endpoints
pub mod orders;
/// Product and category endpoints
pub mod products;

use crate::config::AppConfig;
use crate::core::auth::Identity;
use crate::errors::{Error, Result};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{async_trait, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state, created once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Handlers that take this parameter reject requests without a valid bearer
/// token before any business logic runs.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(Error::InvalidToken)?;

        let identity = crate::core::auth::authenticate(token, &state.config.token_secret)?;
        Ok(Self(identity))
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route(
            "/api/products",
            get(products::list_handler).post(products::create_handler),
        )
        .route(
            "/api/products/:id",
            get(products::get_handler)
                .put(products::update_handler)
                .delete(products::delete_handler),
        )
        .route(
            "/api/categories",
            get(products::list_categories_handler).post(products::create_category_handler),
        )
        .route(
            "/api/cart",
            get(cart::view_handler).delete(cart::clear_handler),
        )
        .route("/api/cart/items", post(cart::add_handler))
        .route(
            "/api/cart/items/:product_id",
            put(cart::update_handler).delete(cart::remove_handler),
        )
        .route(
            "/api/orders",
            post(orders::create_handler).get(orders::list_handler),
        )
        .route("/api/orders/:id", get(orders::get_handler))
        .route("/api/orders/:id/status", put(orders::status_handler))
        .layer(cors)
        .with_state(state)
}

/// Liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Binds the listener and serves the router until shutdown.
pub async fn serve(state: AppState) -> Result<()> {
    let address = format!("{}:{}", state.config.host, state.config.port);
    let app = router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{create_test_category, create_test_product, setup_test_db};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let db = setup_test_db().await.unwrap();
        AppState {
            db,
            config: Arc::new(AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                database_url: "sqlite::memory:".to_string(),
                token_secret: "test-secret".to_string(),
                token_expiry_minutes: 30,
                seed_db: false,
            }),
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn authed_json_request(
        method: &str,
        uri: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(test_state().await);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_endpoints_require_token() {
        let app = router(test_state().await);

        let response = app
            .clone()
            .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/api/cart")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_login_and_checkout_flow() {
        let state = test_state().await;
        let category = create_test_category(&state.db, "Electronics").await.unwrap();
        let product = create_test_product(&state.db, "Keyboard", 45.0, 5, category.id)
            .await
            .unwrap();
        let app = router(state.clone());

        // Register
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                serde_json::json!({ "email": "shopper@example.com", "password": "hunter22" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Login
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({ "email": "shopper@example.com", "password": "hunter22" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        // Browse the catalog (public)
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/products?search=keyboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listing = body_json(response).await;
        assert_eq!(listing.as_array().unwrap().len(), 1);

        // Add to cart
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/api/cart/items",
                &token,
                serde_json::json!({ "product_id": product.id, "quantity": 2 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // View cart
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/cart")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cart = body_json(response).await;
        assert_eq!(cart["total"], 90.0);

        // Checkout
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/api/orders",
                &token,
                serde_json::json!({ "shipping_address": "1 Main St" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let order = body_json(response).await;
        assert_eq!(order["order"]["status"], "pending");
        assert_eq!(order["order"]["total_amount"], 90.0);

        // Stock was decremented
        let fetched = crate::core::catalog::get_product(&state.db, product.id)
            .await
            .unwrap();
        assert_eq!(fetched.stock_quantity, 3);
    }

    #[tokio::test]
    async fn test_admin_gating_on_product_creation() {
        let state = test_state().await;
        let category = create_test_category(&state.db, "Electronics").await.unwrap();
        let app = router(state.clone());

        // A regular customer may not create products
        crate::core::auth::register(&state.db, "shopper@example.com", "hunter22")
            .await
            .unwrap();
        let (_, customer_token) = crate::core::auth::login(
            &state.db,
            "shopper@example.com",
            "hunter22",
            &state.config.token_secret,
            30,
        )
        .await
        .unwrap();

        let new_product = serde_json::json!({
            "name": "Monitor",
            "price": 199.0,
            "sku": "SKU-MON",
            "stock_quantity": 4,
            "category_id": category.id,
        });

        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/api/products",
                &customer_token,
                new_product.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // An admin may
        let admin_token = crate::core::auth::issue_token(
            999,
            crate::entities::Role::Admin,
            &state.config.token_secret,
            30,
        )
        .unwrap();
        let response = app
            .oneshot(authed_json_request(
                "POST",
                "/api/products",
                &admin_token,
                new_product,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let app = router(test_state().await);

        let payload =
            serde_json::json!({ "email": "dup@example.com", "password": "hunter22" });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/register", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", "/api/auth/register", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
