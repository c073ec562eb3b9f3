//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the chart of accounts, posting, fiscal years,
//!   general ledger preferences and bank deposits
//! - Bearer token authentication middleware
//! - The JSON error envelope every handler renders through

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tallybook_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for verifying bearer tokens.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Returns an owned handle to the connection pool for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header::AUTHORIZATION};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tallybook_shared::{JwtConfig, JwtService};
    use uuid::Uuid;

    use crate::AppState;

    /// State whose database handle is disconnected; any query fails.
    pub fn offline_state() -> AppState {
        AppState {
            db: Arc::new(DatabaseConnection::default()),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expires_minutes: 15,
            })),
        }
    }

    pub fn bearer(state: &AppState) -> String {
        let token = state
            .jwt_service
            .generate_access_token(Uuid::now_v7(), "accountant")
            .unwrap();
        format!("Bearer {token}")
    }

    pub fn get(state: &AppState, uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(AUTHORIZATION, bearer(state))
            .body(Body::empty())
            .unwrap()
    }

    pub fn send_json(state: &AppState, method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, bearer(state))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
