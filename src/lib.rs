pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenIssuer>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl_minutes)),
            hasher: PasswordHasher::new(config.bcrypt_cost),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on the state's pool
/// beforehand.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::entries::router())
        .merge(routes::tags::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
