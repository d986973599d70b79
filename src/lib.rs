pub mod activity;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;
pub mod topics;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// Builds the whole site: every component router, the session layer and
/// request tracing.
pub fn app(db_pool: SqlitePool, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.session_idle_minutes,
        )));

    Router::new()
        .route("/", get(index::home))
        .route("/topics", get(topics::topics))
        .route("/activity", get(activity::activity))
        .merge(auth::router())
        .merge(rooms::router())
        .merge(profiles::router())
        .fallback(res::not_found)
        .with_state(AppState { db_pool })
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
