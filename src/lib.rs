//! # Clubhouse
//!
//! The backend for a student club's website: a JSON API for members,
//! events, contact messages and community join requests, an Excel export
//! of join requests, and static hosting for the public site, the admin
//! dashboard and uploaded photos.
//!
//! The API trusts its callers. Admins sign in to the dashboard through an
//! external identity provider and no request is checked server-side.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod file;
pub mod models;
pub mod routes;
mod util;

use crate::config::Config;
use crate::db::DbPool;

/// Room for a form's text fields on top of its image.
const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

/// Files that are never served, even when they sit in a served directory.
const PRIVATE_EXTENSIONS: &[&str] = &[
    ".db",
    ".db-journal",
    ".db-shm",
    ".db-wal",
    ".sqlite",
    ".sqlite3",
];

/// What every handler gets access to.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    let body_limit = usize::try_from(config.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .nest("/api", routes::api())
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .route_service(
            "/admin",
            ServeFile::new(config.static_dir.join("admin-dashboard.html")),
        )
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn(hide_private_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Dotfiles (`.env`, `.git/...`) and database files are not found.
fn is_private_path(path: &str) -> bool {
    let Ok(decoded) = urlencoding::decode(path) else {
        return true;
    };

    decoded.split(['/', '\\']).any(|segment| {
        let segment = segment.to_ascii_lowercase();
        segment.starts_with('.')
            || PRIVATE_EXTENSIONS
                .iter()
                .any(|extension| segment.ends_with(extension))
    })
}

async fn hide_private_files(request: Request, next: Next) -> Response {
    if is_private_path(request.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    next.run(request).await
}
