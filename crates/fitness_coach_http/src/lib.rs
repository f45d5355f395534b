//! HTTP front end for [`fitness_coach`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use state::AppState;

pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
/// Must exceed the upstream client timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(35);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub max_body_size: usize,
    /// File-backed profile store; in-memory when `None`.
    pub profile_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Unparsable values fall back to their defaults.
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let address = get("ADDRESS")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
        let max_body_size = get("MAX_HTTP_BODY_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_BODY_SIZE);
        let profile_path = get("FITNESS_COACH_PROFILE_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Self {
            address,
            max_body_size,
            profile_path,
        }
    }
}

pub fn build_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics_endpoint))
        .route("/api/workout", post(routes::workout))
        .route("/api/test", post(routes::canned))
        .route("/api/metrics", post(routes::compute_metrics))
        .route(
            "/api/profile",
            get(routes::get_profile)
                .put(routes::put_profile)
                .patch(routes::patch_profile)
                .delete(routes::delete_profile),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_span))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
}
