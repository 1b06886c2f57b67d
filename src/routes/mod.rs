//! HTTP route handlers

pub mod index;
pub mod process;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Assemble the application router. The body limit covers the whole
/// surface, so uploads over the cap never reach handler logic.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index::form_page))
        .route("/health", get(health_check))
        .route("/upload", post(upload::upload_file))
        .route("/process", post(process::process_handout))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[cfg(test)]
pub(crate) mod testutil {
    use axum::Router;
    use axum_test::TestServer;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::state::AppState;

    /// Router wired to an isolated upload directory. Keep the returned
    /// TempDir alive for the duration of the test.
    pub fn test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.upload.dir = temp_dir.path().to_path_buf();
        let max_upload_bytes = config.upload.max_bytes;

        let state = AppState::new(config).unwrap();
        (super::router(max_upload_bytes).with_state(state), temp_dir)
    }

    pub fn test_server() -> (TestServer, TempDir) {
        let (app, temp_dir) = test_app();
        (TestServer::new(app).unwrap(), temp_dir)
    }
}
