//! Upload and configuration form page

use axum::response::Html;

/// Serve the static form page driving /upload and /process.
pub async fn form_page() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
