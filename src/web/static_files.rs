//! Embedded recognition page.
//!
//! The camera + recognition UI (`static/app.html`) is embedded in the
//! binary at compile time. It runs hand tracking in the browser and posts
//! the landmarks to `/classify-sign`.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_embed::Embed;

use super::ApiError;

/// File name of the recognition page inside the embedded folder.
pub const APP_PAGE: &str = "app.html";

/// Embedded static files from the `static` directory.
#[derive(Embed)]
#[folder = "static"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
#[include = "*.ico"]
#[include = "*.svg"]
pub struct StaticAssets;

/// GET /app - Serves the recognition page.
pub async fn serve_app() -> Response {
    match StaticAssets::get(APP_PAGE) {
        Some(content) => file_response(APP_PAGE, content.data.as_ref()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::with_details(
                "app.html not found",
                "the static directory was empty at build time",
            )),
        )
            .into_response(),
    }
}

/// Creates an HTTP response for a file with appropriate content type.
fn file_response(path: &str, content: &[u8]) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control_for_path(path))
        .body(Body::from(content.to_vec()))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}

/// HTML is always revalidated so UI changes show up on reload.
fn cache_control_for_path(path: &str) -> &'static str {
    if std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
        "no-cache, must-revalidate"
    } else {
        "public, max-age=3600"
    }
}

/// Returns true if the recognition page was embedded.
#[must_use]
pub fn has_app_page() -> bool {
    StaticAssets::get(APP_PAGE).is_some()
}
