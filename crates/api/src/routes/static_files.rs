use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use rust_embed::RustEmbed;

use crate::AppState;

/// The dashboard page and its assets, embedded at compile time.
#[derive(RustEmbed)]
#[folder = "../../frontend/dist/"]
struct FrontendAssets;

pub fn static_router() -> Router<AppState> {
    Router::new().fallback(serve_static)
}

async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match FrontendAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.to_string())],
                Body::from(content.data.into_owned()),
            )
                .into_response()
        }
        None if path.starts_with("api/") => {
            (StatusCode::NOT_FOUND, "unknown API route").into_response()
        }
        None => match FrontendAssets::get("index.html") {
            Some(index) => (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8".to_string())],
                Body::from(index.data.into_owned()),
            )
                .into_response(),
            None => (StatusCode::NOT_FOUND, "Frontend not built").into_response(),
        },
    }
}
