//! Editor front-end files served straight from disk.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// `/` → `index.html`, plus the `css/` and `js/` trees under `static_dir`.
pub fn routes(static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service(
            "/test-history-manual.html",
            ServeFile::new(static_dir.join("test-history-manual.html")),
        )
        .nest_service("/css", ServeDir::new(static_dir.join("css")))
        .nest_service("/js", ServeDir::new(static_dir.join("js")))
}
