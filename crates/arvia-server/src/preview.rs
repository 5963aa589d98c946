//! Preview server for the build output.
//!
//! Plain static file serving of the bundle, without live reload or HTML
//! rewriting.

use std::path::PathBuf;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the preview router serving `build_dir`.
pub(crate) fn preview_router(build_dir: PathBuf) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(build_dir))
        .layer(TraceLayer::new_for_http())
}
