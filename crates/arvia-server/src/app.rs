//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::content;
use crate::live_reload::{self, RELOAD_ENDPOINT};
use crate::state::AppState;

/// Create the development router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    // WebSocket for live reload
    if state.hub.is_some() {
        router = router.route(RELOAD_ENDPOINT, get(live_reload::ws_handler));
    }

    // Source and assets trees
    router
        .fallback(content::serve_content)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
