//! Live reload system for development mode.
//!
//! Provides file watching and WebSocket-based reload notifications
//! to connected browser tabs when source files change.

mod debouncer;
mod hub;
mod script;
mod watcher;
mod websocket;

use tokio::sync::watch;

pub(crate) use debouncer::DEFAULT_DEBOUNCE_MS;
pub(crate) use hub::ReloadHub;
pub(crate) use script::{RELOAD_ENDPOINT, inject_reload_script, reload_script};
pub(crate) use watcher::FileWatcher;
pub(crate) use websocket::ws_handler;

/// Resolve once the shutdown flag turns `true` or its sender is gone.
///
/// The borrow `wait_for` returns is dropped here, so the future stays `Send`
/// when used as a `select!` branch.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
