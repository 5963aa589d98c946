//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;

use crate::live_reload::ReloadHub;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory holding the pages.
    pub(crate) source_dir: PathBuf,
    /// Directory holding static assets, served under `/assets/`.
    pub(crate) assets_dir: PathBuf,
    /// Script injected into HTML pages (`None` when live reload is off).
    pub(crate) reload_script: Option<String>,
    /// Live reload session registry (if enabled).
    pub(crate) hub: Option<Arc<ReloadHub>>,
    /// Flips to `true` when the server shuts down.
    pub(crate) shutdown: watch::Receiver<bool>,
}
