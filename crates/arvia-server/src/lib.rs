//! HTTP servers for Arvia.
//!
//! This crate provides the development server behind `arvia serve` and the
//! static preview server behind `arvia preview`, both built on axum.
//!
//! The development server:
//! - serves the source tree, falling back to the assets tree under `/assets/`
//! - injects a live reload script into HTML pages
//! - watches source and assets for writes and tells every open tab to reload
//!   over a WebSocket endpoint
//!
//! # Architecture
//!
//! ```text
//! notify ──► FileWatcher ──► DebounceGate ──► ReloadHub::broadcast
//!                                                   │
//! Browser ──HTTP──► axum                            ▼
//!                    ├─► /ws ─────────────► session per tab ──► "reload"
//!                    └─► content (source, then assets, then 404)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use arvia_config::ProjectConfig;
//! use arvia_server::{run_server, server_config_from_project};
//!
//! #[tokio::main]
//! async fn main() {
//!     let project = ProjectConfig::load(None, None).unwrap();
//!     run_server(server_config_from_project(&project)).await.unwrap();
//! }
//! ```

mod app;
mod content;
mod error;
mod live_reload;
mod preview;
mod state;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arvia_config::ProjectConfig;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use error::ServerError;
use live_reload::{FileWatcher, ReloadHub};
use state::AppState;

/// Development server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the pages.
    pub source_dir: PathBuf,
    /// Directory holding static assets.
    pub assets_dir: PathBuf,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Quiet interval between accepted changes, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            source_dir: PathBuf::from("src"),
            assets_dir: PathBuf::from("assets"),
            live_reload_enabled: true,
            debounce_ms: live_reload::DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Preview server configuration.
#[derive(Clone, Debug)]
pub struct PreviewConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Build output to serve.
    pub build_dir: PathBuf,
}

/// Create development server configuration from the project descriptor.
#[must_use]
pub fn server_config_from_project(config: &ProjectConfig) -> ServerConfig {
    ServerConfig {
        port: config.port,
        source_dir: config.source_dir.clone(),
        assets_dir: config.assets_dir.clone(),
        ..ServerConfig::default()
    }
}

/// Create preview server configuration from the project descriptor.
///
/// The preview listens one port above the development server so both can
/// run side by side.
#[must_use]
pub fn preview_config_from_project(config: &ProjectConfig) -> PreviewConfig {
    PreviewConfig {
        host: ServerConfig::default().host,
        port: config.port.saturating_add(1),
        build_dir: config.build_dir.clone(),
    }
}

/// Run the development server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or serving fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let listener = bind(&config.host, config.port).await?;
    serve(listener, config, shutdown_signal()).await
}

/// Run the development server on `listener` until `signal` completes.
///
/// On shutdown the listener stops accepting, the file watcher stops and
/// every live reload session is closed.
///
/// # Errors
///
/// Returns an error if serving fails.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let live_reload = if config.live_reload_enabled {
        start_live_reload(&config, shutdown_rx.clone())
    } else {
        None
    };
    let hub = live_reload.as_ref().map(|(hub, _)| Arc::clone(hub));

    let state = Arc::new(AppState {
        source_dir: config.source_dir.clone(),
        assets_dir: config.assets_dir.clone(),
        reload_script: hub
            .is_some()
            .then(|| live_reload::reload_script(local_addr.port())),
        hub: hub.clone(),
        shutdown: shutdown_rx,
    });

    let app = app::create_router(state);
    tracing::info!(
        address = %local_addr,
        source = %config.source_dir.display(),
        live_reload = hub.is_some(),
        "Starting server"
    );

    let trigger = async move {
        signal.await;
        let _ = shutdown_tx.send(true);
        if let Some(hub) = hub {
            hub.close_all();
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(trigger)
        .await?;

    if let Some((_, watcher)) = live_reload {
        let _ = watcher.await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Run the preview server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or serving fails.
pub async fn run_preview(config: PreviewConfig) -> Result<(), ServerError> {
    let listener = bind(&config.host, config.port).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        build = %config.build_dir.display(),
        "Starting preview server"
    );

    axum::serve(listener, preview::preview_router(config.build_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Start the watcher over source and assets and wire it to a new hub.
///
/// Returns `None` if the watcher cannot be created; serving continues
/// without live reload.
fn start_live_reload(
    config: &ServerConfig,
    shutdown: watch::Receiver<bool>,
) -> Option<(Arc<ReloadHub>, JoinHandle<()>)> {
    let hub = Arc::new(ReloadHub::new());
    let broadcaster = Arc::clone(&hub);

    let watcher = FileWatcher::new(
        vec![config.source_dir.clone(), config.assets_dir.clone()],
        Duration::from_millis(config.debounce_ms),
    );
    let on_change = move |_: &std::path::Path| {
        let sessions = broadcaster.broadcast();
        tracing::debug!(sessions, "Reload broadcast");
    };

    match watcher.start(on_change, shutdown) {
        Ok(handle) => Some((hub, handle)),
        Err(e) => {
            tracing::warn!(error = %e, "File watcher unavailable, live reload disabled");
            None
        }
    }
}

/// Bind a TCP listener, resolving `host` if needed.
async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| ServerError::Bind {
            address: format!("{host}:{port}"),
            source,
        })
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
