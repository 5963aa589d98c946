//! Development content serving.
//!
//! Resolves request paths against the source tree first and the assets tree
//! second. HTML pages from the source tree get the live reload script
//! injected; everything else is streamed as-is.
//!
//! Resolved files must stay inside their root after canonicalization, so
//! `..` segments and symlinks pointing outside the tree are answered with
//! 404 like any other missing file.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::live_reload::inject_reload_script;
use crate::state::AppState;

/// Page served for the root path and for directory requests.
const INDEX_FILE: &str = "index.html";

/// URL prefix of the assets tree.
const ASSETS_PREFIX: &str = "assets/";

/// Tree a request was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    Source,
    Assets,
}

/// A request path mapped onto a file on disk.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) path: PathBuf,
    pub(crate) origin: Origin,
}

impl Resolved {
    fn is_html(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "html")
    }
}

/// Percent-decode a request path and strip the leading slash.
///
/// The empty path maps to `index.html`.
fn decode_request_path(uri_path: &str) -> Option<String> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let trimmed = decoded.trim_start_matches('/');
    if trimmed.is_empty() {
        Some(INDEX_FILE.to_owned())
    } else {
        Some(trimmed.to_owned())
    }
}

/// Turn a decoded request path into a relative filesystem path.
///
/// Rejects anything that is not a plain descending path.
fn relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}

/// Canonicalize `root.join(relative)` and check it stays under `root`.
async fn contained(root: &Path, relative: &Path) -> Option<PathBuf> {
    let candidate = tokio::fs::canonicalize(root.join(relative)).await.ok()?;
    if candidate.starts_with(root) {
        Some(candidate)
    } else {
        tracing::warn!(path = %candidate.display(), root = %root.display(), "Refusing to serve file outside root");
        None
    }
}

/// Find the file `relative` names inside `root`, using `index.html` for directories.
async fn find_file(root: &Path, relative: &Path) -> Option<PathBuf> {
    let root = tokio::fs::canonicalize(root).await.ok()?;
    let candidate = contained(&root, relative).await?;
    let metadata = tokio::fs::metadata(&candidate).await.ok()?;

    if metadata.is_file() {
        return Some(candidate);
    }
    if metadata.is_dir() {
        let index = contained(&root, &candidate.strip_prefix(&root).ok()?.join(INDEX_FILE)).await?;
        return tokio::fs::metadata(&index)
            .await
            .is_ok_and(|m| m.is_file())
            .then_some(index);
    }
    None
}

/// Resolve a request path against the source tree, then the assets tree.
pub(crate) async fn resolve(
    source_dir: &Path,
    assets_dir: &Path,
    uri_path: &str,
) -> Option<Resolved> {
    let decoded = decode_request_path(uri_path)?;

    let relative = relative_path(&decoded)?;
    if let Some(path) = find_file(source_dir, &relative).await {
        return Some(Resolved {
            path,
            origin: Origin::Source,
        });
    }

    let asset = decoded.strip_prefix(ASSETS_PREFIX).unwrap_or(&decoded);
    let relative = relative_path(asset)?;
    find_file(assets_dir, &relative).await.map(|path| Resolved {
        path,
        origin: Origin::Assets,
    })
}

/// Serve a development request.
pub(crate) async fn serve_content(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let uri_path = req.uri().path().to_owned();
    let Some(resolved) = resolve(&state.source_dir, &state.assets_dir, &uri_path).await else {
        tracing::debug!(path = %uri_path, "Not found");
        return not_found();
    };

    match resolved.origin {
        Origin::Source if resolved.is_html() => {
            serve_html(&resolved.path, state.reload_script.as_deref()).await
        }
        Origin::Source => serve_file(&resolved.path, req).await,
        Origin::Assets => {
            let mut response = serve_file(&resolved.path, req).await;
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            response
        }
    }
}

/// Read an HTML page and inject the reload script before `</body>`.
async fn serve_html(path: &Path, reload_script: Option<&str>) -> Response {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read page");
            return not_found();
        }
    };

    let body = match reload_script {
        Some(script) => inject_reload_script(&content, script).into_owned(),
        None => content,
    };

    (
        [
            (header::CONTENT_TYPE, "text/html"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Stream a file with content type inferred from its extension.
async fn serve_file(path: &Path, req: Request) -> Response {
    match ServeFile::new(path).oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}
