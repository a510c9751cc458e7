//! Static pages from the configured directory.
//!
//! Registered as the router fallback, so any path no API route claims is
//! looked up on disk. Paths are taken literally (no percent-decoding).

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use http::StatusCode;
use tokio::fs;
use tracing::{error, warn};

use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::state::AppState;

const INDEX: &str = "index.html";

pub async fn serve(req: Request, state: Arc<AppState>) -> Response {
    if !matches!(req.method(), Method::Get | Method::Head) {
        return Response::error(StatusCode::NOT_FOUND, "Not found");
    }

    let Some(path) = resolve(&state.config.static_dir, req.path()) else {
        warn!(path = req.path(), "rejected static path");
        return Response::error(StatusCode::BAD_REQUEST, "Invalid path");
    };

    match read(&path).await {
        Ok((path, body)) => {
            let content_type = path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(ContentType::OctetStream, ContentType::from_extension);
            Response::builder().bytes(content_type, body)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Response::error(StatusCode::NOT_FOUND, "Not found")
        }
        Err(e) => {
            error!(path = %path.display(), "failed to read static file: {e}");
            Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file")
        }
    }
}

/// Maps a request path onto a file below `root`. `None` for anything that
/// could escape it: `..`, backslashes, drive prefixes.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    if request_path.contains('\\') {
        return None;
    }

    let mut path = root.to_path_buf();
    for segment in request_path.split('/').filter(|s| !s.is_empty()) {
        match Path::new(segment).components().next() {
            Some(Component::Normal(part)) if Path::new(segment).components().count() == 1 => {
                path.push(part);
            }
            Some(Component::CurDir) => {}
            _ => return None,
        }
    }

    if request_path.ends_with('/') || path == root {
        path.push(INDEX);
    }
    Some(path)
}

/// Reads `path`, or `path/index.html` when it is a directory.
async fn read(path: &Path) -> io::Result<(PathBuf, Vec<u8>)> {
    let path = if fs::metadata(path).await?.is_dir() {
        path.join(INDEX)
    } else {
        path.to_path_buf()
    };
    let body = fs::read(&path).await?;
    Ok((path, body))
}
