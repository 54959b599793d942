// src/serve.rs

//! HTTP content server for the merged output.
//!
//! Every request path serves the same resource: the current bytes of the
//! output file. The file is stat'ed per request, so a rebuild is visible to
//! the next request without any coordination with the watch session.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, info, warn};

use crate::errors::{MergewatchError, Result};
use crate::types::FileSnapshot;
use crate::watch::ShutdownSignal;

/// The merged output as an HTTP resource.
#[derive(Debug, Clone)]
pub struct MergedFile {
    path: Arc<PathBuf>,
}

impl MergedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Router serving `output` on every path.
pub fn router(output: impl Into<PathBuf>) -> Router {
    Router::new()
        .fallback(serve_merged)
        .with_state(MergedFile::new(output))
}

/// Bind `addr` and serve until `shutdown` fires.
pub async fn serve(output: PathBuf, addr: SocketAddr, shutdown: ShutdownSignal) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(MergewatchError::Serve)?;
    let local = listener.local_addr().map_err(MergewatchError::Serve)?;

    info!(addr = %local, output = ?output, "serving merged output");

    axum::serve(listener, router(output))
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await
        .map_err(MergewatchError::Serve)?;

    info!("server stopped");
    Ok(())
}

async fn serve_merged(State(file): State<MergedFile>, req: Request) -> Response {
    let snapshot = match tokio::fs::metadata(file.path()).await {
        Ok(meta) => FileSnapshot::from_metadata(&meta),
        Err(e) => return stat_error_response(&file, e),
    };

    let etag = snapshot.etag();
    let etag_value = match HeaderValue::from_str(&etag) {
        Ok(v) => v,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    if etag_matches(req.headers(), &etag) {
        debug!(uri = %req.uri(), %etag, "not modified");
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag_value)]).into_response();
    }

    let uri = req.uri().clone();
    let mut response = match ServeFile::new(file.path()).oneshot(req).await {
        Ok(res) => res.map(Body::new),
        Err(never) => match never {},
    };

    if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
        response.headers_mut().insert(header::ETAG, etag_value);
    }

    debug!(%uri, status = %response.status(), size = snapshot.len, "served merged output");
    response
}

fn stat_error_response(file: &MergedFile, err: io::Error) -> Response {
    if err.kind() == io::ErrorKind::NotFound {
        debug!(path = ?file.path(), "merged output does not exist");
        (StatusCode::NOT_FOUND, "merged output not found").into_response()
    } else {
        warn!(path = ?file.path(), error = %err, "cannot stat merged output");
        (StatusCode::INTERNAL_SERVER_ERROR, "cannot read merged output").into_response()
    }
}

/// Whether `If-None-Match` lists `etag` (or `*`).
fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}
