//! HTTP routes for the development server.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use pagekit_core::path_utils::safe_join;
use pagekit_core::ServerOptions;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::client::{self, CLIENT_PATH, EVENTS_PATH};
use crate::message::ReloadMessage;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    options: Arc<ServerOptions>,
    events: broadcast::Sender<ReloadMessage>,
    closing: watch::Receiver<bool>,
}

impl AppState {
    /// `closing` flips to `true` when the server begins shutting down, which
    /// ends every open event stream.
    pub fn new(
        options: ServerOptions,
        events: broadcast::Sender<ReloadMessage>,
        closing: watch::Receiver<bool>,
    ) -> Self {
        Self {
            options: Arc::new(options),
            events,
            closing,
        }
    }
}

/// Creates the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(CLIENT_PATH, get(client_script))
        .route(EVENTS_PATH, get(reload_events))
        .fallback(serve_static)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /__pagekit/client.js
async fn client_script(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        client::script(state.options.notify),
    )
        .into_response()
}

/// GET /__pagekit/events
///
/// One server-sent event per reload message, as JSON in the `data` field.
async fn reload_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    debug!("Live reload client connected");

    let stream = stream::unfold(
        (receiver, state.closing),
        |(mut receiver, mut closing)| async move {
            loop {
                tokio::select! {
                    _ = closing.changed() => return None,
                    message = receiver.recv() => match message {
                        Ok(message) => {
                            let event = Event::default().data(message.to_json());
                            return Some((Ok(event), (receiver, closing)));
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!("Live reload client skipped {} message(s)", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    },
                }
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Everything else: route overrides first, then the static roots in order.
async fn serve_static(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, ServerError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ServerError::MethodNotAllowed);
    }

    let request = percent_decode(uri.path())
        .ok_or_else(|| ServerError::BadRequest(format!("Malformed path: {}", uri.path())))?;
    let file = resolve(&state.options, &request)
        .await?
        .ok_or(ServerError::NotFound)?;

    let bytes = tokio::fs::read(&file)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to read {}: {}", file.display(), e)))?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let body = if mime.type_() == mime_guess::mime::TEXT && mime.subtype() == "html" {
        client::inject(&String::from_utf8_lossy(&bytes)).into_bytes()
    } else {
        bytes
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(body))
        .map_err(|e| ServerError::Internal(format!("Failed to create response: {}", e)))
}

/// Maps a decoded request path to a file on disk.
///
/// Directories resolve to their `index.html`. A route override that misses
/// falls through to the static roots.
pub async fn resolve(
    options: &ServerOptions,
    request: &str,
) -> Result<Option<PathBuf>, ServerError> {
    if request.split('/').any(|segment| segment == "..") {
        return Err(ServerError::BadRequest(format!(
            "Path escapes the served roots: {}",
            request
        )));
    }

    for (prefix, dir) in &options.routes {
        let prefix = prefix.trim_end_matches('/');
        let Some(rest) = request.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(found) = existing(dir, rest).await? {
                return Ok(Some(found));
            }
        }
    }

    for root in &options.static_roots {
        if let Some(found) = existing(root, request).await? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

async fn existing(root: &Path, request: &str) -> Result<Option<PathBuf>, ServerError> {
    let candidate = safe_join(root, request)
        .ok_or_else(|| ServerError::BadRequest(format!("Invalid path: {}", request)))?;

    match tokio::fs::metadata(&candidate).await {
        Ok(meta) if meta.is_dir() => {
            let index = candidate.join("index.html");
            Ok(tokio::fs::metadata(&index)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
                .then_some(index))
        }
        Ok(meta) if meta.is_file() => Ok(Some(candidate)),
        _ => Ok(None),
    }
}

fn percent_decode(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = path.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Server error types.
#[derive(Debug)]
pub enum ServerError {
    BadRequest(String),
    NotFound,
    MethodNotAllowed,
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ServerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Only GET and HEAD are served".to_string(),
            ),
            ServerError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = axum::Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/a%20b.html").as_deref(), Some("/a b.html"));
        assert_eq!(percent_decode("/plain").as_deref(), Some("/plain"));
        assert_eq!(percent_decode("/%2e%2e/x").as_deref(), Some("/../x"));
        assert!(percent_decode("/bad%zz").is_none());
        assert!(percent_decode("/short%2").is_none());
    }
}
