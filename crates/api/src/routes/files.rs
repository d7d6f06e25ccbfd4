//! Static media serving for uploaded files.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::app::AppState;
use crate::services::storage;

/// GET /media/*path
///
/// Serves a file from the media directory. Paths that try to escape the
/// directory resolve to nothing and answer 404 like any missing file.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Response {
    let resolved = match storage::resolve_media_path(&state.config.storage.media_dir, &path) {
        Some(resolved) => resolved,
        None => return StatusCode::NOT_FOUND.into_response(),
    };

    match tokio::fs::read(&resolved).await {
        Ok(bytes) => {
            let content_type = storage::content_type_for(&path);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CACHE_CONTROL, "private, max-age=3600"),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read media file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
