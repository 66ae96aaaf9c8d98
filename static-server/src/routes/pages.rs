use crate::routes::SiteRoot;
use crate::utils::file::{content_type_for, resolve_request_path, safe_join, INDEX_PAGE};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

async fn pick_file(root: &Path, request_path: &str) -> PathBuf {
    let relative = resolve_request_path(request_path);

    match safe_join(root, &relative) {
        Some(path) if is_file(&path).await => path,
        _ => {
            debug!("{} not found, serving {}", request_path, INDEX_PAGE);
            root.join(INDEX_PAGE)
        }
    }
}

pub async fn serve_path(State(root): State<SiteRoot>, uri: Uri) -> Response {
    let path = pick_file(&root, uri.path()).await;

    match fs::read(&path).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&path))],
            content,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // The file vanished between the existence check and the read.
            match fs::read(root.join(INDEX_PAGE)).await {
                Ok(content) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/html")],
                    content,
                )
                    .into_response(),
                Err(e) => {
                    error!("Failed to read {}: {}", INDEX_PAGE, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Error loading index.html").into_response()
                }
            }
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server Error: {:?}", e.kind()),
            )
                .into_response()
        }
    }
}
