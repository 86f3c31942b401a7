//! Signed/raw URL endpoints and download redirects.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::{BROWSE_URL_TTL_SECS, DOWNLOAD_URL_TTL_SECS};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/url/{filename}", get(object_urls))
        .route("/download-signed/{filename}", get(download_signed))
        .route("/download-unsigned/{filename}", get(download_unsigned))
}

#[derive(Serialize)]
struct UrlResponse {
    signed_url: String,
    raw_url: String,
}

/// GET /url/{filename} - Signed and raw URLs for an object
async fn object_urls(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<UrlResponse>, ApiError> {
    let (signed_url, raw_url) = state
        .store
        .object_urls(&filename, BROWSE_URL_TTL_SECS)
        .await?;
    Ok(Json(UrlResponse {
        signed_url,
        raw_url,
    }))
}

/// Redirect to `url` with attachment headers so the client saves the file.
fn attachment_redirect(filename: &str, url: &str) -> impl IntoResponse + use<> {
    (
        [
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
        ],
        Redirect::temporary(url),
    )
}

/// GET /download-signed/{filename} - Redirect to a short-lived signed URL
async fn download_signed(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let url = state
        .store
        .signed_url(&filename, DOWNLOAD_URL_TTL_SECS)
        .await?;
    Ok(attachment_redirect(&filename, &url))
}

/// GET /download-unsigned/{filename} - Redirect to the public raw URL
async fn download_unsigned(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("filename must not be empty"));
    }
    Ok(attachment_redirect(&filename, &state.store.raw_url(&filename)))
}
