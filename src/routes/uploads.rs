//! Upload endpoints.
//!
//! The multipart endpoints are demo-only: they read the payload fully and
//! echo the filename back without persisting anything. The base64 JSON
//! endpoint is the real ingestion path.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::services::error::ApiError;
use crate::sniff::{self, SniffError};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload-signed", post(upload_signed))
        .route("/upload-unsigned", post(upload_unsigned))
        .route("/upload-base64", post(upload_base64))
}

#[derive(Serialize)]
struct UploadEcho {
    message: &'static str,
    file: String,
}

/// Read the `file` field of a multipart request fully into memory,
/// returning the filename and payload size.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, usize), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("file").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read file field: {e}")))?;
        return Ok((filename, bytes.len()));
    }
    Err(ApiError::bad_request("missing multipart field: file"))
}

/// POST /upload-signed - Accept a multipart upload and echo the filename
async fn upload_signed(multipart: Multipart) -> Result<Json<UploadEcho>, ApiError> {
    let (file, size) = read_file_field(multipart).await?;
    tracing::debug!(file, size, "received upload (signed variant, not persisted)");
    Ok(Json(UploadEcho {
        message: "file received",
        file,
    }))
}

/// POST /upload-unsigned - Accept a multipart upload and echo the filename
async fn upload_unsigned(multipart: Multipart) -> Result<Json<UploadEcho>, ApiError> {
    let (file, size) = read_file_field(multipart).await?;
    tracing::debug!(file, size, "received upload (unsigned variant, not persisted)");
    Ok(Json(UploadEcho {
        message: "file received",
        file,
    }))
}

#[derive(Deserialize)]
struct UploadRequest {
    file_name: Option<String>,
    base64_data: String,
}

#[derive(Serialize)]
struct UrlFile {
    url: String,
}

/// POST /upload-base64 - Decode a base64 payload, sniff its type, store the
/// object, and return its public URL
async fn upload_base64(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UrlFile>), ApiError> {
    let decoded = sniff::decode_base64_file(&payload.base64_data).map_err(|e| match e {
        SniffError::UnsupportedFormat => {
            ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
        }
        SniffError::InvalidPayload(_) => ApiError::bad_request(e.to_string()),
    })?;

    let base_name = payload
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(sniff::random_object_name);
    let object_name = format!("{}{}", base_name, decoded.extension);

    state
        .store
        .store(&object_name, decoded.contents, decoded.mime_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UrlFile {
            url: state.store.raw_url(&object_name),
        }),
    ))
}
