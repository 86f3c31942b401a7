//! Firestore document endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::AppState;
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/data-firestore-sdk/{data}", post(add_document))
        .route("/data-firestore-sdk", get(list_documents))
        .route("/data-firestore-url-unsigned", get(list_documents_public))
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct DataResponse {
    data: Vec<Map<String, Value>>,
}

/// POST /data-firestore-sdk/{data} - Append a document with a server timestamp
async fn add_document(
    State(state): State<Arc<AppState>>,
    Path(data): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.firestore.add_document(&data).await?;
    Ok(Json(MessageResponse {
        message: "document stored with timestamp",
    }))
}

/// GET /data-firestore-sdk - List every document in the collection
async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    let data = state.firestore.list_documents().await?;
    Ok(Json(DataResponse { data }))
}

/// GET /data-firestore-url-unsigned - Read the collection through the public
/// REST URL and return each document's raw field map
async fn list_documents_public(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    let data = state.firestore.fetch_public_documents().await?;
    Ok(Json(DataResponse { data }))
}
