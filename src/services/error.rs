//! Error responses for route handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::firestore::FirestoreError;
use super::storage::StorageError;

/// JSON error envelope returned by every failing endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// An HTTP error with a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Storage failures are classified by message substring; the backend does
/// not expose a structured error taxonomy for these cases.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyObjectName => Self::bad_request(err.to_string()),
            StorageError::Backend(message) => {
                if message.contains("token expired") {
                    Self::new(StatusCode::UNAUTHORIZED, "Token expired")
                } else if message.contains("no keys") {
                    Self::internal("No keys available")
                } else {
                    Self::internal(message)
                }
            }
        }
    }
}

impl From<FirestoreError> for ApiError {
    fn from(err: FirestoreError) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_tokens_map_to_unauthorized() {
        let err = ApiError::from(StorageError::Backend("oauth token expired".to_string()));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Token expired");
    }

    #[test]
    fn missing_keys_map_to_server_error() {
        let err = ApiError::from(StorageError::Backend("no keys available".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "No keys available");
    }

    #[test]
    fn other_backend_errors_keep_their_message() {
        let err = ApiError::from(StorageError::Backend("bucket does not exist".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "bucket does not exist");
    }

    #[test]
    fn empty_object_names_are_client_errors() {
        let err = ApiError::from(StorageError::EmptyObjectName);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
