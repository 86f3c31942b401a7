pub mod documents;
pub mod files;
pub mod uploads;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(documents::routes())
        .merge(files::routes())
        .merge(uploads::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::sample_account;
    use crate::constants::DOCUMENT_COLLECTION;
    use crate::services::firestore::FirestoreClient;
    use crate::services::storage::ObjectStore;

    fn test_app() -> Router {
        let state = Arc::new(AppState {
            store: ObjectStore::new("test-bucket"),
            firestore: FirestoreClient::new(sample_account(), DOCUMENT_COLLECTION),
        });
        build_routes().with_state(state)
    }

    #[tokio::test]
    async fn blank_filenames_are_rejected() {
        for uri in ["/url/%20", "/download-signed/%20", "/download-unsigned/%20"] {
            let response = test_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn unsupported_base64_payloads_are_rejected() {
        let body = serde_json::json!({ "base64_data": "R0lGODlh" }).to_string();
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload-base64")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    fn multipart_request(uri: &str, field_name: &str, filename: &str) -> Request<Body> {
        let body = format!(
            "--BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             payload bytes\r\n\
             --BOUNDARY--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn multipart_uploads_echo_the_filename() {
        for uri in ["/upload-signed", "/upload-unsigned"] {
            let response = test_app()
                .oneshot(multipart_request(uri, "file", "report.pdf"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["file"], "report.pdf");
        }
    }

    #[tokio::test]
    async fn uploads_without_a_file_field_are_rejected() {
        let response = test_app()
            .oneshot(multipart_request("/upload-signed", "attachment", "x.bin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
