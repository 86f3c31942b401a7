mod config;
mod constants;
mod routes;
mod services;
mod sniff;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use config::Config;
use constants::{DOCUMENT_COLLECTION, MAX_UPLOAD_SIZE};
use services::firestore::FirestoreClient;
use services::storage::ObjectStore;

/// Shared backend handles, read-only after startup.
pub struct AppState {
    pub store: ObjectStore,
    pub firestore: FirestoreClient,
}

/// GET /health - Liveness probe
async fn health() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine in deployed environments; variables come from
    // the process environment there.
    let _ = dotenvy::dotenv();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;

    // The cloud-storage crate reads signing credentials from the
    // environment, so the credential document assembled from the
    // individual FIREBASE_* fields is injected here.
    // Safety: happens during startup, before any request can read the
    // environment concurrently.
    let credentials = config.service_account_json()?;
    unsafe { std::env::set_var("SERVICE_ACCOUNT_JSON", credentials) };

    let store = ObjectStore::new(config.bucket_name.clone());
    let firestore = FirestoreClient::new(config.service_account.clone(), DOCUMENT_COLLECTION);
    let state = Arc::new(AppState { store, firestore });

    let app = routes::build_routes()
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await.context("server failed")
}
