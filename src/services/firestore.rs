//! Firestore document access over the REST API.
//!
//! Documents are read and written through the public
//! `firestore.googleapis.com` JSON API, authenticated with a short-lived
//! OAuth token minted from the service-account key. The token is cached on
//! the client and refreshed shortly before expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::ServiceAccount;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Access tokens are refreshed this long before their reported expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Page size used when scanning a collection.
const LIST_PAGE_SIZE: u32 = 300;

pub type FirestoreResult<T> = Result<T, FirestoreError>;

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Firestore rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected response shape: {0}")]
    BadResponse(&'static str),
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct FirestoreClient {
    http: reqwest::Client,
    credentials: ServiceAccount,
    collection: String,
    token: Mutex<Option<CachedToken>>,
}

impl FirestoreClient {
    pub fn new(credentials: ServiceAccount, collection: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            collection: collection.into(),
            token: Mutex::new(None),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents/{}",
            self.credentials.project_id, self.collection
        )
    }

    /// Mint (or reuse) an OAuth access token for the datastore scope.
    async fn access_token(&self) -> FirestoreResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.token.clone());
            }
        }

        let now = Utc::now();
        let claims = TokenClaims {
            iss: &self.credentials.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.credentials.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FirestoreError::Rejected(
                response.text().await.unwrap_or_default(),
            ));
        }
        let token: TokenResponse = response.json().await?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(access_token)
    }

    /// Append a document carrying the caller's payload and a server timestamp.
    pub async fn add_document(&self, data: &str) -> FirestoreResult<()> {
        let token = self.access_token().await?;
        let body = json!({
            "fields": {
                "queryData": { "stringValue": data },
                "timestamp": { "timestampValue": Utc::now().to_rfc3339() },
            }
        });

        let response = self
            .http
            .post(self.documents_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FirestoreError::Rejected(
                response.text().await.unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// List every document in the collection, decoded to plain JSON maps
    /// with the document id included.
    ///
    /// Full unbounded scan: follows `nextPageToken` until exhausted.
    pub async fn list_documents(&self) -> FirestoreResult<Vec<Map<String, Value>>> {
        let token = self.access_token().await?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.documents_url())
                .bearer_auth(&token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref next) = page_token {
                request = request.query(&[("pageToken", next.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(FirestoreError::Rejected(
                    response.text().await.unwrap_or_default(),
                ));
            }
            let page: Value = response.json().await?;

            if let Some(docs) = page.get("documents").and_then(Value::as_array) {
                for doc in docs {
                    documents.push(decode_document(doc)?);
                }
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(next) => page_token = Some(next.to_string()),
                None => break,
            }
        }

        Ok(documents)
    }

    /// Fetch the collection through the public REST URL without credentials
    /// and keep only each document's raw `fields` map.
    pub async fn fetch_public_documents(&self) -> FirestoreResult<Vec<Map<String, Value>>> {
        let response = self.http.get(self.documents_url()).send().await?;
        if !response.status().is_success() {
            return Err(FirestoreError::Rejected(
                response.text().await.unwrap_or_default(),
            ));
        }
        let body: Value = response.json().await?;
        Ok(sanitize_documents(&body))
    }
}

/// Decode a Firestore document resource into a plain JSON map with its id.
fn decode_document(doc: &Value) -> FirestoreResult<Map<String, Value>> {
    let mut decoded = Map::new();
    if let Some(fields) = doc.get("fields").and_then(Value::as_object) {
        for (name, value) in fields {
            decoded.insert(name.clone(), decode_value(value));
        }
    }

    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or(FirestoreError::BadResponse("document without a name"))?;
    let id = name.rsplit('/').next().unwrap_or(name);
    decoded.insert("id".to_string(), Value::String(id.to_string()));

    Ok(decoded)
}

/// Map a Firestore typed value onto plain JSON.
fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return value.clone();
    };
    let Some((kind, inner)) = map.iter().next() else {
        return value.clone();
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" | "doubleValue"
        | "booleanValue" => inner.clone(),
        // Firestore serializes 64-bit integers as strings
        "integerValue" => inner
            .as_str()
            .and_then(|v| v.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "nullValue" => Value::Null,
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => {
            let mut object = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_object) {
                for (name, nested) in fields {
                    object.insert(name.clone(), decode_value(nested));
                }
            }
            Value::Object(object)
        }
        _ => value.clone(),
    }
}

/// Keep only the `fields` object of each document in a REST listing.
fn sanitize_documents(body: &Value) -> Vec<Map<String, Value>> {
    body.get("documents")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .filter_map(|doc| doc.get("fields").and_then(Value::as_object).cloned())
                .collect()
        })
        .unwrap_or_default()
}
