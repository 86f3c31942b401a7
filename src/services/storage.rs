//! Google Cloud Storage operations: signed URLs, raw URLs, object writes.

use cloud_storage::Client;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("filename must not be empty")]
    EmptyObjectName,
    #[error("{0}")]
    Backend(String),
}

impl From<cloud_storage::Error> for StorageError {
    fn from(err: cloud_storage::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Public (unsigned) URL for an object in a bucket.
pub fn raw_object_url(bucket: &str, filename: &str) -> String {
    format!("https://storage.googleapis.com/{bucket}/{filename}")
}

/// GCS-backed object store.
///
/// The `cloud-storage` crate reads its signing credentials from
/// `SERVICE_ACCOUNT_JSON`, which `main` injects before construction.
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            bucket: bucket.into(),
        }
    }

    /// Public (unsigned) URL for an object, no signature component.
    pub fn raw_url(&self, filename: &str) -> String {
        raw_object_url(&self.bucket, filename)
    }

    /// Generate a signed download URL expiring `ttl_secs` from now.
    pub async fn signed_url(&self, filename: &str, ttl_secs: u32) -> StorageResult<String> {
        if filename.trim().is_empty() {
            return Err(StorageError::EmptyObjectName);
        }

        let object = self.client.object().read(&self.bucket, filename).await?;
        Ok(object.download_url(ttl_secs)?)
    }

    /// Signed and raw URLs for an object, in that order.
    pub async fn object_urls(
        &self,
        filename: &str,
        ttl_secs: u32,
    ) -> StorageResult<(String, String)> {
        let signed = self.signed_url(filename, ttl_secs).await?;
        Ok((signed, self.raw_url(filename)))
    }

    /// Write an object into the bucket.
    pub async fn store(
        &self,
        filename: &str,
        contents: Vec<u8>,
        mime_type: &str,
    ) -> StorageResult<()> {
        if filename.trim().is_empty() {
            return Err(StorageError::EmptyObjectName);
        }

        self.client
            .object()
            .create(&self.bucket, contents, filename, mime_type)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_urls_have_no_signature_component() {
        assert_eq!(
            raw_object_url("my-bucket", "report.pdf"),
            "https://storage.googleapis.com/my-bucket/report.pdf"
        );
    }

    #[test]
    fn raw_urls_preserve_nested_object_paths() {
        assert_eq!(
            raw_object_url("my-bucket", "exports/2024/report.pdf"),
            "https://storage.googleapis.com/my-bucket/exports/2024/report.pdf"
        );
    }
}
