//! Application constants

/// Signed URL expiry for browse links (`/url/{filename}`)
pub const BROWSE_URL_TTL_SECS: u32 = 30;

/// Signed URL expiry for direct downloads (consumed immediately by the redirect)
pub const DOWNLOAD_URL_TTL_SECS: u32 = 5;

/// Firestore collection holding appended documents
pub const DOCUMENT_COLLECTION: &str = "queries";

/// Maximum upload size accepted by the upload endpoints (32 MB)
pub const MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024;
