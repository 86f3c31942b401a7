//! Base64 payload sniffing and object naming for the upload flow.
//!
//! Uploaded payloads arrive base64-encoded with no declared content type;
//! the type is recovered by matching the encoded prefix against a small
//! table of known file signatures.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use thiserror::Error;

/// Known base64-encoded file signatures: (encoded prefix, MIME type, extension).
const SIGNATURES: [(&str, &str, &str); 3] = [
    ("JVBERi0", "application/pdf", ".pdf"),
    ("iVBORw0KGgo", "image/png", ".png"),
    ("/9j/", "image/jpeg", ".jpg"),
];

/// Length of generated object names
const OBJECT_NAME_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum SniffError {
    #[error("unsupported base64 format")]
    UnsupportedFormat,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// A decoded upload payload with its sniffed type.
#[derive(Debug)]
pub struct DecodedFile {
    pub contents: Vec<u8>,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

fn detect(b64: &str) -> Option<(&'static str, &'static str)> {
    SIGNATURES
        .iter()
        .find(|(signature, _, _)| b64.starts_with(signature))
        .map(|(_, mime, ext)| (*mime, *ext))
}

/// Decode a base64 payload, sniffing its type from the encoded prefix.
pub fn decode_base64_file(b64: &str) -> Result<DecodedFile, SniffError> {
    let (mime_type, extension) = detect(b64).ok_or(SniffError::UnsupportedFormat)?;
    let contents = STANDARD.decode(b64)?;
    Ok(DecodedFile {
        contents,
        mime_type,
        extension,
    })
}

/// Generate a random 128-character alphanumeric object name.
pub fn random_object_name() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..OBJECT_NAME_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_pdf_payloads() {
        let b64 = STANDARD.encode(b"%PDF-1.4 minimal document");
        let decoded = decode_base64_file(&b64).unwrap();
        assert_eq!(decoded.mime_type, "application/pdf");
        assert_eq!(decoded.extension, ".pdf");
        assert_eq!(decoded.contents, b"%PDF-1.4 minimal document");
    }

    #[test]
    fn sniffs_png_payloads() {
        let b64 = STANDARD.encode([0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        let decoded = decode_base64_file(&b64).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.extension, ".png");
    }

    #[test]
    fn sniffs_jpeg_payloads() {
        let b64 = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        let decoded = decode_base64_file(&b64).unwrap();
        assert_eq!(decoded.mime_type, "image/jpeg");
        assert_eq!(decoded.extension, ".jpg");
    }

    #[test]
    fn rejects_unknown_signatures() {
        let b64 = STANDARD.encode(b"GIF89a not in the table");
        assert!(matches!(
            decode_base64_file(&b64),
            Err(SniffError::UnsupportedFormat)
        ));
    }

    #[test]
    fn rejects_corrupt_base64_after_a_known_prefix() {
        assert!(matches!(
            decode_base64_file("JVBERi0???"),
            Err(SniffError::InvalidPayload(_))
        ));
    }

    #[test]
    fn object_names_are_long_and_alphanumeric() {
        let name = random_object_name();
        assert_eq!(name.len(), 128);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
