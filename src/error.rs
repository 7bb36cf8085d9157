//! Error types for the docingest library.
//!
//! Three distinct error types reflect three distinct failure granularities:
//!
//! * [`IngestError`] — **Fatal**: the batch cannot proceed at all (output
//!   tree cannot be created, invalid configuration). Returned as
//!   `Err(IngestError)` from [`crate::batch::run_batch`].
//!
//! * [`DocumentError`] — **Per-document**: one input file failed (upload,
//!   OCR fetch, artifact write) but the rest of the batch is fine. Recorded
//!   as a `Failure` outcome; the source file is copied to the error archive
//!   and processing continues.
//!
//! * [`ImageError`] — **Per-image**: one embedded image could not be decoded
//!   or written. The image is skipped, its placeholder is left untouched,
//!   and the document still succeeds.
//!
//! The separation lets each layer recover at exactly its own granularity:
//! an unreadable image never fails a document, and a failing document never
//! aborts the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort the whole batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The output root tree could not be created or written.
    #[error("Failed to create output tree at '{path}': {source}\nCheck the path is writable.")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single document.
///
/// Converted into a `ProcessingOutcome::Failure` by the batch runner;
/// never propagated into the batch loop's control flow.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input file could not be read from disk.
    #[error("Failed to read input '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload call to the OCR service failed.
    #[error("Upload to OCR service failed: {detail}")]
    Upload { detail: String },

    /// The access-URL or OCR call failed, or the response was malformed.
    #[error("OCR fetch failed: {detail}")]
    Fetch { detail: String },

    /// An artifact (JSON, markdown, archive copy) could not be written.
    #[error("Failed to write artifact '{path}': {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal error for a single embedded image.
///
/// The normalizer logs these and continues; the failed image's placeholder
/// stays unrewritten in the page markdown.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The base64 payload could not be decoded.
    #[error("Image '{id}': invalid base64 payload: {detail}")]
    Decode { id: String, detail: String },

    /// The decoded bytes could not be written to disk.
    #[error("Failed to write image '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_display_includes_path() {
        let e = IngestError::Storage {
            path: PathBuf::from("/no/such/root"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/no/such/root"), "got: {msg}");
    }

    #[test]
    fn upload_display() {
        let e = DocumentError::Upload {
            detail: "HTTP 503".into(),
        };
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn decode_display_includes_id() {
        let e = ImageError::Decode {
            id: "img-0.jpeg".into(),
            detail: "invalid padding".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("img-0.jpeg"));
        assert!(msg.contains("invalid padding"));
    }
}
