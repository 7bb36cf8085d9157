//! Image materialization: decode an embedded payload and write it to a
//! stable, addressable location under the artifact store.
//!
//! Naming is deliberately independent of the embedded id: ids are only
//! unique within a page, so the file name carries a document-scoped
//! sequence number (`{base}_page{N}_img_{seq}{ext}`) assigned by the
//! normalizer. The id contributes nothing but the extension hint.

use crate::error::ImageError;
use crate::model::MaterializedImage;
use crate::store::ArtifactStore;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// Decode a base64 payload, stripping any `data:…;base64,` prefix first.
pub fn decode_payload(id: &str, payload: &str) -> Result<Vec<u8>, ImageError> {
    let raw = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, b64)| b64).unwrap_or(rest),
        None => payload,
    };
    STANDARD.decode(raw.trim()).map_err(|e| ImageError::Decode {
        id: id.to_string(),
        detail: e.to_string(),
    })
}

/// Extension for the materialized file, derived from the id's suffix.
/// Defaults to `.png` when the id carries none.
pub fn inferred_extension(id: &str) -> String {
    match Path::new(id).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{ext}"),
        _ => ".png".to_string(),
    }
}

/// Write one decoded image under the store and return its addressable names.
///
/// Fails with [`ImageError::Write`] on I/O failure; the caller treats that
/// as a skippable per-image failure, never a document-level one.
pub fn materialize(
    store: &ArtifactStore,
    base_name: &str,
    page_index: usize,
    sequence_number: usize,
    bytes: &[u8],
    extension: &str,
) -> Result<MaterializedImage, ImageError> {
    let file_name = format!("{base_name}_page{page_index}_img_{sequence_number}{extension}");
    let path = store.image_path(base_name, &file_name);

    std::fs::write(&path, bytes).map_err(|source| ImageError::Write {
        path: path.clone(),
        source,
    })?;
    debug!("Wrote image {} ({} bytes)", path.display(), bytes.len());

    Ok(MaterializedImage {
        relative_path: store.image_relative_path(base_name, &file_name),
        file_name,
        page_index,
        sequence_number,
    })
}
