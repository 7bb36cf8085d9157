//! Batch runner: discover input documents and drive each one through the
//! ingestion path, sequentially.
//!
//! Per-document lifecycle: discovered → uploaded → OCR result fetched →
//! normalized → persisted, or failed at any of those stages. A failure
//! copies the source file to the error archive and moves on — one bad
//! document never aborts the batch. Only a [`IngestError::Storage`] at
//! setup (output root unwritable) is fatal.
//!
//! Documents are processed one at a time; the only blocking operations are
//! the service calls and filesystem I/O. Re-running against the same output
//! tree overwrites the prior artifacts for each base name — a re-run is
//! authoritative, never a merge.

use crate::config::IngestConfig;
use crate::error::{DocumentError, IngestError};
use crate::model::{DocumentMeta, ProcessingOutcome, Summary};
use crate::pipeline::client::OcrClient;
use crate::pipeline::normalize;
use crate::store::ArtifactStore;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Enumerate processable documents directly in `input_dir`.
///
/// Files with an unrecognised extension are skipped silently. The result
/// is sorted by file name so batch order (and thus any order-sensitive
/// numbering) is reproducible regardless of filesystem enumeration order.
pub fn discover_documents(input_dir: &Path) -> std::io::Result<Vec<DocumentMeta>> {
    let mut documents = Vec::new();

    for entry in std::fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(meta) = DocumentMeta::from_path(&path)? {
            documents.push(meta);
        }
    }

    documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    // Base-name collisions across extensions share one artifact directory;
    // the later file overwrites the earlier one's artifacts.
    let mut seen = HashSet::new();
    for doc in &documents {
        if !seen.insert(doc.base_name.as_str()) {
            warn!(
                "Duplicate base name '{}': artifacts will be overwritten by the later file",
                doc.base_name
            );
        }
    }

    Ok(documents)
}

/// Run the whole batch. See [`run_batch_with`] for per-outcome observation.
pub async fn run_batch(
    config: &IngestConfig,
    client: &dyn OcrClient,
) -> Result<Vec<ProcessingOutcome>, IngestError> {
    run_batch_with(config, client, |_| {}).await
}

/// Run the whole batch, invoking `observe` after each document completes.
///
/// Returns one [`ProcessingOutcome`] per discovered document, in
/// processing order. Fatal only when the output tree cannot be created or
/// the input directory cannot be enumerated.
pub async fn run_batch_with<F>(
    config: &IngestConfig,
    client: &dyn OcrClient,
    mut observe: F,
) -> Result<Vec<ProcessingOutcome>, IngestError>
where
    F: FnMut(&ProcessingOutcome),
{
    let store = ArtifactStore::new(&config.output_root);
    store.ensure_layout()?;

    let documents =
        discover_documents(&config.input_dir).map_err(|source| IngestError::Storage {
            path: config.input_dir.clone(),
            source,
        })?;
    info!(
        "Found {} documents in {}",
        documents.len(),
        config.input_dir.display()
    );

    let mut outcomes = Vec::with_capacity(documents.len());

    for meta in documents {
        info!("Processing {} ({})", meta.file_name, meta.size_human());

        let outcome = match process_document(&meta, &store, client).await {
            Ok(summary) => ProcessingOutcome::Success { meta, summary },
            Err(e) => {
                warn!("{} failed: {e}", meta.file_name);
                archive_error(&store, &meta);
                ProcessingOutcome::Failure {
                    meta,
                    reason: e.to_string(),
                }
            }
        };

        observe(&outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Drive one document through upload, OCR, normalization, and persistence.
async fn process_document(
    meta: &DocumentMeta,
    store: &ArtifactStore,
    client: &dyn OcrClient,
) -> Result<Summary, DocumentError> {
    let start = Instant::now();
    let base = meta.base_name.as_str();

    store
        .ensure_document_dirs(base)
        .map_err(|source| DocumentError::Artifact {
            path: store.json_dir(base),
            source,
        })?;

    // ── Upload and fetch ─────────────────────────────────────────────────
    let bytes = std::fs::read(&meta.path).map_err(|source| DocumentError::Read {
        path: meta.path.clone(),
        source,
    })?;
    let handle = client.upload(bytes, &meta.file_name).await?;
    let url = client.get_access_url(&handle).await?;
    let response = client.run_ocr(&url).await?;
    info!("{}: OCR returned {} pages", meta.file_name, response.pages.len());

    // ── Persist the raw response ─────────────────────────────────────────
    let json_path = store.ocr_response_path(base);
    let pretty = serde_json::to_vec_pretty(&response).map_err(|e| DocumentError::Fetch {
        detail: format!("response not serialisable: {e}"),
    })?;
    std::fs::write(&json_path, pretty).map_err(|source| DocumentError::Artifact {
        path: json_path.clone(),
        source,
    })?;

    // ── Normalize: combined markdown + materialized images ───────────────
    let (markdown, images) = normalize::normalize_response(base, &response, store);

    let markdown_path = store.markdown_path(base);
    std::fs::write(&markdown_path, &markdown).map_err(|source| DocumentError::Artifact {
        path: markdown_path.clone(),
        source,
    })?;

    // ── Summary record ───────────────────────────────────────────────────
    let summary = Summary {
        file_name: meta.file_name.clone(),
        file_type: meta.kind.label().to_string(),
        file_size: meta.size_human(),
        processing_time_seconds: start.elapsed().as_secs_f64(),
        pages: response.pages.len(),
        total_images: images.len(),
        json_path: json_path.display().to_string(),
        markdown_path: markdown_path.display().to_string(),
        images_dir: store.images_dir(base).display().to_string(),
    };
    let summary_path = store.summary_path(base);
    let summary_json = serde_json::to_vec_pretty(&summary).map_err(|e| DocumentError::Fetch {
        detail: format!("summary not serialisable: {e}"),
    })?;
    std::fs::write(&summary_path, summary_json).map_err(|source| DocumentError::Artifact {
        path: summary_path,
        source,
    })?;

    // ── Archive the input by outcome ─────────────────────────────────────
    let processed = store.processed_path(&meta.file_name);
    std::fs::copy(&meta.path, &processed).map_err(|source| DocumentError::Artifact {
        path: processed,
        source,
    })?;

    info!(
        "{}: persisted in {:.2}s ({} pages, {} images)",
        meta.file_name, summary.processing_time_seconds, summary.pages, summary.total_images
    );
    Ok(summary)
}

/// Copy a failed input to the error archive. The copy never deletes the
/// original; a failure of the copy itself is only logged.
fn archive_error(store: &ArtifactStore, meta: &DocumentMeta) {
    let dest = store.error_path(&meta.file_name);
    if let Err(e) = std::fs::copy(&meta.path, &dest) {
        warn!("Could not copy {} to error archive: {e}", meta.file_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_skips_unrecognised_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["zeta.pdf", "alpha.docx", "notes.txt", "beta.doc", ".hidden"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(tmp.path().join("subdir.pdf")).unwrap();

        let docs = discover_documents(tmp.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["alpha.docx", "beta.doc", "zeta.pdf"]);
    }

    #[test]
    fn discovery_missing_dir_errors() {
        assert!(discover_documents(Path::new("/no/such/input")).is_err());
    }
}
