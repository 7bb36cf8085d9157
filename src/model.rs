//! Core data types: the OCR wire format, materialized artifacts, and
//! per-document outcomes.
//!
//! [`OcrResponse`] mirrors the service's JSON shape (`pages[].markdown`,
//! `pages[].images[].{id, image_base64}`); everything else here is the
//! normalised, on-disk side of the pipeline. A document's identity across
//! all artifacts is its *base name* — the input filename without extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// ── Wire format ──────────────────────────────────────────────────────────

/// Raw OCR service response for one document.
///
/// Page order is significant; a page's 1-based index is its position in
/// `pages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub pages: Vec<Page>,
}

/// One page of the OCR response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Raw page markdown; may embed `![id](id)` image placeholders.
    pub markdown: String,
    /// Embedded images in the order they appear in the payload.
    #[serde(default)]
    pub images: Vec<EmbeddedImage>,
}

/// An image embedded in a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Placeholder token used inside the page markdown. Unique within a
    /// page only — never rely on it for cross-page identity.
    pub id: String,
    /// Base64 payload, optionally prefixed with a `data:…;base64,` header.
    #[serde(rename = "image_base64")]
    pub payload: String,
}

// ── Materialized artifacts ───────────────────────────────────────────────

/// The on-disk result of placing one embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedImage {
    /// `{base}_page{N}_img_{seq}{ext}` — globally unique within the document.
    pub file_name: String,
    /// Markdown-relative reference written into the combined document.
    pub relative_path: String,
    /// 1-based page the image came from.
    pub page_index: usize,
    /// Document-scoped counter, starting at 1, shared across pages.
    pub sequence_number: usize,
}

/// Summary record written to `summary.json` for each successful document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub file_name: String,
    pub file_type: String,
    pub file_size: String,
    pub processing_time_seconds: f64,
    pub pages: usize,
    pub total_images: usize,
    pub json_path: String,
    pub markdown_path: String,
    pub images_dir: String,
}

// ── Documents and outcomes ───────────────────────────────────────────────

/// Recognised input file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Pdf,
    Docx,
}

impl FileKind {
    /// Map a lowercase extension to a kind; `None` means "skip this file".
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(FileKind::Pdf),
            "docx" | "doc" => Some(FileKind::Docx),
            _ => None,
        }
    }

    /// Human-readable label used in summaries and reports.
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Docx => "DOCX/DOC",
        }
    }
}

/// Metadata for one discovered input document.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    /// Full path to the input file.
    pub path: PathBuf,
    /// Filename including extension, used for archive copies.
    pub file_name: String,
    /// Filename without extension — the cross-artifact join key.
    pub base_name: String,
    /// Lowercase extension without the dot.
    pub extension: String,
    pub size_bytes: u64,
    pub modified: Option<SystemTime>,
    pub kind: FileKind,
}

impl DocumentMeta {
    /// Build metadata for `path`, or `None` if the extension is not a
    /// recognised document type.
    pub fn from_path(path: &Path) -> std::io::Result<Option<Self>> {
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return Ok(None),
        };
        let kind = match FileKind::from_extension(&extension) {
            Some(k) => k,
            None => return Ok(None),
        };
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => return Ok(None),
        };
        let base_name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => return Ok(None),
        };
        let meta = std::fs::metadata(path)?;

        Ok(Some(Self {
            path: path.to_path_buf(),
            file_name,
            base_name,
            extension,
            size_bytes: meta.len(),
            modified: meta.modified().ok(),
            kind,
        }))
    }

    /// File size formatted for humans, e.g. `"1.25 MB"`.
    pub fn size_human(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// The result of processing one document. Immutable once created.
#[derive(Debug)]
pub enum ProcessingOutcome {
    Success {
        meta: DocumentMeta,
        summary: Summary,
    },
    Failure {
        meta: DocumentMeta,
        reason: String,
    },
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success { .. })
    }

    pub fn meta(&self) -> &DocumentMeta {
        match self {
            ProcessingOutcome::Success { meta, .. } => meta,
            ProcessingOutcome::Failure { meta, .. } => meta,
        }
    }
}

/// Format a byte count with two decimals in B/KB/MB/GB.
pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 || unit == "GB" {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    unreachable!("GB branch always returns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0), "0.00 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(FileKind::from_extension("pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("docx"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_extension("doc"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_extension("txt"), None);
    }

    #[test]
    fn response_deserialises_wire_shape() {
        let json = r#"{
            "pages": [
                {
                    "markdown": "![img-0.jpeg](img-0.jpeg)",
                    "images": [{"id": "img-0.jpeg", "image_base64": "AAAA"}]
                },
                {"markdown": "plain text"}
            ]
        }"#;
        let resp: OcrResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.pages.len(), 2);
        assert_eq!(resp.pages[0].images[0].id, "img-0.jpeg");
        assert!(resp.pages[1].images.is_empty(), "images defaults to empty");
    }
}
