//! Artifact store: the filesystem layout rules for all pipeline output.
//!
//! Every artifact of a document lives under a `base_name`-keyed
//! subdirectory of its kind:
//!
//! ```text
//! R/json/<base>/ocr_response.json
//! R/json/<base>/summary.json
//! R/markdown/<base>/<base>.md
//! R/images/<base>/<base>_page<N>_img_<seq><ext>
//! R/processed_files/<original file name>
//! R/error_files/<original file name>
//! ```
//!
//! Path accessors are pure — they never touch the filesystem, never depend
//! on run order or wall-clock time. Directory creation is split by failure
//! granularity: [`ArtifactStore::ensure_layout`] creates the root tree and
//! is fatal for the batch; [`ArtifactStore::ensure_document_dirs`] creates
//! one document's subdirectories and fails only that document.

use crate::error::IngestError;
use std::path::{Path, PathBuf};

/// Canonical path computation over one output root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            root: output_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ── Kind roots ───────────────────────────────────────────────────────

    pub fn json_root(&self) -> PathBuf {
        self.root.join("json")
    }

    pub fn markdown_root(&self) -> PathBuf {
        self.root.join("markdown")
    }

    pub fn images_root(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn processed_root(&self) -> PathBuf {
        self.root.join("processed_files")
    }

    pub fn error_root(&self) -> PathBuf {
        self.root.join("error_files")
    }

    // ── Per-document paths ───────────────────────────────────────────────

    pub fn json_dir(&self, base_name: &str) -> PathBuf {
        self.json_root().join(base_name)
    }

    pub fn ocr_response_path(&self, base_name: &str) -> PathBuf {
        self.json_dir(base_name).join("ocr_response.json")
    }

    pub fn summary_path(&self, base_name: &str) -> PathBuf {
        self.json_dir(base_name).join("summary.json")
    }

    pub fn markdown_dir(&self, base_name: &str) -> PathBuf {
        self.markdown_root().join(base_name)
    }

    pub fn markdown_path(&self, base_name: &str) -> PathBuf {
        self.markdown_dir(base_name).join(format!("{base_name}.md"))
    }

    pub fn images_dir(&self, base_name: &str) -> PathBuf {
        self.images_root().join(base_name)
    }

    pub fn image_path(&self, base_name: &str, file_name: &str) -> PathBuf {
        self.images_dir(base_name).join(file_name)
    }

    /// Reference written into the combined markdown for one image.
    ///
    /// Always forward-slash, regardless of platform — it is a markdown
    /// link, not a filesystem path.
    pub fn image_relative_path(&self, base_name: &str, file_name: &str) -> String {
        format!("../images/{base_name}/{file_name}")
    }

    pub fn processed_path(&self, file_name: &str) -> PathBuf {
        self.processed_root().join(file_name)
    }

    pub fn error_path(&self, file_name: &str) -> PathBuf {
        self.error_root().join(file_name)
    }

    // ── Directory creation ───────────────────────────────────────────────

    /// Create the root output tree. Idempotent; safe to call repeatedly.
    ///
    /// Failure here aborts the whole batch — if the root is unwritable,
    /// every document would fail the same way.
    pub fn ensure_layout(&self) -> Result<(), IngestError> {
        for dir in [
            self.root.clone(),
            self.json_root(),
            self.markdown_root(),
            self.images_root(),
            self.processed_root(),
            self.error_root(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| IngestError::Storage {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Create one document's `json/`, `markdown/` and `images/`
    /// subdirectories. Idempotent. Failure fails that document only.
    pub fn ensure_document_dirs(&self, base_name: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(self.json_dir(base_name))?;
        std::fs::create_dir_all(self.markdown_dir(base_name))?;
        std::fs::create_dir_all(self.images_dir(base_name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        let store = ArtifactStore::new("/out");
        assert_eq!(
            store.ocr_response_path("report"),
            PathBuf::from("/out/json/report/ocr_response.json")
        );
        assert_eq!(
            store.markdown_path("report"),
            PathBuf::from("/out/markdown/report/report.md")
        );
        assert_eq!(
            store.image_path("report", "report_page1_img_1.jpeg"),
            PathBuf::from("/out/images/report/report_page1_img_1.jpeg")
        );
        assert_eq!(
            store.image_relative_path("report", "report_page1_img_1.jpeg"),
            "../images/report/report_page1_img_1.jpeg"
        );
        assert_eq!(
            store.processed_path("report.pdf"),
            PathBuf::from("/out/processed_files/report.pdf")
        );
    }

    #[test]
    fn ensure_layout_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("out"));
        store.ensure_layout().unwrap();
        store.ensure_layout().unwrap();
        assert!(store.json_root().is_dir());
        assert!(store.error_root().is_dir());
    }

    #[test]
    fn ensure_layout_fails_on_unwritable_root() {
        // A path under a regular file can never be created.
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let store = ArtifactStore::new(blocker.join("out"));
        let err = store.ensure_layout();
        assert!(matches!(err, Err(IngestError::Storage { .. })));
    }

    #[test]
    fn document_dirs_created_on_first_use() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.ensure_layout().unwrap();
        store.ensure_document_dirs("report").unwrap();
        store.ensure_document_dirs("report").unwrap();
        assert!(store.json_dir("report").is_dir());
        assert!(store.images_dir("report").is_dir());
    }
}
