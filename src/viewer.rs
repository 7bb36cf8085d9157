//! Read-side reconciliation over two artifact trees: the OCR output root
//! and an optional partition-pipeline directory of per-document JSON files.
//!
//! The viewer is deliberately forgiving. Listing and loading never fail:
//! a missing directory contributes nothing, an unreadable or malformed
//! artifact is logged at debug level and rendered as absent. The write
//! side owns strictness; the read side's job is to show whatever exists.
//!
//! Document identity on the OCR side is the artifact subdirectory name
//! under `json/` (one per ingested base name). On the partition side it is
//! the JSON file stem. The two namespaces are merged by exact name.

use crate::model::Summary;
use crate::store::ArtifactStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which pipelines produced output for a document name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelinePresence {
    pub ocr: bool,
    pub partition: bool,
}

/// One materialized image on disk, as the viewer reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Everything the viewer could load for one document name. Every field is
/// independently optional; absence means "that artifact does not exist or
/// could not be read", never an error.
#[derive(Debug, Default)]
pub struct DocumentView {
    pub name: String,
    pub partition_text: Option<String>,
    pub ocr_json: Option<Value>,
    pub summary: Option<Summary>,
    pub markdown: Option<String>,
    pub images: Vec<ImageEntry>,
}

/// Roots the viewer reads from.
#[derive(Debug, Clone)]
pub struct ViewerPaths {
    pub output_root: PathBuf,
    pub partition_dir: Option<PathBuf>,
}

impl ViewerPaths {
    pub fn new(output_root: impl Into<PathBuf>, partition_dir: Option<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            partition_dir,
        }
    }

    fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.output_root)
    }

    /// Merge both namespaces into one sorted name → presence map.
    pub fn list_documents(&self) -> BTreeMap<String, PipelinePresence> {
        let mut merged: BTreeMap<String, PipelinePresence> = BTreeMap::new();

        for name in subdirectory_names(&self.store().json_root()) {
            merged.entry(name).or_default().ocr = true;
        }

        if let Some(dir) = &self.partition_dir {
            for stem in json_file_stems(dir) {
                merged.entry(stem).or_default().partition = true;
            }
        }

        merged
    }

    /// Load every artifact available for `name`. Infallible: anything
    /// missing or unreadable is simply absent from the view.
    pub fn load_document(&self, name: &str) -> DocumentView {
        let store = self.store();

        let partition_text = self
            .partition_dir
            .as_deref()
            .and_then(|dir| load_partition_text(dir, name));

        let ocr_json = read_to_string_logged(&store.ocr_response_path(name))
            .and_then(|text| match serde_json::from_str(&text) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("OCR response for '{name}' is not valid JSON: {e}");
                    None
                }
            });

        let summary = read_to_string_logged(&store.summary_path(name)).and_then(|text| {
            match serde_json::from_str(&text) {
                Ok(s) => Some(s),
                Err(e) => {
                    debug!("Summary for '{name}' is not valid JSON: {e}");
                    None
                }
            }
        });

        let markdown = read_to_string_logged(&store.markdown_path(name));
        let images = list_images(&store.images_dir(name));

        DocumentView {
            name: name.to_string(),
            partition_text,
            ocr_json,
            summary,
            markdown,
            images,
        }
    }
}

/// Concatenated `text` fields of the partition pipeline's element array.
///
/// Tries the exact `{name}.json` first, then falls back to the first file
/// (in sorted order) with a decorated stem `{name}_…` — partition exports
/// often carry stems like `{name}_elements.json`. The separator is
/// required so `deck` never picks up an unrelated `deckhand_*.json`.
fn load_partition_text(dir: &Path, name: &str) -> Option<String> {
    let exact = dir.join(format!("{name}.json"));
    let path = if exact.is_file() {
        exact
    } else {
        let mut candidates: Vec<PathBuf> = json_files(dir)
            .into_iter()
            .filter(|p| {
                p.file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.strip_prefix(name))
                    .is_some_and(|rest| rest.starts_with('_'))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()?
    };

    let text = read_to_string_logged(&path)?;
    let elements: Vec<Value> = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            debug!("Partition file {} is not a JSON array: {e}", path.display());
            return None;
        }
    };

    let parts: Vec<&str> = elements
        .iter()
        .filter_map(|el| el.get("text").and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn read_to_string_logged(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("Could not read {}: {e}", path.display());
            None
        }
    }
}

fn subdirectory_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!("Could not enumerate {}", dir.display());
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect()
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!("Could not enumerate {}", dir.display());
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect()
}

fn json_file_stems(dir: &Path) -> Vec<String> {
    json_files(dir)
        .into_iter()
        .filter_map(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .collect()
}

fn list_images(dir: &Path) -> Vec<ImageEntry> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut images: Vec<ImageEntry> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let file_name = e.file_name().into_string().ok()?;
            let size_bytes = e.metadata().ok()?.len();
            Some(ImageEntry {
                file_name,
                size_bytes,
            })
        })
        .collect();
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store(tmp: &tempfile::TempDir) -> ArtifactStore {
        let store = ArtifactStore::new(tmp.path().join("out"));
        store.ensure_layout().unwrap();
        store
    }

    #[test]
    fn list_merges_both_namespaces() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded_store(&tmp);
        store.ensure_document_dirs("alpha").unwrap();
        store.ensure_document_dirs("both").unwrap();

        let partition = tmp.path().join("partition");
        std::fs::create_dir(&partition).unwrap();
        std::fs::write(partition.join("both.json"), "[]").unwrap();
        std::fs::write(partition.join("zeta.json"), "[]").unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), Some(partition));
        let listing = paths.list_documents();

        let names: Vec<&str> = listing.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "both", "zeta"]);
        assert_eq!(listing["alpha"], PipelinePresence { ocr: true, partition: false });
        assert_eq!(listing["both"], PipelinePresence { ocr: true, partition: true });
        assert_eq!(listing["zeta"], PipelinePresence { ocr: false, partition: true });
    }

    #[test]
    fn listing_without_partition_dir_is_ocr_only() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded_store(&tmp);
        store.ensure_document_dirs("solo").unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), None);
        let listing = paths.list_documents();
        assert_eq!(listing.len(), 1);
        assert!(listing["solo"].ocr);
        assert!(!listing["solo"].partition);
    }

    #[test]
    fn load_unknown_name_is_all_absent() {
        let tmp = tempfile::tempdir().unwrap();
        seeded_store(&tmp);

        let paths = ViewerPaths::new(tmp.path().join("out"), None);
        let view = paths.load_document("ghost");
        assert!(view.partition_text.is_none());
        assert!(view.ocr_json.is_none());
        assert!(view.summary.is_none());
        assert!(view.markdown.is_none());
        assert!(view.images.is_empty());
    }

    #[test]
    fn load_reads_each_artifact_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded_store(&tmp);
        store.ensure_document_dirs("report").unwrap();

        std::fs::write(store.markdown_path("report"), "# Report\n").unwrap();
        std::fs::write(
            store.image_path("report", "report_page1_img_1.png"),
            b"img",
        )
        .unwrap();
        // ocr_response.json deliberately malformed; must not break the rest.
        std::fs::write(store.ocr_response_path("report"), "{not json").unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), None);
        let view = paths.load_document("report");

        assert_eq!(view.markdown.as_deref(), Some("# Report\n"));
        assert!(view.ocr_json.is_none());
        assert_eq!(view.images.len(), 1);
        assert_eq!(view.images[0].file_name, "report_page1_img_1.png");
        assert_eq!(view.images[0].size_bytes, 3);
    }

    #[test]
    fn partition_text_joins_element_text_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let partition = tmp.path().join("partition");
        std::fs::create_dir(&partition).unwrap();
        std::fs::write(
            partition.join("deck.json"),
            r#"[{"type":"Title","text":"Heading"},{"type":"Image"},{"text":"Body text"}]"#,
        )
        .unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), Some(partition));
        let view = paths.load_document("deck");
        assert_eq!(view.partition_text.as_deref(), Some("Heading\n\nBody text"));
    }

    #[test]
    fn partition_falls_back_to_prefix_match() {
        let tmp = tempfile::tempdir().unwrap();
        let partition = tmp.path().join("partition");
        std::fs::create_dir(&partition).unwrap();
        std::fs::write(
            partition.join("deck_elements.json"),
            r#"[{"text":"From decorated stem"}]"#,
        )
        .unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), Some(partition));
        let view = paths.load_document("deck");
        assert_eq!(view.partition_text.as_deref(), Some("From decorated stem"));
    }

    #[test]
    fn partition_fallback_ignores_longer_unrelated_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let partition = tmp.path().join("partition");
        std::fs::create_dir(&partition).unwrap();
        std::fs::write(
            partition.join("deckhand_elements.json"),
            r#"[{"text":"Different document"}]"#,
        )
        .unwrap();

        let paths = ViewerPaths::new(tmp.path().join("out"), Some(partition));
        assert!(paths.load_document("deck").partition_text.is_none());
    }
}
