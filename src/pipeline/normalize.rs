//! Response normalization: raw OCR pages → combined markdown plus
//! materialized images.
//!
//! The output must be reproducible: identical input produces byte-identical
//! markdown and the same image file names on every run. Everything here is
//! deterministic — page order drives the document-scoped sequence counter,
//! and paths come from the [`ArtifactStore`]'s pure accessors.
//!
//! Per-image failures (bad base64, disk write) are logged and skipped; the
//! failed image's placeholder stays in the page verbatim and the counter
//! does not advance, so `sequence_number`s are always 1..=N with no gaps.

use crate::model::{MaterializedImage, OcrResponse};
use crate::pipeline::{images, rewrite};
use crate::store::ArtifactStore;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Normalize one document's OCR response.
///
/// Returns the combined markdown (pages joined with a blank line, in page
/// order, placeholders rewritten) and the images written to disk, in
/// sequence order.
pub fn normalize_response(
    base_name: &str,
    response: &OcrResponse,
    store: &ArtifactStore,
) -> (String, Vec<MaterializedImage>) {
    let mut counter = 1usize;
    let mut materialized: Vec<MaterializedImage> = Vec::new();
    let mut rewritten_pages: Vec<String> = Vec::with_capacity(response.pages.len());

    for (page_idx, page) in response.pages.iter().enumerate() {
        let page_index = page_idx + 1;
        let mut page_results: Vec<(&str, MaterializedImage)> = Vec::new();

        for embedded in &page.images {
            let bytes = match images::decode_payload(&embedded.id, &embedded.payload) {
                Ok(b) => b,
                Err(e) => {
                    warn!("{base_name} page {page_index}: {e}; skipping image");
                    continue;
                }
            };
            let extension = images::inferred_extension(&embedded.id);

            match images::materialize(store, base_name, page_index, counter, &bytes, &extension) {
                Ok(img) => {
                    counter += 1;
                    page_results.push((embedded.id.as_str(), img));
                }
                Err(e) => {
                    warn!("{base_name} page {page_index}: {e}; skipping image");
                }
            }
        }

        // Ids are unique within a page; on a malformed duplicate the
        // later materialization wins the placeholder.
        let page_replacements: HashMap<&str, &MaterializedImage> = page_results
            .iter()
            .map(|(id, img)| (*id, img))
            .collect();

        rewritten_pages.push(rewrite::rewrite_page(&page.markdown, &page_replacements));
        debug!(
            "{base_name} page {page_index}: {} of {} images materialized",
            page_results.len(),
            page.images.len()
        );

        materialized.extend(page_results.into_iter().map(|(_, img)| img));
    }

    (rewritten_pages.join("\n\n"), materialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmbeddedImage, Page};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn store_in(tmp: &tempfile::TempDir) -> ArtifactStore {
        let store = ArtifactStore::new(tmp.path());
        store.ensure_layout().unwrap();
        store.ensure_document_dirs("report").unwrap();
        store
    }

    /// The worked example: page 1 carries a jpeg and a png, page 2 is bare.
    #[test]
    fn two_page_document_with_images() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let response = OcrResponse {
            pages: vec![
                Page {
                    markdown: "Intro ![img-0.jpeg](img-0.jpeg) and ![img-1.png](img-1.png)".into(),
                    images: vec![
                        EmbeddedImage {
                            id: "img-0.jpeg".into(),
                            payload: b64(b"jpeg-bytes"),
                        },
                        EmbeddedImage {
                            id: "img-1.png".into(),
                            payload: b64(b"png-bytes"),
                        },
                    ],
                },
                Page {
                    markdown: "Closing remarks.".into(),
                    images: vec![],
                },
            ],
        };

        let (markdown, images) = normalize_response("report", &response, &store);

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].file_name, "report_page1_img_1.jpeg");
        assert_eq!(images[1].file_name, "report_page1_img_2.png");
        assert_eq!(
            markdown,
            "Intro ![report_page1_img_1.jpeg](../images/report/report_page1_img_1.jpeg) \
             and ![report_page1_img_2.png](../images/report/report_page1_img_2.png)\
             \n\nClosing remarks."
        );

        assert!(store.image_path("report", "report_page1_img_1.jpeg").is_file());
        assert!(store.image_path("report", "report_page1_img_2.png").is_file());
    }

    #[test]
    fn counter_spans_pages_and_starts_at_one() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let page = |id: &str| Page {
            markdown: format!("![{id}]({id})"),
            images: vec![EmbeddedImage {
                id: id.into(),
                payload: b64(b"x"),
            }],
        };
        let response = OcrResponse {
            pages: vec![page("img-0.png"), page("img-0.png"), page("img-0.png")],
        };

        let (_, images) = normalize_response("report", &response, &store);
        let seqs: Vec<usize> = images.iter().map(|i| i.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        let pages: Vec<usize> = images.iter().map(|i| i.page_index).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn invalid_base64_is_skipped_without_consuming_a_sequence() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let response = OcrResponse {
            pages: vec![Page {
                markdown: "![bad.png](bad.png) ![good.png](good.png)".into(),
                images: vec![
                    EmbeddedImage {
                        id: "bad.png".into(),
                        payload: "%%% not base64 %%%".into(),
                    },
                    EmbeddedImage {
                        id: "good.png".into(),
                        payload: b64(b"ok"),
                    },
                ],
            }],
        };

        let (markdown, images) = normalize_response("report", &response, &store);

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].sequence_number, 1, "failed image must not consume a number");
        // The bad placeholder survives verbatim; the good one is rewritten.
        assert!(markdown.contains("![bad.png](bad.png)"));
        assert!(markdown.contains("![report_page1_img_1.png](../images/report/report_page1_img_1.png)"));
    }

    #[test]
    fn data_uri_payload_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let response = OcrResponse {
            pages: vec![Page {
                markdown: "![img-0.jpeg](img-0.jpeg)".into(),
                images: vec![EmbeddedImage {
                    id: "img-0.jpeg".into(),
                    payload: format!("data:image/jpeg;base64,{}", b64(b"jpeg")),
                }],
            }],
        };

        let (_, images) = normalize_response("report", &response, &store);
        assert_eq!(images.len(), 1);
        let bytes = std::fs::read(store.image_path("report", &images[0].file_name)).unwrap();
        assert_eq!(bytes, b"jpeg");
    }

    #[test]
    fn rerun_produces_identical_output() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let response = OcrResponse {
            pages: vec![Page {
                markdown: "![img-0.png](img-0.png)".into(),
                images: vec![EmbeddedImage {
                    id: "img-0.png".into(),
                    payload: b64(b"stable"),
                }],
            }],
        };

        let (md1, imgs1) = normalize_response("report", &response, &store);
        let (md2, imgs2) = normalize_response("report", &response, &store);
        assert_eq!(md1, md2);
        assert_eq!(imgs1, imgs2);
    }
}
