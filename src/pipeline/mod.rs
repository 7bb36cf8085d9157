//! Pipeline stages for document ingestion.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets the service
//! client be swapped (trait object) without touching normalization.
//!
//! ## Data Flow
//!
//! ```text
//! input file ──▶ client ──▶ normalize ──▶ artifact store
//!  (bytes)    (upload/OCR)  (rewrite +     (json/md/images)
//!                            images)
//! ```
//!
//! 1. [`client`]    — upload the document, obtain an access URL, run OCR;
//!    the only stage with network I/O
//! 2. [`rewrite`]   — tokenise page markdown and swap `![id](id)`
//!    placeholders for materialized paths
//! 3. [`images`]    — decode base64 payloads and write them under the store
//! 4. [`normalize`] — drive 2 and 3 across all pages, assign document-scoped
//!    sequence numbers, join pages into the combined markdown

pub mod client;
pub mod images;
pub mod normalize;
pub mod rewrite;
