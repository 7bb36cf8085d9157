//! # docingest
//!
//! Batch document ingestion against a remote OCR service: walk a directory
//! of PDF/DOCX files, run each through Mistral's document OCR, and
//! normalize the per-page responses into a stable on-disk artifact tree.
//!
//! ## Why this crate?
//!
//! An OCR response is a transient, self-referential blob: page markdown
//! embeds `![id](id)` placeholders whose ids are only unique within a
//! page, and image bytes arrive inline as base64. This crate turns that
//! into durable, addressable artifacts — raw JSON, combined markdown with
//! working relative image links, extracted image files, and a per-document
//! summary — with inputs archived by outcome so a batch can be audited and
//! re-run safely.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover   enumerate *.pdf / *.docx / *.doc, sorted by name
//!  ├─ 2. Upload     multipart upload, exchange for a short-lived URL
//!  ├─ 3. OCR        fetch per-page markdown + embedded base64 images
//!  ├─ 4. Normalize  materialize images, rewrite placeholders, join pages
//!  ├─ 5. Persist    json / markdown / images / summary under one root
//!  └─ 6. Archive    copy the input to processed_files or error_files
//! ```
//!
//! A separate read side, [`viewer`], reconciles this tree with an optional
//! second pipeline's JSON exports for terminal inspection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docingest::{run_batch, IngestConfig, MistralOcrClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig::builder()
//!         .input_dir("scanned_pdf_data")
//!         .api_key(std::env::var("MISTRAL_API_KEY")?)
//!         .build()?;
//!     let client = MistralOcrClient::new(&config)?;
//!     let outcomes = run_batch(&config, &client).await?;
//!     println!("{} succeeded", outcomes.iter().filter(|o| o.is_success()).count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docingest` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docingest = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod viewer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{discover_documents, run_batch, run_batch_with};
pub use config::{IngestConfig, IngestConfigBuilder};
pub use error::{DocumentError, ImageError, IngestError};
pub use model::{DocumentMeta, FileKind, ProcessingOutcome, Summary};
pub use pipeline::client::{FileHandle, MistralOcrClient, OcrClient};
pub use store::ArtifactStore;
pub use viewer::{DocumentView, PipelinePresence, ViewerPaths};
