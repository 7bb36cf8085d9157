//! Configuration for an ingestion run.
//!
//! All paths and service knobs live in one [`IngestConfig`] struct, built
//! via its [`IngestConfigBuilder`]. Keeping the input and output locations
//! in an explicit config — rather than module-level constants — means two
//! runs can target different trees, and tests can point the whole pipeline
//! at a temp directory.

use crate::error::IngestError;
use std::path::PathBuf;

/// Default OCR model requested from the service.
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";

/// Default service endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.mistral.ai";

/// Configuration for a batch ingestion run.
///
/// Built via [`IngestConfig::builder()`].
///
/// # Example
/// ```rust
/// use docingest::IngestConfig;
///
/// let config = IngestConfig::builder()
///     .input_dir("scanned_pdf_data")
///     .output_root("mistral_scanned_pdf_output")
///     .api_key("sk-…")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Directory scanned for input PDF/DOCX files (non-recursive).
    pub input_dir: PathBuf,

    /// Root of the artifact tree (json/, markdown/, images/, archives).
    pub output_root: PathBuf,

    /// Flat JSON output directory of the partition pipeline, consumed
    /// read-only by the viewer. `None` means that side is simply absent.
    pub partition_dir: Option<PathBuf>,

    /// OCR service API key. Required for live runs; tests that inject
    /// their own [`crate::pipeline::client::OcrClient`] never need it.
    pub api_key: Option<String>,

    /// Service base URL. Overridable so tests can point at a local stub.
    pub api_base: String,

    /// OCR model identifier. Default: [`DEFAULT_OCR_MODEL`].
    pub ocr_model: String,

    /// Per-HTTP-call timeout in seconds. Default: 120.
    ///
    /// Applies to upload, access-URL, and OCR calls individually. The batch
    /// loop itself enforces no per-document deadline — a slow service call
    /// is bounded only by this client-level timeout.
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("scanned_pdf_data"),
            output_root: PathBuf::from("mistral_scanned_pdf_output"),
            partition_dir: None,
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl IngestConfig {
    /// Create a new builder for `IngestConfig`.
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn partition_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.partition_dir = Some(dir.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.ocr_model = model.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<IngestConfig, IngestError> {
        let c = &self.config;
        if c.input_dir.as_os_str().is_empty() {
            return Err(IngestError::InvalidConfig(
                "input_dir must not be empty".into(),
            ));
        }
        if c.output_root.as_os_str().is_empty() {
            return Err(IngestError::InvalidConfig(
                "output_root must not be empty".into(),
            ));
        }
        if c.api_base.is_empty() {
            return Err(IngestError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
