//! OCR service client: upload a document, obtain an access URL, run OCR.
//!
//! The batch runner only sees the [`OcrClient`] trait, so tests (and any
//! future second service) can substitute their own implementation without
//! touching the runner. [`MistralOcrClient`] is the production
//! implementation over the Mistral document-OCR HTTP API.
//!
//! Errors are mapped by stage: anything in the upload call is
//! [`DocumentError::Upload`]; the access-URL and OCR calls are
//! [`DocumentError::Fetch`]. Both fail exactly one document.

use crate::config::IngestConfig;
use crate::error::{DocumentError, IngestError};
use crate::model::OcrResponse;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Opaque handle to a file the service has accepted.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub id: String,
}

/// The external OCR/partitioning capability, reduced to its contract.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Upload raw document bytes; returns the service's file handle.
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<FileHandle, DocumentError>;

    /// Exchange a handle for a short-lived access URL.
    async fn get_access_url(&self, handle: &FileHandle) -> Result<String, DocumentError>;

    /// Run OCR against an accessible document URL.
    async fn run_ocr(&self, url: &str) -> Result<OcrResponse, DocumentError>;
}

/// Production client for the Mistral OCR API.
pub struct MistralOcrClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Deserialize)]
struct SignedUrl {
    url: String,
}

impl MistralOcrClient {
    /// Build a client from the run configuration.
    ///
    /// Requires `config.api_key`; the CLI fills it from `MISTRAL_API_KEY`
    /// when the flag is absent.
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                IngestError::InvalidConfig(
                    "OCR API key not set. Pass --api-key or set MISTRAL_API_KEY.".into(),
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IngestError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.ocr_model.clone(),
        })
    }

    async fn check_status(
        response: reqwest::Response,
        stage: &str,
    ) -> Result<reqwest::Response, String> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        Err(format!("{stage}: HTTP {status}: {snippet}"))
    }
}

#[async_trait]
impl OcrClient for MistralOcrClient {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<FileHandle, DocumentError> {
        info!("Uploading {file_name} ({} bytes)", bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("purpose", "ocr")
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/files", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DocumentError::Upload {
                detail: e.to_string(),
            })?;

        let response = Self::check_status(response, "upload")
            .await
            .map_err(|detail| DocumentError::Upload { detail })?;

        let uploaded: UploadedFile =
            response.json().await.map_err(|e| DocumentError::Upload {
                detail: format!("malformed upload response: {e}"),
            })?;
        debug!("Uploaded as file id {}", uploaded.id);

        Ok(FileHandle { id: uploaded.id })
    }

    async fn get_access_url(&self, handle: &FileHandle) -> Result<String, DocumentError> {
        let response = self
            .http
            .get(format!("{}/v1/files/{}/url", self.api_base, handle.id))
            .query(&[("expiry", "1")])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DocumentError::Fetch {
                detail: e.to_string(),
            })?;

        let response = Self::check_status(response, "signed url")
            .await
            .map_err(|detail| DocumentError::Fetch { detail })?;

        let signed: SignedUrl = response.json().await.map_err(|e| DocumentError::Fetch {
            detail: format!("malformed signed-url response: {e}"),
        })?;
        debug!("Got access URL for file id {}", handle.id);

        Ok(signed.url)
    }

    async fn run_ocr(&self, url: &str) -> Result<OcrResponse, DocumentError> {
        let body = serde_json::json!({
            "model": self.model,
            "document": {
                "type": "document_url",
                "document_url": url,
            },
            "include_image_base64": true,
        });

        let response = self
            .http
            .post(format!("{}/v1/ocr", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocumentError::Fetch {
                detail: e.to_string(),
            })?;

        let response = Self::check_status(response, "ocr")
            .await
            .map_err(|detail| DocumentError::Fetch { detail })?;

        response.json().await.map_err(|e| DocumentError::Fetch {
            detail: format!("malformed OCR response: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_api_key() {
        let config = IngestConfig::builder().build().unwrap();
        let err = MistralOcrClient::new(&config);
        assert!(matches!(err, Err(IngestError::InvalidConfig(_))));
    }

    #[test]
    fn new_trims_trailing_slash_on_base() {
        let config = IngestConfig::builder()
            .api_key("test-key")
            .api_base("https://api.example.test/")
            .build()
            .unwrap();
        let client = MistralOcrClient::new(&config).unwrap();
        assert_eq!(client.api_base, "https://api.example.test");
    }
}
