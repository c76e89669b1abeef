//! TrOCR handwriting backend.
//!
//! Sends the image to a hosted `image-to-text` model (Hugging Face inference
//! API or a compatible server) and returns the generated text. Used as the
//! fallback for handwriting that Tesseract reads poorly.

use std::time::Duration;

use image::RgbImage;
use reqwest::Client;
use serde::Deserialize;
use tokio::runtime::Handle;
use tracing::debug;

use super::backend::{OcrBackend, OcrBackendType, OcrError};
use super::model_utils::encode_png;
use crate::config::{InferenceSettings, OcrSettings};

/// TrOCR backend calling a hosted inference endpoint.
pub struct TrOcrBackend {
    endpoint: String,
    model: String,
    token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Generated(Vec<GeneratedText>),
    Error { error: String },
}

impl TrOcrBackend {
    pub fn from_settings(
        ocr: &OcrSettings,
        inference: &InferenceSettings,
    ) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(inference.timeout_secs))
            .build()
            .map_err(|e| OcrError::OcrFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: inference.api_url.trim_end_matches('/').to_string(),
            model: ocr.trocr_model.clone(),
            token: inference.token.clone(),
            client,
        })
    }

    fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }

    async fn run_trocr_async(&self, png: Vec<u8>) -> Result<String, OcrError> {
        let mut request = self
            .client
            .post(self.model_url())
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(OcrError::OcrFailed(format!(
                "TrOCR endpoint error ({}): {}",
                status, body
            )));
        }

        parse_generated_text(&body)
    }

    /// Blocking wrapper; must be called from the blocking pool, not a runtime worker.
    fn run_trocr(&self, image: &RgbImage) -> Result<String, OcrError> {
        let handle = Handle::try_current().map_err(|_| {
            OcrError::OcrFailed("No tokio runtime available for TrOCR".to_string())
        })?;

        let png = encode_png(image)?;
        debug!("TrOCR: sending {} byte image to {}", png.len(), self.model);
        handle.block_on(self.run_trocr_async(png))
    }
}

fn parse_generated_text(body: &str) -> Result<String, OcrError> {
    let parsed: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::OcrFailed(format!("Failed to parse response: {}", e)))?;

    match parsed {
        InferenceResponse::Generated(items) => Ok(items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default()),
        InferenceResponse::Error { error } => {
            Err(OcrError::OcrFailed(format!("TrOCR endpoint error: {}", error)))
        }
    }
}

impl OcrBackend for TrOcrBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::TrOcr
    }

    fn is_available(&self) -> bool {
        !self.endpoint.is_empty() && !self.model.is_empty()
    }

    fn availability_hint(&self) -> String {
        if self.token.is_none() && self.endpoint.contains("huggingface.co") {
            format!(
                "TrOCR ({}) configured without HF_TOKEN; the hosted API may reject requests",
                self.model
            )
        } else {
            format!("TrOCR is configured (model: {})", self.model)
        }
    }

    fn model_name(&self) -> Option<String> {
        Some(self.model.clone())
    }

    fn run_ocr(&self, image: &RgbImage) -> Result<String, OcrError> {
        self.run_trocr(image)
    }
}
