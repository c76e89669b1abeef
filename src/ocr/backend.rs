//! OCR backend abstraction.
//!
//! Every engine takes a decoded RGB image and returns raw, unnormalized
//! text. Backends are synchronous; async callers run them on the blocking
//! pool.

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use serde::Serialize;
use thiserror::Error;

use super::tesseract::TesseractBackend;
use super::trocr::TrOcrBackend;
use crate::config::Settings;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Raw extracted text.
    pub text: String,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Which model was used, for model-backed engines.
    pub model: Option<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    Tesseract,
    /// TrOCR handwriting model via an inference endpoint.
    TrOcr,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::TrOcr => "trocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "trocr" | "handwriting" => Some(OcrBackendType::TrOcr),
            _ => None,
        }
    }

    /// Label used in user-facing error markers, e.g. "Tesseract Error: ...".
    pub fn display_name(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "Tesseract",
            OcrBackendType::TrOcr => "TrOCR",
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (binary installed, credentials present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Core OCR: extract raw text from an image.
    fn run_ocr(&self, image: &RgbImage) -> Result<String, OcrError>;

    /// Model name for this backend, if applicable.
    fn model_name(&self) -> Option<String> {
        None
    }

    /// Run OCR on an image, returning a timed result.
    fn ocr_image(&self, image: &RgbImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let text = self.run_ocr(image)?;
        Ok(OcrResult {
            text,
            backend: self.backend_type(),
            model: self.model_name(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Create a backend by name.
pub fn create_backend(name: &str, settings: &Settings) -> Result<Arc<dyn OcrBackend>, OcrError> {
    match OcrBackendType::from_str(name) {
        Some(OcrBackendType::Tesseract) => Ok(Arc::new(TesseractBackend::from_settings(
            &settings.ocr,
        ))),
        Some(OcrBackendType::TrOcr) => Ok(Arc::new(TrOcrBackend::from_settings(
            &settings.ocr,
            &settings.inference,
        )?)),
        None => Err(OcrError::BackendNotAvailable(format!(
            "unknown OCR backend '{}'",
            name
        ))),
    }
}
