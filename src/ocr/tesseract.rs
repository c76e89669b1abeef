//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction. The executable
//! path is configurable so installs outside PATH work.

use std::path::Path;
use std::process::Command;

use image::RgbImage;
use tempfile::TempDir;

use super::backend::{OcrBackend, OcrBackendType, OcrError};
use super::model_utils::{check_binary, encode_png};
use crate::config::OcrSettings;

/// Tesseract OCR backend.
pub struct TesseractBackend {
    command: String,
    language: String,
}

impl TesseractBackend {
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self {
            command: settings.tesseract_cmd.clone(),
            language: settings.language.clone(),
        }
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.command
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary(&self.command)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("Tesseract is available ({})", self.command)
        } else {
            format!(
                "{} not found. Install with: apt install tesseract-ocr, or set TESSERACT_CMD",
                self.command
            )
        }
    }

    fn run_ocr(&self, image: &RgbImage) -> Result<String, OcrError> {
        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("page.png");
        std::fs::write(&image_path, encode_png(image)?)?;
        self.run_tesseract(&image_path)
    }
}
