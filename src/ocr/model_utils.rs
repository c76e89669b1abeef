//! Shared utilities for OCR backends.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use super::backend::OcrError;

/// Check if a binary is available, either as a path or by name in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Encode an image as PNG bytes for engines that take files or request bodies.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, OcrError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| OcrError::ImageError(e.to_string()))?;
    Ok(buf.into_inner())
}
