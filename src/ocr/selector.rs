//! Two-stage OCR engine selection.
//!
//! The primary engine runs first. When its normalized output is shorter than
//! `min_clear_chars` the result is treated as unclear and the fallback engine's
//! normalized output replaces it entirely. Length is the only quality signal;
//! no engine confidence is consulted.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use super::backend::{OcrBackend, OcrBackendType, OcrError};
use crate::text::normalize;

/// Outcome of engine selection.
#[derive(Debug)]
pub enum OcrSelection {
    /// The primary engine's output was clear enough.
    Primary {
        backend: OcrBackendType,
        text: String,
    },
    /// The primary output was unclear and the fallback engine's output was used.
    Fallback {
        backend: OcrBackendType,
        text: String,
        primary_chars: usize,
    },
    /// The primary engine failed outright.
    Failed {
        backend: OcrBackendType,
        error: OcrError,
    },
}

impl OcrSelection {
    /// The selected clean text, if any engine produced one.
    pub fn text(&self) -> Option<&str> {
        match self {
            OcrSelection::Primary { text, .. } | OcrSelection::Fallback { text, .. } => Some(text),
            OcrSelection::Failed { .. } => None,
        }
    }

    /// The engine whose output (or failure) this is.
    pub fn backend(&self) -> OcrBackendType {
        match self {
            OcrSelection::Primary { backend, .. }
            | OcrSelection::Fallback { backend, .. }
            | OcrSelection::Failed { backend, .. } => *backend,
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, OcrSelection::Fallback { .. })
    }
}

/// Chooses between a primary and an optional fallback engine.
pub struct OcrSelector {
    primary: Arc<dyn OcrBackend>,
    fallback: Option<Arc<dyn OcrBackend>>,
    min_clear_chars: usize,
}

impl OcrSelector {
    pub fn new(
        primary: Arc<dyn OcrBackend>,
        fallback: Option<Arc<dyn OcrBackend>>,
        min_clear_chars: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            min_clear_chars,
        }
    }

    pub fn primary(&self) -> &dyn OcrBackend {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> Option<&dyn OcrBackend> {
        self.fallback.as_deref()
    }

    pub fn min_clear_chars(&self) -> usize {
        self.min_clear_chars
    }

    /// Run OCR on `image`, falling back when the primary result looks unclear.
    ///
    /// Blocking: engines may spawn processes or wait on HTTP.
    pub fn select(&self, image: &RgbImage) -> OcrSelection {
        let primary_type = self.primary.backend_type();
        let text = match self.primary.ocr_image(image) {
            Ok(result) => {
                debug!(
                    "{} ({}) finished in {}ms",
                    result.backend,
                    result.model.as_deref().unwrap_or("default"),
                    result.processing_time_ms
                );
                normalize(&result.text)
            }
            Err(error) => {
                warn!("{} OCR failed: {}", primary_type, error);
                return OcrSelection::Failed {
                    backend: primary_type,
                    error,
                };
            }
        };

        let chars = text.chars().count();
        if chars >= self.min_clear_chars {
            return OcrSelection::Primary {
                backend: primary_type,
                text,
            };
        }

        let Some(fallback) = self.fallback.as_ref() else {
            debug!(
                "{} output unclear ({} chars) but no fallback configured",
                primary_type, chars
            );
            return OcrSelection::Primary {
                backend: primary_type,
                text,
            };
        };

        info!(
            "{} output unclear ({} < {} chars), trying {}",
            primary_type,
            chars,
            self.min_clear_chars,
            fallback.backend_type()
        );

        match fallback.ocr_image(image) {
            Ok(result) => {
                debug!(
                    "{} ({}) finished in {}ms",
                    result.backend,
                    result.model.as_deref().unwrap_or("default"),
                    result.processing_time_ms
                );
                OcrSelection::Fallback {
                    backend: result.backend,
                    text: normalize(&result.text),
                    primary_chars: chars,
                }
            }
            Err(e) => {
                warn!(
                    "{} fallback failed, keeping {} output: {}",
                    fallback.backend_type(),
                    primary_type,
                    e
                );
                OcrSelection::Primary {
                    backend: primary_type,
                    text,
                }
            }
        }
    }
}
