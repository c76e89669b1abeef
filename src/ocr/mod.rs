//! OCR engines and engine selection.
//!
//! ## OCR Backends
//!
//! - **Tesseract**: Traditional OCR via the `tesseract` executable (default primary)
//! - **TrOCR**: Handwriting model behind a hosted inference endpoint (default fallback)
//!
//! Use `OcrSelector` to run the primary engine with length-based fallback.

mod backend;
mod model_utils;
mod selector;
mod tesseract;
mod trocr;

pub use backend::{create_backend, OcrBackend, OcrBackendType, OcrError, OcrResult};
pub use model_utils::{check_binary, encode_png};
pub use selector::{OcrSelection, OcrSelector};
pub use tesseract::TesseractBackend;
pub use trocr::TrOcrBackend;
