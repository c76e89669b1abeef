//! scansum - extract, correct and summarize text from uploaded images.
//!
//! An image goes through a primary OCR engine, falls back to a second engine
//! when the primary output is unclear, is normalized and spell-corrected, and
//! is finally summarized by a hosted model.

pub mod cli;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod summarize;
pub mod text;
