//! Abstractive summarization.
//!
//! Supports a hosted Hugging Face `summarization` pipeline (default) and a
//! local Ollama server. [`SummarizerAdapter`] wraps either with the
//! short-input check and fixed-size chunking.

mod adapter;
mod huggingface;
mod ollama;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use adapter::{chunk_text, SummarizerAdapter};
pub use huggingface::HuggingFaceSummarizer;
pub use ollama::OllamaSummarizer;

use crate::config::{InferenceSettings, SummaryProvider, SummarySettings};

/// Shown instead of a summary when the input is too short to summarize.
pub const TOO_SHORT_SENTINEL: &str = "Text too short for summarization.";

/// Errors from summarization backends.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Summarizer connection failed: {0}")]
    Connection(String),

    #[error("Summarizer API error: {0}")]
    Api(String),

    #[error("Failed to parse summarizer response: {0}")]
    Parse(String),
}

/// Output length bounds passed to the model, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min_length: u32,
    pub max_length: u32,
}

impl LengthBounds {
    pub fn from_settings(settings: &SummarySettings) -> Self {
        Self {
            min_length: settings.min_length,
            max_length: settings.max_length,
        }
    }
}

/// Result of summarizing corrected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Summary {
    /// Model-generated summary.
    Generated(String),
    /// Input was empty or below the word minimum; no model call was made.
    TooShort,
}

impl Summary {
    /// Text shown to users.
    pub fn display(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::TooShort => TOO_SHORT_SENTINEL,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }
}

/// A summarization model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Summarize `text` within `bounds`.
    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError>;
}

/// Build the configured summarizer backend.
pub fn create_summarizer(
    settings: &SummarySettings,
    inference: &InferenceSettings,
) -> Result<Arc<dyn Summarizer>, SummarizeError> {
    match settings.provider {
        SummaryProvider::HuggingFace => Ok(Arc::new(HuggingFaceSummarizer::new(
            inference,
            &settings.model,
        )?)),
        SummaryProvider::Ollama => Ok(Arc::new(OllamaSummarizer::new(
            &settings.ollama_endpoint,
            &settings.ollama_model,
            inference.timeout_secs,
        )?)),
    }
}
