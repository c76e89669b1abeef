//! The extraction pipeline.
//!
//! image bytes → decode → primary OCR → (fallback OCR) → normalize →
//! correct → summarize. Engines, corrector and summarizer are built once at
//! startup and shared read-only across requests.

use std::sync::Arc;

use image::RgbImage;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::ocr::{create_backend, OcrBackendType, OcrError, OcrSelection, OcrSelector};
use crate::summarize::{create_summarizer, SummarizeError, SummarizerAdapter, Summary};
use crate::text::{
    correct_or_original, CorrectionError, LanguageToolCorrector, PassthroughCorrector,
    TextCorrector,
};

/// Errors that abort a pipeline run or its construction.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No image uploaded")]
    EmptyUpload,

    #[error("Could not decode image: {0}")]
    ImageDecode(String),

    #[error("Summarization failed: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("OCR setup failed: {0}")]
    OcrSetup(#[from] OcrError),

    #[error("Corrector setup failed: {0}")]
    CorrectorSetup(#[from] CorrectionError),

    #[error("OCR task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Text produced by the OCR stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractedText {
    /// Normalized text from the selected engine.
    Clean { text: String },
    /// The primary engine failed; no text was produced.
    EngineError {
        engine: OcrBackendType,
        message: String,
    },
}

/// Everything a single upload produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    /// Engine whose output was used (or which failed).
    pub engine: OcrBackendType,
    pub used_fallback: bool,
    pub extracted: ExtractedText,
    /// Corrected text; absent when OCR failed.
    pub corrected: Option<String>,
    /// Summary of the corrected text. OCR failures count as too short.
    pub summary: Summary,
}

impl PipelineOutcome {
    /// Clean OCR text, or an error marker such as "Tesseract Error: ..." for display.
    pub fn display_text(&self) -> String {
        match &self.extracted {
            ExtractedText::Clean { text } => text.clone(),
            ExtractedText::EngineError { engine, message } => {
                format!("{} Error: {}", engine.display_name(), message)
            }
        }
    }

    /// Corrected text for display, falling back to [`display_text`](Self::display_text).
    pub fn display_corrected(&self) -> String {
        self.corrected
            .clone()
            .unwrap_or_else(|| self.display_text())
    }

    /// Summary text for display.
    pub fn display_summary(&self) -> &str {
        self.summary.display()
    }
}

/// Process-wide pipeline service.
pub struct Pipeline {
    selector: Arc<OcrSelector>,
    corrector: Arc<dyn TextCorrector>,
    summarizer: SummarizerAdapter,
}

impl Pipeline {
    pub fn new(
        selector: OcrSelector,
        corrector: Arc<dyn TextCorrector>,
        summarizer: SummarizerAdapter,
    ) -> Self {
        Self {
            selector: Arc::new(selector),
            corrector,
            summarizer,
        }
    }

    /// Build engines, corrector and summarizer from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let primary = create_backend(&settings.ocr.primary, settings)?;
        let fallback = settings
            .ocr
            .fallback
            .as_deref()
            .map(|name| create_backend(name, settings))
            .transpose()?;
        let selector = OcrSelector::new(primary, fallback, settings.ocr.min_clear_chars);

        let corrector: Arc<dyn TextCorrector> = if settings.corrector.enabled {
            Arc::new(LanguageToolCorrector::new(&settings.corrector)?)
        } else {
            Arc::new(PassthroughCorrector)
        };

        let summarizer = SummarizerAdapter::new(
            create_summarizer(&settings.summary, &settings.inference)?,
            &settings.summary,
        );

        info!(
            "pipeline ready: primary={} fallback={} corrector={} summarizer={}",
            settings.ocr.primary,
            settings.ocr.fallback.as_deref().unwrap_or("none"),
            corrector.name(),
            summarizer.summarizer_name()
        );

        Ok(Self::new(selector, corrector, summarizer))
    }

    pub fn selector(&self) -> &OcrSelector {
        &self.selector
    }

    /// Decode uploaded bytes into a three-channel image.
    pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }
        let decoded =
            image::load_from_memory(bytes).map_err(|e| PipelineError::ImageDecode(e.to_string()))?;
        Ok(decoded.to_rgb8())
    }

    /// Run the full pipeline on uploaded image bytes.
    pub async fn process(&self, bytes: Vec<u8>) -> Result<PipelineOutcome, PipelineError> {
        let selector = Arc::clone(&self.selector);
        let selection = tokio::task::spawn_blocking(move || {
            let image = Self::decode_image(&bytes)?;
            debug!("decoded {}x{} image", image.width(), image.height());
            Ok::<_, PipelineError>(selector.select(&image))
        })
        .await??;

        self.finish(selection).await
    }

    /// Correct and summarize the text chosen by OCR selection.
    pub async fn finish(&self, selection: OcrSelection) -> Result<PipelineOutcome, PipelineError> {
        let engine = selection.backend();
        let used_fallback = selection.used_fallback();

        let text = match selection {
            OcrSelection::Primary { text, .. } | OcrSelection::Fallback { text, .. } => text,
            OcrSelection::Failed { backend, error } => {
                return Ok(PipelineOutcome {
                    engine,
                    used_fallback,
                    extracted: ExtractedText::EngineError {
                        engine: backend,
                        message: error.to_string(),
                    },
                    corrected: None,
                    summary: Summary::TooShort,
                });
            }
        };

        let corrected = correct_or_original(self.corrector.as_ref(), &text).await;
        let summary = self.summarizer.summarize(&corrected).await?;

        Ok(PipelineOutcome {
            engine,
            used_fallback,
            extracted: ExtractedText::Clean { text },
            corrected: Some(corrected),
            summary,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    const FALLBACK_TEXT: &str = "Hello world, this is a test documnet with more than fifteen words to trigger summarization properly.";

    #[tokio::test]
    async fn test_unclear_primary_falls_back_and_summarizes() {
        let primary = MockOcr::new(OcrBackendType::Tesseract, Ok("Helo wrld"));
        let fallback = MockOcr::new(OcrBackendType::TrOcr, Ok(FALLBACK_TEXT));
        let summarizer = MockSummarizer::new();
        let pipeline = pipeline(primary.clone(), Some(fallback.clone()), false, summarizer.clone());

        let outcome = pipeline.process(png_bytes()).await.unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert!(outcome.used_fallback);
        assert_eq!(outcome.engine, OcrBackendType::TrOcr);
        assert_eq!(outcome.display_text(), FALLBACK_TEXT);
        assert_eq!(
            outcome.corrected.as_deref(),
            Some("Hello world, this is a test document with more than fifteen words to trigger summarization properly.")
        );
        let summary = outcome.summary;
        assert!(summary.is_generated());
        assert_eq!(summary.display(), "Hello world, this is a");
        assert_eq!(summarizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_short_text_gets_sentinel_without_model_call() {
        let primary = MockOcr::new(
            OcrBackendType::Tesseract,
            Ok("Only a handful of words were read here."),
        );
        let summarizer = MockSummarizer::new();
        let pipeline = pipeline(primary, None, false, summarizer.clone());

        let outcome = pipeline.process(png_bytes()).await.unwrap();
        assert_eq!(outcome.summary, Summary::TooShort);
        assert_eq!(outcome.display_summary(), crate::summarize::TOO_SHORT_SENTINEL);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_corrector_failure_keeps_clean_text() {
        let primary = MockOcr::new(OcrBackendType::Tesseract, Ok(FALLBACK_TEXT));
        let pipeline = pipeline(primary, None, true, MockSummarizer::new());

        let outcome = pipeline.process(png_bytes()).await.unwrap();
        assert_eq!(outcome.corrected.as_deref(), Some(FALLBACK_TEXT));
    }

    #[tokio::test]
    async fn test_primary_failure_becomes_error_marker() {
        let primary = MockOcr::new(OcrBackendType::Tesseract, Err("tesseract failed: bad input"));
        let fallback = MockOcr::new(OcrBackendType::TrOcr, Ok("unused"));
        let summarizer = MockSummarizer::new();
        let pipeline = pipeline(primary, Some(fallback.clone()), false, summarizer.clone());

        let outcome = pipeline.process(png_bytes()).await.unwrap();
        assert_eq!(
            outcome.display_text(),
            "Tesseract Error: OCR failed: tesseract failed: bad input"
        );
        assert_eq!(outcome.display_corrected(), outcome.display_text());
        assert_eq!(outcome.summary, Summary::TooShort);
        assert_eq!(outcome.display_summary(), crate::summarize::TOO_SHORT_SENTINEL);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_error() {
        let primary = MockOcr::new(OcrBackendType::Tesseract, Ok("never"));
        let pipeline = pipeline(primary.clone(), None, false, MockSummarizer::new());

        let err = pipeline.process(b"not an image".to_vec()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ImageDecode(_)));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_error() {
        let primary = MockOcr::new(OcrBackendType::Tesseract, Ok("never"));
        let pipeline = pipeline(primary, None, false, MockSummarizer::new());
        let err = pipeline.process(Vec::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyUpload));
    }

    #[test]
    fn test_decode_converts_to_rgb() {
        let gray = image::GrayImage::new(3, 5);
        let mut buf = std::io::Cursor::new(Vec::new());
        gray.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let rgb = Pipeline::decode_image(buf.get_ref()).unwrap();
        assert_eq!((rgb.width(), rgb.height()), (3, 5));
    }

    #[test]
    fn test_outcome_serializes() {
        let outcome = PipelineOutcome {
            engine: OcrBackendType::Tesseract,
            used_fallback: false,
            extracted: ExtractedText::Clean {
                text: "abc".to_string(),
            },
            corrected: Some("abc".to_string()),
            summary: Summary::TooShort,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["engine"], "tesseract");
        assert_eq!(json["extracted"]["status"], "clean");
        assert_eq!(json["extracted"]["text"], "abc");
        assert_eq!(json["summary"]["kind"], "too_short");
    }

    #[test]
    fn test_from_settings_builds_default_pipeline() {
        let pipeline = Pipeline::from_settings(&Settings::default()).unwrap();
        assert_eq!(
            pipeline.selector().primary().backend_type(),
            OcrBackendType::Tesseract
        );
        assert_eq!(
            pipeline.selector().fallback().map(|f| f.backend_type()),
            Some(OcrBackendType::TrOcr)
        );
        assert_eq!(pipeline.selector().min_clear_chars(), 25);
    }
}
