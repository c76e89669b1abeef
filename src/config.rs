//! Configuration for scansum.
//!
//! Settings come from three layers, later layers winning:
//! built-in defaults, a TOML file (`--config` or `./scansum.toml`), and
//! environment variables (a `.env` file is loaded by `main`).

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "scansum.toml";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory uploaded images are saved to.
    pub upload_dir: PathBuf,
    /// Maximum accepted request body for uploads, in bytes.
    pub max_upload_bytes: usize,
    pub ocr: OcrSettings,
    pub inference: InferenceSettings,
    pub corrector: CorrectorSettings,
    pub summary: SummarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            ocr: OcrSettings::default(),
            inference: InferenceSettings::default(),
            corrector: CorrectorSettings::default(),
            summary: SummarySettings::default(),
        }
    }
}

/// OCR engine selection and the fallback heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Engine tried first ("tesseract" or "trocr").
    pub primary: String,
    /// Engine used when the primary result looks unclear. `None` disables fallback.
    pub fallback: Option<String>,
    /// Path or name of the tesseract executable.
    pub tesseract_cmd: String,
    /// Tesseract language code.
    pub language: String,
    /// Normalized primary output shorter than this many characters triggers the fallback.
    pub min_clear_chars: usize,
    /// Handwriting model served by the inference endpoint.
    pub trocr_model: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            primary: "tesseract".to_string(),
            fallback: Some("trocr".to_string()),
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            min_clear_chars: 25,
            trocr_model: "microsoft/trocr-base-handwritten".to_string(),
        }
    }
}

/// Hosted model inference endpoint (Hugging Face compatible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Base URL; the model id is appended as a path segment.
    pub api_url: String,
    /// Bearer token, if the endpoint requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api-inference.huggingface.co/models".to_string(),
            token: None,
            timeout_secs: 120,
        }
    }
}

/// Spelling/grammar correction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorSettings {
    pub enabled: bool,
    /// LanguageTool server base URL.
    pub endpoint: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for CorrectorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:8081".to_string(),
            language: "en-US".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Summarization model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    /// Hosted `summarization` pipeline (default).
    #[default]
    HuggingFace,
    /// Local Ollama server.
    Ollama,
}

impl SummaryProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Some(Self::HuggingFace),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// Summarization settings, including the short-input and chunking heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub provider: SummaryProvider,
    /// Model id for the hosted summarization pipeline.
    pub model: String,
    /// Inputs with fewer words are not summarized.
    pub min_words: usize,
    /// Inputs longer than this many characters are summarized in chunks of this size.
    pub chunk_chars: usize,
    /// Lower bound on generated summary length (tokens).
    pub min_length: u32,
    /// Upper bound on generated summary length (tokens).
    pub max_length: u32,
    pub ollama_endpoint: String,
    pub ollama_model: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            provider: SummaryProvider::default(),
            model: "facebook/bart-large-cnn".to_string(),
            min_words: 15,
            chunk_chars: 500,
            min_length: 25,
            max_length: 80,
            ollama_endpoint: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `./scansum.toml` if it exists, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(settings.with_env_overrides())
    }

    /// Parse a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `SCANSUM_UPLOAD_DIR`, `SCANSUM_MAX_UPLOAD_BYTES`
    /// - `OCR_PRIMARY`, `OCR_FALLBACK` ("none" disables), `TESSERACT_CMD`,
    ///   `OCR_LANGUAGE`, `OCR_MIN_CLEAR_CHARS`, `TROCR_MODEL`
    /// - `HF_API_URL`, `HF_TOKEN`
    /// - `CORRECTOR_ENABLED`, `LANGUAGETOOL_URL`, `CORRECTOR_LANGUAGE`
    /// - `SUMMARY_PROVIDER`, `SUMMARY_MODEL`, `SUMMARY_MIN_WORDS`,
    ///   `SUMMARY_CHUNK_CHARS`, `OLLAMA_URL`, `OLLAMA_MODEL`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(val) = get("SCANSUM_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(val);
        }
        if let Some(n) = parse(get("SCANSUM_MAX_UPLOAD_BYTES")) {
            self.max_upload_bytes = n;
        }

        if let Some(val) = get("OCR_PRIMARY") {
            self.ocr.primary = val;
        }
        if let Some(val) = get("OCR_FALLBACK") {
            self.ocr.fallback = if val.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(val)
            };
        }
        if let Some(val) = get("TESSERACT_CMD") {
            self.ocr.tesseract_cmd = val;
        }
        if let Some(val) = get("OCR_LANGUAGE") {
            self.ocr.language = val;
        }
        if let Some(n) = parse(get("OCR_MIN_CLEAR_CHARS")) {
            self.ocr.min_clear_chars = n;
        }
        if let Some(val) = get("TROCR_MODEL") {
            self.ocr.trocr_model = val;
        }

        if let Some(val) = get("HF_API_URL") {
            self.inference.api_url = val;
        }
        if let Some(val) = get("HF_TOKEN") {
            self.inference.token = Some(val);
        }

        if let Some(val) = get("CORRECTOR_ENABLED") {
            self.corrector.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(val) = get("LANGUAGETOOL_URL") {
            self.corrector.endpoint = val;
        }
        if let Some(val) = get("CORRECTOR_LANGUAGE") {
            self.corrector.language = val;
        }

        if let Some(provider) = get("SUMMARY_PROVIDER").and_then(|v| SummaryProvider::from_str(&v)) {
            self.summary.provider = provider;
        }
        if let Some(val) = get("SUMMARY_MODEL") {
            self.summary.model = val;
        }
        if let Some(n) = parse(get("SUMMARY_MIN_WORDS")) {
            self.summary.min_words = n;
        }
        if let Some(n) = parse(get("SUMMARY_CHUNK_CHARS")) {
            self.summary.chunk_chars = n;
        }
        if let Some(val) = get("OLLAMA_URL") {
            self.summary.ollama_endpoint = val;
        }
        if let Some(val) = get("OLLAMA_MODEL") {
            self.summary.ollama_model = val;
        }
        self
    }

    /// Create the upload directory if needed.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir)
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}
