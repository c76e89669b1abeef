//! Spelling and grammar correction.
//!
//! Correction is best-effort. Backends report failures through
//! [`CorrectionError`], and [`correct_or_original`] degrades to the
//! uncorrected text so callers always get a string back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CorrectorSettings;

/// Errors from correction backends.
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Corrector connection failed: {0}")]
    Connection(String),

    #[error("Corrector API error: {0}")]
    Api(String),

    #[error("Failed to parse corrector response: {0}")]
    Parse(String),
}

/// A spelling/grammar correction service.
#[async_trait]
pub trait TextCorrector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Return a corrected copy of `text`.
    async fn correct(&self, text: &str) -> Result<String, CorrectionError>;
}

/// Correct `text`, returning it unchanged if the corrector fails.
pub async fn correct_or_original(corrector: &dyn TextCorrector, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match corrector.correct(text).await {
        Ok(corrected) => corrected,
        Err(e) => {
            warn!("{} correction failed, keeping original text: {}", corrector.name(), e);
            text.to_string()
        }
    }
}

/// Corrector used when correction is disabled.
pub struct PassthroughCorrector;

#[async_trait]
impl TextCorrector for PassthroughCorrector {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        Ok(text.to_string())
    }
}

/// A single suggested edit. Offsets are UTF-16 code units, as LanguageTool reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub length: usize,
    pub replacement: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<CheckMatch>,
}

#[derive(Debug, Deserialize)]
struct CheckMatch {
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

/// Corrector backed by a LanguageTool server (`/v2/check`).
pub struct LanguageToolCorrector {
    endpoint: String,
    language: String,
    client: Client,
}

impl LanguageToolCorrector {
    pub fn new(settings: &CorrectorSettings) -> Result<Self, CorrectionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CorrectionError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            language: settings.language.clone(),
            client,
        })
    }
}

#[async_trait]
impl TextCorrector for LanguageToolCorrector {
    fn name(&self) -> &str {
        "languagetool"
    }

    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let url = format!("{}/v2/check", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| CorrectionError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CorrectionError::Api(format!("HTTP {}", resp.status())));
        }

        let body: CheckResponse = resp
            .json()
            .await
            .map_err(|e| CorrectionError::Parse(e.to_string()))?;

        let edits: Vec<Edit> = body
            .matches
            .into_iter()
            .filter_map(|m| {
                m.replacements.into_iter().next().map(|r| Edit {
                    offset: m.offset,
                    length: m.length,
                    replacement: r.value,
                })
            })
            .collect();

        debug!("languagetool suggested {} edits", edits.len());
        apply_edits(text, &edits)
    }
}

/// Apply non-overlapping edits to `text`. Overlapping edits after the first are skipped.
pub fn apply_edits(text: &str, edits: &[Edit]) -> Result<String, CorrectionError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| e.offset);

    let mut accepted: Vec<&Edit> = Vec::with_capacity(sorted.len());
    let mut covered_to = 0;
    for edit in sorted {
        if edit.offset < covered_to {
            continue;
        }
        covered_to = edit.offset + edit.length;
        accepted.push(edit);
    }

    let mut result = text.to_string();
    for edit in accepted.into_iter().rev() {
        let start = utf16_to_byte(text, edit.offset)?;
        let end = utf16_to_byte(text, edit.offset + edit.length)?;
        result.replace_range(start..end, &edit.replacement);
    }
    Ok(result)
}

fn utf16_to_byte(text: &str, utf16_offset: usize) -> Result<usize, CorrectionError> {
    let mut units = 0;
    for (byte_idx, c) in text.char_indices() {
        if units == utf16_offset {
            return Ok(byte_idx);
        }
        units += c.len_utf16();
    }
    if units == utf16_offset {
        return Ok(text.len());
    }
    Err(CorrectionError::Parse(format!(
        "edit offset {} outside text",
        utf16_offset
    )))
}
