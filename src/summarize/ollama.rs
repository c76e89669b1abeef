//! Ollama-backed summarizer for running without a hosted inference API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LengthBounds, SummarizeError, Summarizer};

const SUMMARY_PROMPT: &str = "Summarize the following text in one short paragraph \
of roughly {min} to {max} words. Reply with the summary only.\n\n{content}";

/// Summarizer using Ollama's `/api/generate`.
pub struct OllamaSummarizer {
    endpoint: String,
    model: String,
    client: Client,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaSummarizer {
    pub fn new(endpoint: &str, model: &str, timeout_secs: u64) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    fn build_request(&self, text: &str, bounds: LengthBounds) -> OllamaRequest {
        let prompt = SUMMARY_PROMPT
            .replace("{min}", &bounds.min_length.to_string())
            .replace("{max}", &bounds.max_length.to_string())
            .replace("{content}", text);

        OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: OllamaOptions {
                // Deterministic output, like do_sample=false.
                temperature: 0.0,
                num_predict: bounds.max_length * 2,
            },
        }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!("summarizing {} chars with ollama model {}", text.len(), self.model);

        let resp = self
            .client
            .post(&url)
            .json(&self.build_request(text, bounds))
            .send()
            .await
            .map_err(|e| SummarizeError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SummarizeError::Api(format!("HTTP {}", resp.status())));
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| SummarizeError::Parse(e.to_string()))?;

        let summary = body.response.trim().to_string();
        if summary.is_empty() {
            return Err(SummarizeError::Parse("Empty summary response".to_string()));
        }
        Ok(summary)
    }
}
