//! Hosted `summarization` pipeline (Hugging Face inference API or compatible).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LengthBounds, SummarizeError, Summarizer};
use crate::config::InferenceSettings;

/// Summarizer calling `POST {api_url}/{model}`.
pub struct HuggingFaceSummarizer {
    endpoint: String,
    model: String,
    token: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryText {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummarizationResponse {
    Summaries(Vec<SummaryText>),
    Error { error: String },
}

impl HuggingFaceSummarizer {
    pub fn new(inference: &InferenceSettings, model: &str) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(inference.timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: inference.api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: inference.token.clone(),
            client,
        })
    }
}

fn build_request(text: &str, bounds: LengthBounds) -> SummarizationRequest<'_> {
    SummarizationRequest {
        inputs: text,
        parameters: SummarizationParameters {
            min_length: bounds.min_length,
            max_length: bounds.max_length,
            do_sample: false,
        },
    }
}

fn parse_summary(body: &str) -> Result<String, SummarizeError> {
    let parsed: SummarizationResponse =
        serde_json::from_str(body).map_err(|e| SummarizeError::Parse(e.to_string()))?;

    match parsed {
        SummarizationResponse::Summaries(items) => items
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| SummarizeError::Parse("empty summary list".to_string())),
        SummarizationResponse::Error { error } => Err(SummarizeError::Api(error)),
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError> {
        let url = format!("{}/{}", self.endpoint, self.model);
        debug!("summarizing {} chars with {}", text.len(), self.model);

        let mut request = self.client.post(&url).json(&build_request(text, bounds));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SummarizeError::Connection(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SummarizeError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(SummarizeError::Api(format!("HTTP {}: {}", status, body)));
        }

        parse_summary(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let bounds = LengthBounds {
            min_length: 25,
            max_length: 80,
        };
        let json = serde_json::to_value(build_request("some text", bounds)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inputs": "some text",
                "parameters": {"min_length": 25, "max_length": 80, "do_sample": false}
            })
        );
    }

    #[test]
    fn test_parse_summary() {
        let out = parse_summary(r#"[{"summary_text": "A short recap."}]"#).unwrap();
        assert_eq!(out, "A short recap.");
    }

    #[test]
    fn test_parse_empty_list_is_error() {
        assert!(matches!(parse_summary("[]"), Err(SummarizeError::Parse(_))));
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_summary(r#"{"error": "Model facebook/bart-large-cnn is currently loading"}"#)
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Api(msg) if msg.contains("loading")));
    }
}
