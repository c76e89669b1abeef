//! Short-input check and chunked summarization.

use std::sync::Arc;

use tracing::{debug, info};

use super::{LengthBounds, SummarizeError, Summarizer, Summary};
use crate::config::SummarySettings;

/// Split `text` into consecutive pieces of `chunk_chars` characters.
///
/// No overlap and no sentence awareness: a chunk may end mid-word. The last
/// chunk holds the remainder. A `chunk_chars` of zero yields the whole text.
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    if chunk_chars == 0 {
        return vec![text];
    }

    let mut chunks = Vec::with_capacity(text.len() / chunk_chars + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == chunk_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}

/// Applies the word minimum and chunking policy around a [`Summarizer`].
pub struct SummarizerAdapter {
    summarizer: Arc<dyn Summarizer>,
    min_words: usize,
    chunk_chars: usize,
    bounds: LengthBounds,
}

impl SummarizerAdapter {
    pub fn new(summarizer: Arc<dyn Summarizer>, settings: &SummarySettings) -> Self {
        Self {
            summarizer,
            min_words: settings.min_words,
            chunk_chars: settings.chunk_chars,
            bounds: LengthBounds::from_settings(settings),
        }
    }

    pub fn summarizer_name(&self) -> &str {
        self.summarizer.name()
    }

    /// Summarize corrected text.
    ///
    /// Empty input or input under the word minimum returns [`Summary::TooShort`]
    /// without calling the model. Input longer than the chunk budget is
    /// summarized chunk by chunk and the pieces joined with a space.
    pub async fn summarize(&self, text: &str) -> Result<Summary, SummarizeError> {
        let words = text.split_whitespace().count();
        if text.trim().is_empty() || words < self.min_words {
            debug!(
                "skipping summarization: {} words (minimum {})",
                words, self.min_words
            );
            return Ok(Summary::TooShort);
        }

        let chunks = if self.chunk_chars > 0 && text.chars().count() > self.chunk_chars {
            chunk_text(text, self.chunk_chars)
        } else {
            vec![text]
        };

        if chunks.len() > 1 {
            info!(
                "summarizing {} chunks of up to {} chars with {}",
                chunks.len(),
                self.chunk_chars,
                self.summarizer.name()
            );
        }

        let mut pieces = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let piece = self.summarizer.summarize(chunk, self.bounds).await?;
            pieces.push(piece.trim().to_string());
        }

        Ok(Summary::Generated(pieces.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every chunk it is asked to summarize.
    #[derive(Default)]
    struct RecordingSummarizer {
        seen: Mutex<Vec<(String, LengthBounds)>>,
    }

    impl RecordingSummarizer {
        fn seen(&self) -> Vec<(String, LengthBounds)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn summarize(
            &self,
            text: &str,
            bounds: LengthBounds,
        ) -> Result<String, SummarizeError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push((text.to_string(), bounds));
            Ok(format!(" summary{} ", seen.len()))
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn summarize(&self, _: &str, _: LengthBounds) -> Result<String, SummarizeError> {
            Err(SummarizeError::Api("HTTP 503".to_string()))
        }
    }

    fn adapter(summarizer: Arc<dyn Summarizer>) -> SummarizerAdapter {
        SummarizerAdapter::new(summarizer, &SummarySettings::default())
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_chunks_reconstruct_original() {
        let text: String = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let chunks = chunk_text(&text, 500);
        assert_eq!(chunks.concat(), text);
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|c| c.chars().count() == 500));
        assert!(chunks.last().unwrap().chars().count() <= 500);
    }

    #[test]
    fn test_chunks_respect_char_boundaries() {
        let text = "ab€cd€ef€";
        let chunks = chunk_text(text, 2);
        assert_eq!(chunks, vec!["ab", "€c", "d€", "ef", "€"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_edge_cases() {
        assert!(chunk_text("", 500).is_empty());
        assert_eq!(chunk_text("abc", 0), vec!["abc"]);
        assert_eq!(chunk_text("abc", 3), vec!["abc"]);
        assert_eq!(chunk_text("abcd", 3), vec!["abc", "d"]);
    }

    #[tokio::test]
    async fn test_short_input_skips_model() {
        let recorder = Arc::new(RecordingSummarizer::default());
        let adapter = adapter(recorder.clone());

        assert_eq!(adapter.summarize("").await.unwrap(), Summary::TooShort);
        assert_eq!(adapter.summarize("   ").await.unwrap(), Summary::TooShort);
        assert_eq!(adapter.summarize(&words(14)).await.unwrap(), Summary::TooShort);
        assert!(recorder.seen().is_empty());
    }

    #[tokio::test]
    async fn test_word_minimum_is_inclusive() {
        let recorder = Arc::new(RecordingSummarizer::default());
        let adapter = adapter(recorder.clone());

        let summary = adapter.summarize(&words(15)).await.unwrap();
        assert_eq!(summary, Summary::Generated("summary1".to_string()));
        let seen = recorder.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].1,
            LengthBounds {
                min_length: 25,
                max_length: 80
            }
        );
    }

    #[tokio::test]
    async fn test_long_input_is_chunked_and_joined() {
        let recorder = Arc::new(RecordingSummarizer::default());
        let adapter = adapter(recorder.clone());
        let text = "word ".repeat(240); // 1200 chars

        let summary = adapter.summarize(&text).await.unwrap();
        assert_eq!(
            summary,
            Summary::Generated("summary1 summary2 summary3".to_string())
        );

        let seen: Vec<String> = recorder.seen().into_iter().map(|(t, _)| t).collect();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].len(), 500);
        assert_eq!(seen[1].len(), 500);
        assert_eq!(seen[2].len(), 200);
        assert_eq!(seen.concat(), text);
    }

    #[tokio::test]
    async fn test_exactly_budget_is_not_chunked() {
        let recorder = Arc::new(RecordingSummarizer::default());
        let adapter = adapter(recorder.clone());
        let text = "abcd ".repeat(100); // 500 chars

        adapter.summarize(&text).await.unwrap();
        assert_eq!(recorder.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let adapter = adapter(Arc::new(FailingSummarizer));
        let err = adapter.summarize(&words(20)).await.unwrap_err();
        assert!(matches!(err, SummarizeError::Api(_)));
    }
}
