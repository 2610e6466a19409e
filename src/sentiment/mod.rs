//! Transcript sentiment scoring.
//!
//! Long transcripts are split with [`chunk_text`] and each chunk is scored
//! independently; the transcript's sentiment is the mean over the chunks that
//! scored successfully.

mod google;

pub use google::GoogleSentimentAnalyzer;

use crate::chunking::chunk_text;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Document-level sentiment as reported by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Polarity in `[-1, 1]`.
    pub score: f64,
    /// Emotional strength, unbounded and non-negative.
    pub magnitude: f64,
}

impl Sentiment {
    pub fn new(score: f64, magnitude: f64) -> Self {
        Self { score, magnitude }
    }
}

/// Trait for sentiment models.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Score a plain-text document.
    async fn analyze(&self, text: &str) -> Result<Sentiment>;
}

/// Aggregated sentiment for a whole transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SentimentSummary {
    pub score: f64,
    pub magnitude: f64,
    pub chunks_scored: usize,
    pub chunks_failed: usize,
}

/// Chunk a transcript, score every chunk once, and average the results.
///
/// Failing chunks are logged and left out of the mean. With nothing scored
/// the summary is zero.
pub async fn analyze_transcript(
    analyzer: &dyn SentimentAnalyzer,
    text: &str,
    max_chars: usize,
) -> SentimentSummary {
    let chunks = chunk_text(text, max_chars);
    let mut summary = SentimentSummary::default();
    let mut score_sum = 0.0;
    let mut magnitude_sum = 0.0;

    for (idx, chunk) in chunks.iter().enumerate() {
        match analyzer.analyze(chunk).await {
            Ok(sentiment) => {
                score_sum += sentiment.score;
                magnitude_sum += sentiment.magnitude;
                summary.chunks_scored += 1;
            }
            Err(e) => {
                warn!("Sentiment scoring failed for chunk {}: {}", idx, e);
                summary.chunks_failed += 1;
            }
        }
    }

    if summary.chunks_scored > 0 {
        let n = summary.chunks_scored as f64;
        summary.score = score_sum / n;
        summary.magnitude = magnitude_sum / n;
    }

    debug!(
        "Scored {}/{} chunks: score {:.3}, magnitude {:.3}",
        summary.chunks_scored,
        chunks.len(),
        summary.score,
        summary.magnitude
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StemningError;
    use std::sync::Mutex;

    /// Scores each chunk by a lookup on its first word.
    struct FakeAnalyzer {
        calls: Mutex<Vec<String>>,
    }

    impl FakeAnalyzer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SentimentAnalyzer for FakeAnalyzer {
        async fn analyze(&self, text: &str) -> Result<Sentiment> {
            self.calls.lock().unwrap().push(text.to_string());
            match text.split_whitespace().next() {
                Some("good") => Ok(Sentiment::new(0.8, 2.0)),
                Some("bad") => Ok(Sentiment::new(-0.4, 1.0)),
                Some("meh") => Ok(Sentiment::new(0.0, 0.0)),
                _ => Err(StemningError::external("model unavailable")),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_transcript_is_zero() {
        let analyzer = FakeAnalyzer::new();
        let summary = analyze_transcript(&analyzer, "", 400).await;
        assert_eq!(summary, SentimentSummary::default());
        assert!(analyzer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mean_over_chunks() {
        let analyzer = FakeAnalyzer::new();
        // A bound of 10 yields one chunk per pair of short words.
        let summary = analyze_transcript(&analyzer, "good day bad day meh day", 10).await;

        assert_eq!(summary.chunks_scored, 3);
        assert!((summary.score - (0.8 - 0.4 + 0.0) / 3.0).abs() < 1e-9);
        assert!((summary.magnitude - 1.0).abs() < 1e-9);
        assert_eq!(analyzer.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_chunks_are_excluded() {
        let analyzer = FakeAnalyzer::new();
        let summary = analyze_transcript(&analyzer, "good day broken day", 12).await;

        assert_eq!(summary.chunks_scored, 1);
        assert_eq!(summary.chunks_failed, 1);
        assert!((summary.score - 0.8).abs() < 1e-9);
        assert!((summary.magnitude - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_total_failure_is_zero() {
        let analyzer = FakeAnalyzer::new();
        let summary = analyze_transcript(&analyzer, "broken day broken night", 14).await;

        assert_eq!(summary.chunks_scored, 0);
        assert_eq!(summary.chunks_failed, 2);
        assert_eq!((summary.score, summary.magnitude), (0.0, 0.0));
    }
}
