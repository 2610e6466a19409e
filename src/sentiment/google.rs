//! Google Cloud Natural Language sentiment client.

use super::{Sentiment, SentimentAnalyzer};
use crate::error::{Result, StemningError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const LANGUAGE_API_BASE: &str = "https://language.googleapis.com/v1";

/// Default timeout for sentiment requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sentiment analyzer backed by `documents:analyzeSentiment`.
pub struct GoogleSentimentAnalyzer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleSentimentAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, LANGUAGE_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SentimentAnalyzer for GoogleSentimentAnalyzer {
    #[instrument(skip_all, fields(chars = text.len()))]
    async fn analyze(&self, text: &str) -> Result<Sentiment> {
        let request = AnalyzeSentimentRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let response = self
            .client
            .post(format!("{}/documents:analyzeSentiment", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StemningError::ExternalCall {
                message: format!("analyzeSentiment {}: {}", status.as_u16(), body.trim()),
                code: Some(status.as_u16()),
            });
        }

        let parsed: AnalyzeSentimentResponse = response.json().await?;
        Ok(parsed.document_sentiment.into())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeSentimentRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeSentimentResponse {
    document_sentiment: DocumentSentiment,
}

/// The API omits fields that are zero.
#[derive(Debug, Default, Deserialize)]
struct DocumentSentiment {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    magnitude: f64,
}

impl From<DocumentSentiment> for Sentiment {
    fn from(s: DocumentSentiment) -> Self {
        Sentiment::new(s.score, s.magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = AnalyzeSentimentRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: "what a lovely room",
            },
            encoding_type: "UTF8",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "document": {"type": "PLAIN_TEXT", "content": "what a lovely room"},
                "encodingType": "UTF8"
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "documentSentiment": {"magnitude": 1.3, "score": 0.6},
            "language": "en",
            "sentences": []
        }"#;
        let parsed: AnalyzeSentimentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(Sentiment::from(parsed.document_sentiment), Sentiment::new(0.6, 1.3));

        let neutral: AnalyzeSentimentResponse =
            serde_json::from_str(r#"{"documentSentiment": {}}"#).unwrap();
        assert_eq!(Sentiment::from(neutral.document_sentiment), Sentiment::default());
    }
}
