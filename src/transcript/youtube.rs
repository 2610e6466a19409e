//! YouTube caption transcript service.

use super::{TranscriptSegment, TranscriptSource};
use crate::error::{Result, StemningError};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};

/// Transcript service backed by YouTube's own caption tracks.
pub struct YoutubeTranscriptService {
    api: YouTubeTranscriptApi,
}

impl YoutubeTranscriptService {
    pub fn new() -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            StemningError::Config(format!("Failed to create transcript client: {}", e))
        })?;
        Ok(Self { api })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptService {
    #[instrument(skip(self))]
    async fn fetch_segments(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSegment>> {
        let transcript = self
            .api
            .fetch_transcript(video_id, &[language], false)
            .await
            .map_err(|e| translate_error(video_id, language, e))?;

        debug!(
            language = %transcript.language_code,
            generated = transcript.is_generated,
            snippets = transcript.snippets.len(),
            "Fetched captions"
        );

        Ok(transcript
            .snippets
            .into_iter()
            .map(|s| TranscriptSegment::new(s.text, s.start, s.duration))
            .collect())
    }
}

/// Map the caption client's failure onto the resolver's error kinds.
fn translate_error(video_id: &str, language: &str, err: CouldNotRetrieveTranscript) -> StemningError {
    match &err.reason {
        Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled) => {
            StemningError::TranscriptsDisabled(video_id.to_string())
        }
        Some(CouldNotRetrieveTranscriptReason::NoTranscriptFound { .. }) => StemningError::NoTranscript {
            video_id: video_id.to_string(),
            language: language.to_string(),
        },
        _ => StemningError::external(format!("captions for {}: {}", video_id, err)),
    }
}
