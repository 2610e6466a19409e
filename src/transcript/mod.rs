//! Transcript acquisition.
//!
//! A [`TranscriptSource`] returns the timed caption segments a platform
//! already has for a video. The [`TranscriptResolver`] turns those segments
//! into a single text, falling back to audio transcription when configured.

mod resolver;
mod youtube;

pub use resolver::{ResolverOptions, TranscriptOrigin, TranscriptResolution, TranscriptResolver};
pub use youtube::YoutubeTranscriptService;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A timestamped snippet of spoken text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Trait for remote transcript services.
///
/// Implementations report [`StemningError::NoTranscript`] when the video has
/// no transcript in the requested language and
/// [`StemningError::TranscriptsDisabled`] when captions are turned off.
///
/// [`StemningError::NoTranscript`]: crate::error::StemningError::NoTranscript
/// [`StemningError::TranscriptsDisabled`]: crate::error::StemningError::TranscriptsDisabled
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the ordered caption segments for a video.
    async fn fetch_segments(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSegment>>;
}
