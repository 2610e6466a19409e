//! Transcript resolution with a configurable fallback.

use super::{TranscriptSegment, TranscriptSource};
use crate::config::{FallbackPolicy, TranscriptSettings};
use crate::stats::RunStatistics;
use crate::transcription::AudioTranscriber;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options controlling how a transcript is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    /// Preferred transcript language.
    pub language: String,
    /// Drop segments containing filler words.
    pub filter_fillers: bool,
    /// Filler words, compared case-insensitively.
    pub filler_words: Vec<String>,
    /// What to do when the service has no transcript.
    pub fallback: FallbackPolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from(&TranscriptSettings::default())
    }
}

impl From<&TranscriptSettings> for ResolverOptions {
    fn from(settings: &TranscriptSettings) -> Self {
        Self {
            language: settings.language.clone(),
            filter_fillers: settings.filter_fillers,
            filler_words: settings
                .filler_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            fallback: settings.fallback,
        }
    }
}

/// Where a resolved transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOrigin {
    /// The platform's transcript service.
    Service,
    /// Speech-to-text over the downloaded audio.
    AudioFallback,
    /// No transcript could be obtained.
    Unavailable,
}

/// Outcome of resolving one video's transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResolution {
    pub text: Option<String>,
    pub origin: TranscriptOrigin,
    /// Whether the transcript service answered.
    pub service_succeeded: bool,
    /// Outcome of the audio fallback, when it ran.
    pub fallback_succeeded: Option<bool>,
}

impl TranscriptResolution {
    fn from_service(text: String) -> Self {
        Self {
            text: Some(text),
            origin: TranscriptOrigin::Service,
            service_succeeded: true,
            fallback_succeeded: None,
        }
    }

    fn unavailable(fallback_succeeded: Option<bool>) -> Self {
        Self {
            text: None,
            origin: TranscriptOrigin::Unavailable,
            service_succeeded: false,
            fallback_succeeded,
        }
    }

    /// Add this outcome to the run counters.
    pub fn record(&self, stats: &mut RunStatistics) {
        if self.service_succeeded {
            stats.api_success += 1;
        } else {
            stats.api_failure += 1;
        }

        match self.fallback_succeeded {
            Some(true) => stats.transcription_success += 1,
            Some(false) => stats.transcription_failure += 1,
            None => {}
        }
    }
}

/// Resolves transcripts from the service, falling back to audio transcription.
pub struct TranscriptResolver {
    source: Arc<dyn TranscriptSource>,
    audio: Option<Arc<dyn AudioTranscriber>>,
    options: ResolverOptions,
}

impl TranscriptResolver {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        audio: Option<Arc<dyn AudioTranscriber>>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            source,
            audio,
            options,
        }
    }

    /// Resolve the transcript for a video. Never fails: problems leave the text absent.
    pub async fn resolve(&self, video_id: &str) -> TranscriptResolution {
        let error = match self
            .source
            .fetch_segments(video_id, &self.options.language)
            .await
        {
            Ok(segments) => {
                debug!("Transcript service returned {} segments for {}", segments.len(), video_id);
                return TranscriptResolution::from_service(self.join_segments(&segments));
            }
            Err(e) => e,
        };

        if !error.is_transcript_unavailable() {
            warn!("Transcript fetch failed for {}: {}", video_id, error);
            return TranscriptResolution::unavailable(None);
        }

        match self.options.fallback {
            FallbackPolicy::GiveUp => {
                info!("No transcript for {} ({}), not transcribing", video_id, error);
                TranscriptResolution::unavailable(None)
            }
            FallbackPolicy::Transcribe => {
                info!("No transcript for {} ({}), transcribing audio", video_id, error);
                self.transcribe_audio(video_id).await
            }
        }
    }

    async fn transcribe_audio(&self, video_id: &str) -> TranscriptResolution {
        let Some(audio) = &self.audio else {
            warn!("Audio transcription is not configured, skipping {}", video_id);
            return TranscriptResolution::unavailable(Some(false));
        };

        match audio
            .transcribe_video(video_id, Some(&self.options.language))
            .await
        {
            Ok(text) => TranscriptResolution {
                text: Some(text),
                origin: TranscriptOrigin::AudioFallback,
                service_succeeded: false,
                fallback_succeeded: Some(true),
            },
            Err(e) => {
                warn!("Audio transcription failed for {}: {}", video_id, e);
                TranscriptResolution::unavailable(Some(false))
            }
        }
    }

    fn join_segments(&self, segments: &[TranscriptSegment]) -> String {
        segments
            .iter()
            .filter(|s| !self.options.filter_fillers || !self.contains_filler(&s.text))
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whole-word match, not substring: "um" drops "um, so" but keeps "umbrella".
    fn contains_filler(&self, text: &str) -> bool {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .any(|w| self.options.filler_words.iter().any(|f| *f == w))
    }
}
