//! Speech-to-text fallback for videos without a usable transcript.
//!
//! The fallback downloads the audio, converts it to 16 kHz mono WAV and runs
//! it through Whisper.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::audio::{convert_to_wav, download_audio};
use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Trait for turning a video's audio into text.
#[async_trait]
pub trait AudioTranscriber: Send + Sync {
    /// Transcribe the spoken audio of a video.
    async fn transcribe_video(&self, video_id: &str, language: Option<&str>) -> Result<String>;
}

/// Download, convert and transcribe a video's audio.
pub struct AudioTranscriptionPath {
    whisper: WhisperTranscriber,
    temp_dir: PathBuf,
}

impl AudioTranscriptionPath {
    pub fn new(whisper: WhisperTranscriber, temp_dir: PathBuf) -> Self {
        Self { whisper, temp_dir }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.openai_api_key();
        let whisper = WhisperTranscriber::with_config(
            api_key.as_deref(),
            &settings.transcription.model,
            settings.transcription.chunk_duration_seconds,
        )?;
        Ok(Self::new(whisper, settings.temp_dir()))
    }
}

#[async_trait]
impl AudioTranscriber for AudioTranscriptionPath {
    #[instrument(skip(self))]
    async fn transcribe_video(&self, video_id: &str, language: Option<&str>) -> Result<String> {
        std::fs::create_dir_all(&self.temp_dir)?;
        // Everything for this video lives in one directory removed on drop.
        let work_dir = tempfile::Builder::new()
            .prefix(&format!("{}-", video_id))
            .tempdir_in(&self.temp_dir)?;

        let downloaded = download_audio(video_id, work_dir.path()).await?;
        let wav = work_dir.path().join(format!("{}.wav", video_id));
        convert_to_wav(&downloaded, &wav).await?;

        let text = self.whisper.transcribe_file(&wav, language).await?;
        info!("Transcribed {} characters from audio", text.len());
        Ok(text)
    }
}
