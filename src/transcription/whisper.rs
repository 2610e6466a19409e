//! OpenAI Whisper transcription implementation.

use crate::audio::split_audio;
use crate::error::{Result, StemningError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with custom configuration.
    pub fn with_config(api_key: Option<&str>, model: &str, chunk_duration_seconds: u32) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            chunk_duration_seconds,
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.wav")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| StemningError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| StemningError::OpenAI(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }

    /// Transcribe a WAV file, splitting it into chunks the API accepts.
    ///
    /// Chunks are sent one after another and their texts joined in order.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    pub async fn transcribe_file(&self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            return self.transcribe_single(audio_path, language).await;
        }

        info!("Processing {} audio chunks with {}", chunks.len(), self.model);

        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        let mut texts = Vec::with_capacity(chunks.len());
        for (idx, (chunk_path, offset)) in chunks.iter().enumerate() {
            let text = self
                .transcribe_single(chunk_path, language)
                .await
                .map_err(|e| {
                    pb.finish_and_clear();
                    StemningError::Transcription(format!("Chunk {} at {:.0}s failed: {}", idx, offset, e))
                })?;
            texts.push(text);
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(join_texts(&texts))
    }
}

fn join_texts(texts: &[String]) -> String {
    texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
