//! Error types for Stemning.

use thiserror::Error;

/// Library-level error type for Stemning operations.
#[derive(Error, Debug)]
pub enum StemningError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external service call failed (network, quota, auth, bad response).
    #[error("External call failed: {message}{}", .code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    ExternalCall { message: String, code: Option<u16> },

    #[error("No transcript found for video {video_id} in language '{language}'")]
    NoTranscript { video_id: String, language: String },

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Invalid ISO-8601 duration: {0}")]
    InvalidDuration(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StemningError {
    /// Shorthand for an external-call failure without a status code.
    pub fn external(message: impl Into<String>) -> Self {
        StemningError::ExternalCall {
            message: message.into(),
            code: None,
        }
    }

    /// Whether the transcript service reported that no usable transcript exists.
    ///
    /// These are the two outcomes that may trigger the audio fallback.
    pub fn is_transcript_unavailable(&self) -> bool {
        matches!(
            self,
            StemningError::NoTranscript { .. } | StemningError::TranscriptsDisabled(_)
        )
    }
}

/// Result type alias for Stemning operations.
pub type Result<T> = std::result::Result<T, StemningError>;
