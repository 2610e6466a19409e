//! Configuration settings for Stemning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub transcripts: TranscriptSettings,
    pub transcription: TranscriptionSettings,
    pub sentiment: SentimentSettings,
    pub rate_limit: RateLimitSettings,
    pub store: StoreSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (downloaded audio).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.stemning".to_string(),
            temp_dir: "/tmp/stemning".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. Falls back to `YOUTUBE_API_KEY`.
    pub api_key: Option<String>,
    /// Page size for playlist listing (the API caps this at 50).
    pub page_size: u32,
    /// Videos shorter than this are skipped.
    pub min_duration_seconds: u32,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            page_size: 50,
            min_duration_seconds: 60,
        }
    }
}

/// What to do when the transcript service has nothing for a video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Download the audio and run speech-to-text.
    #[default]
    Transcribe,
    /// Log and leave the transcript absent.
    GiveUp,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "transcribe" | "audio" => Ok(FallbackPolicy::Transcribe),
            "give_up" | "none" => Ok(FallbackPolicy::GiveUp),
            _ => Err(format!("Unknown fallback policy: {}", s)),
        }
    }
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackPolicy::Transcribe => write!(f, "transcribe"),
            FallbackPolicy::GiveUp => write!(f, "give_up"),
        }
    }
}

/// Transcript service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Preferred transcript language code.
    pub language: String,
    /// Drop transcript segments that contain filler words.
    pub filter_fillers: bool,
    /// Filler words matched case-insensitively against segment words.
    pub filler_words: Vec<String>,
    /// Behavior when no transcript is available or transcripts are disabled.
    pub fallback: FallbackPolicy,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            filter_fillers: true,
            filler_words: vec!["um".to_string(), "uh".to_string(), "ah".to_string()],
            fallback: FallbackPolicy::Transcribe,
        }
    }
}

/// Audio transcription (fallback path) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// OpenAI API key. Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Whisper model to use.
    pub model: String,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "whisper-1".to_string(),
            chunk_duration_seconds: 120,
        }
    }
}

/// Sentiment model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSettings {
    /// Google Cloud API key. Falls back to `GOOGLE_API_KEY`.
    pub api_key: Option<String>,
    /// Maximum characters per scored chunk.
    pub max_chunk_chars: usize,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_chunk_chars: 400,
        }
    }
}

/// Budget applied to each external client independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Calls allowed per window.
    pub max_calls: u32,
    /// Window length in seconds.
    pub period_seconds: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_calls: 100,
            period_seconds: 60,
        }
    }
}

/// How the per-channel collection is named.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionNaming {
    /// `channel_<channel id>`.
    #[default]
    ChannelId,
    /// `channel_<handle>`, using the id when no handle is known.
    Handle,
}

impl CollectionNaming {
    /// Derive the collection name for a channel.
    pub fn collection_name(&self, channel_id: &str, handle: Option<&str>) -> String {
        match (self, handle) {
            (CollectionNaming::Handle, Some(handle)) if !handle.trim().is_empty() => {
                format!("channel_{}", handle.trim().trim_start_matches('@'))
            }
            _ => format!("channel_{}", channel_id),
        }
    }
}

impl std::str::FromStr for CollectionNaming {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "channel_id" | "id" => Ok(CollectionNaming::ChannelId),
            "handle" => Ok(CollectionNaming::Handle),
            _ => Err(format!("Unknown collection naming: {}", s)),
        }
    }
}

impl std::fmt::Display for CollectionNaming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionNaming::ChannelId => write!(f, "channel_id"),
            CollectionNaming::Handle => write!(f, "handle"),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite document database.
    pub sqlite_path: String,
    /// Collection naming scheme.
    pub collection_naming: CollectionNaming,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.stemning/documents.db".to_string(),
            collection_naming: CollectionNaming::ChannelId,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StemningError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stemning")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }

    /// YouTube Data API key from config or `YOUTUBE_API_KEY`.
    pub fn youtube_api_key(&self) -> Option<String> {
        key_or_env(&self.youtube.api_key, "YOUTUBE_API_KEY")
    }

    /// Google Cloud Natural Language key from config or `GOOGLE_API_KEY`.
    pub fn sentiment_api_key(&self) -> Option<String> {
        key_or_env(&self.sentiment.api_key, "GOOGLE_API_KEY")
    }

    /// OpenAI key for the audio fallback from config or `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        key_or_env(&self.transcription.api_key, "OPENAI_API_KEY")
    }
}

fn key_or_env(configured: &Option<String>, var: &str) -> Option<String> {
    configured
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.youtube.page_size, 50);
        assert_eq!(settings.youtube.min_duration_seconds, 60);
        assert_eq!(settings.transcripts.language, "en");
        assert!(settings.transcripts.filter_fillers);
        assert_eq!(settings.transcripts.fallback, FallbackPolicy::Transcribe);
        assert_eq!(settings.sentiment.max_chunk_chars, 400);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [transcripts]
            fallback = "give_up"
            filter_fillers = false

            [store]
            collection_naming = "handle"
            "#,
        )
        .unwrap();

        assert_eq!(settings.transcripts.fallback, FallbackPolicy::GiveUp);
        assert!(!settings.transcripts.filter_fillers);
        assert_eq!(settings.transcripts.language, "en");
        assert_eq!(settings.store.collection_naming, CollectionNaming::Handle);
        assert_eq!(settings.rate_limit.max_calls, 100);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("give-up".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::GiveUp);
        assert_eq!("Transcribe".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Transcribe);
        assert!("sometimes".parse::<FallbackPolicy>().is_err());
        assert_eq!(FallbackPolicy::GiveUp.to_string(), "give_up");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.rate_limit.max_calls = 7;
        settings.transcripts.fallback = FallbackPolicy::GiveUp;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.rate_limit.max_calls, 7);
        assert_eq!(loaded.transcripts.fallback, FallbackPolicy::GiveUp);
    }

    #[test]
    fn test_collection_naming() {
        let by_id = CollectionNaming::ChannelId;
        assert_eq!(by_id.collection_name("UC123", Some("@studio")), "channel_UC123");

        let by_handle = CollectionNaming::Handle;
        assert_eq!(by_handle.collection_name("UC123", Some("@studio")), "channel_studio");
        assert_eq!(by_handle.collection_name("UC123", None), "channel_UC123");
    }
}
