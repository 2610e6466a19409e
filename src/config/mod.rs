//! Configuration module for Stemning.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    CollectionNaming, FallbackPolicy, GeneralSettings, RateLimitSettings, SentimentSettings,
    Settings, StoreSettings, TranscriptSettings, TranscriptionSettings, YoutubeSettings,
};
