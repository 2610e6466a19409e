//! Stemning - channel transcript sentiment harvesting
//!
//! A CLI tool that walks a YouTube channel's uploads, obtains a transcript
//! for each video, scores its sentiment and stores the results per channel.
//!
//! The name "Stemning" is Norwegian for "mood."
//!
//! # Overview
//!
//! Stemning allows you to:
//! - Crawl every upload of a channel, skipping videos under a minute
//! - Fetch caption transcripts, falling back to Whisper on the audio
//! - Score transcript sentiment chunk by chunk
//! - Keep one record per video plus a channel overview in a document store
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `catalogue` - Channel and video metadata (YouTube Data API)
//! - `client` - Rate limiting and error translation wrappers
//! - `duration` - ISO-8601 durations and the minimum-length filter
//! - `transcript` - Caption transcripts and fallback resolution
//! - `audio` / `transcription` - Audio download and speech-to-text
//! - `chunking` - Word-aligned text chunking
//! - `sentiment` - Sentiment scoring and aggregation
//! - `crawler` - Channel crawling
//! - `store` / `persistence` / `overview` - Document storage and aggregates
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use stemning::config::Settings;
//! use stemning::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator.enrich_input("@StudioMcGee").await?;
//!     println!("Stored {} videos", report.stats.stored);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod catalogue;
pub mod chunking;
pub mod cli;
pub mod client;
pub mod config;
pub mod crawler;
pub mod duration;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod overview;
pub mod persistence;
pub mod sentiment;
pub mod stats;
pub mod store;
pub mod transcript;
pub mod transcription;

pub use error::{Result, StemningError};
