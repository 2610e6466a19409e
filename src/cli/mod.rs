//! CLI module for Stemning.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::{CollectionNaming, FallbackPolicy};
use clap::{Parser, Subcommand};

/// Stemning - channel transcript sentiment harvesting
///
/// Crawls a YouTube channel, collects a transcript for every video, scores
/// its sentiment and stores the results per channel.
/// The name "Stemning" is Norwegian for "mood."
#[derive(Parser, Debug)]
#[command(name = "stemning")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Crawl a channel, score its transcripts and store the results
    Enrich {
        /// Channel ID, @handle, username, or channel URL
        channel: String,

        /// Transcript language code
        #[arg(short, long)]
        language: Option<String>,

        /// Keep transcript segments containing filler words
        #[arg(long)]
        no_filter_fillers: bool,

        /// What to do when no transcript exists (transcribe, give_up)
        #[arg(long)]
        fallback: Option<FallbackPolicy>,

        /// How to name the channel collection (channel_id, handle)
        #[arg(long)]
        collection_naming: Option<CollectionNaming>,
    },

    /// Show stored records and the overview for a channel
    List {
        /// Channel ID, @handle, or collection name
        channel: String,

        /// Print full transcripts instead of a preview
        #[arg(long)]
        transcripts: bool,
    },

    /// List stored channel collections
    Collections,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
