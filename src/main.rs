//! Stemning CLI entry point.

use anyhow::Result;
use clap::Parser;
use stemning::cli::commands::{self, EnrichOverrides};
use stemning::cli::{Cli, Commands};
use stemning::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("stemning={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Enrich {
            channel,
            language,
            no_filter_fillers,
            fallback,
            collection_naming,
        } => {
            let overrides = EnrichOverrides {
                language: language.clone(),
                no_filter_fillers: *no_filter_fillers,
                fallback: *fallback,
                collection_naming: *collection_naming,
            };
            commands::run_enrich(channel, overrides, settings).await?;
        }

        Commands::List { channel, transcripts } => {
            commands::run_list(channel, *transcripts, settings).await?;
        }

        Commands::Collections => {
            commands::run_collections(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
