//! Enrich command implementation.

use crate::cli::output::mood;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::{CollectionNaming, FallbackPolicy, Settings};
use crate::orchestrator::{EnrichmentReport, Orchestrator};
use anyhow::Result;

/// Command-line overrides for a single run.
#[derive(Debug, Clone, Default)]
pub struct EnrichOverrides {
    pub language: Option<String>,
    pub no_filter_fillers: bool,
    pub fallback: Option<FallbackPolicy>,
    pub collection_naming: Option<CollectionNaming>,
}

impl EnrichOverrides {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(language) = &self.language {
            settings.transcripts.language = language.clone();
        }
        if self.no_filter_fillers {
            settings.transcripts.filter_fillers = false;
        }
        if let Some(fallback) = self.fallback {
            settings.transcripts.fallback = fallback;
        }
        if let Some(naming) = self.collection_naming {
            settings.store.collection_naming = naming;
        }
        settings
    }
}

/// Run the enrich command.
pub async fn run_enrich(channel: &str, overrides: EnrichOverrides, settings: Settings) -> Result<()> {
    let settings = overrides.apply(settings);

    if let Err(e) = preflight::check_enrich(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'stemning doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Processing channel: {}", channel));
    let orchestrator = Orchestrator::new(settings)?;

    let (channel_id, handle) = match orchestrator.resolve_channel(channel).await {
        Ok(resolved) => resolved,
        Err(e) => {
            Output::error(&format!("Failed to resolve channel: {}", e));
            return Err(e.into());
        }
    };

    let spinner = Output::spinner(&format!("Enriching {}...", channel_id));
    let report = orchestrator.enrich_channel(&channel_id, handle.as_deref()).await;
    spinner.finish_and_clear();

    print_report(&report);

    if report.records.is_empty() {
        return Err(anyhow::anyhow!("no videos were stored for {}", channel_id));
    }
    Ok(())
}

fn print_report(report: &EnrichmentReport) {
    if report.records.is_empty() {
        Output::warning(&format!(
            "No videos stored for {}. Check the channel ID and API quota.",
            report.channel_id
        ));
        return;
    }

    Output::success(&format!(
        "Stored {} videos from '{}' in {}",
        report.stats.stored, report.channel_name, report.collection
    ));

    let stats = &report.stats;
    Output::header("Run Statistics");
    Output::kv("Uploads found", &stats.videos_seen.to_string());
    Output::kv("Skipped (too short)", &stats.skipped_short.to_string());
    Output::kv(
        "Transcript service",
        &format!(
            "{} ok, {} failed{}",
            stats.api_success,
            stats.api_failure,
            percent(stats.api_success_rate())
        ),
    );
    Output::kv(
        "Audio transcription",
        &format!(
            "{} ok, {} failed{}",
            stats.transcription_success,
            stats.transcription_failure,
            percent(stats.transcription_success_rate())
        ),
    );
    if stats.store_failures > 0 {
        Output::kv("Store failures", &stats.store_failures.to_string());
    }

    Output::header("Channel Sentiment");
    Output::kv(
        "Average score",
        &format!("{:+.3} ({})", report.average_sentiment, mood(report.average_sentiment)),
    );
    Output::kv("Average magnitude", &format!("{:.3}", report.average_magnitude));
    if let Some(overview) = &report.overview {
        Output::kv("Videos scored", &overview.video_count.to_string());
        Output::kv("Total views", &overview.total_views.to_string());
    }
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!(" ({:.0}%)", r)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let overrides = EnrichOverrides {
            language: Some("no".into()),
            no_filter_fillers: true,
            fallback: Some(FallbackPolicy::GiveUp),
            collection_naming: Some(CollectionNaming::Handle),
        };
        let settings = overrides.apply(Settings::default());

        assert_eq!(settings.transcripts.language, "no");
        assert!(!settings.transcripts.filter_fillers);
        assert_eq!(settings.transcripts.fallback, FallbackPolicy::GiveUp);
        assert_eq!(settings.store.collection_naming, CollectionNaming::Handle);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let settings = EnrichOverrides::default().apply(Settings::default());
        assert!(settings.transcripts.filter_fillers);
        assert_eq!(settings.transcripts.fallback, FallbackPolicy::Transcribe);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(None), "");
        assert_eq!(percent(Some(66.666)), " (67%)");
    }
}
