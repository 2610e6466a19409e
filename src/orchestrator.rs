//! Pipeline orchestrator for Stemning.
//!
//! Builds the external clients and the store once and runs a channel through
//! crawl, transcript resolution, sentiment scoring and persistence.

use crate::catalogue::{Catalogue, ChannelRef, YoutubeDataApi};
use crate::client::{FaultTranslatingClient, FixedWindowLimiter, RateLimitedClient};
use crate::config::{FallbackPolicy, Settings};
use crate::crawler::{ChannelCrawler, CrawlOptions};
use crate::error::{Result, StemningError};
use crate::overview::build_overview;
use crate::persistence::Persistence;
use crate::sentiment::{GoogleSentimentAnalyzer, SentimentAnalyzer};
use crate::stats::RunStatistics;
use crate::store::{ChannelOverview, DocumentStore, SqliteDocumentStore, VideoRecord};
use crate::transcript::{ResolverOptions, TranscriptResolver, TranscriptSource, YoutubeTranscriptService};
use crate::transcription::{AudioTranscriber, AudioTranscriptionPath};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// External services and storage used by a run.
pub struct Components {
    pub catalogue: Arc<dyn Catalogue>,
    pub transcripts: Arc<dyn TranscriptSource>,
    /// Present when the audio fallback is available.
    pub audio: Option<Arc<dyn AudioTranscriber>>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
    pub store: Arc<dyn DocumentStore>,
}

/// Outcome of enriching one channel.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    pub channel_id: String,
    pub channel_name: String,
    pub collection: String,
    /// Records written this run, most viewed first.
    pub records: Vec<VideoRecord>,
    pub stats: RunStatistics,
    pub average_sentiment: f64,
    pub average_magnitude: f64,
    pub overview: Option<ChannelOverview>,
}

/// The main orchestrator for the Stemning pipeline.
pub struct Orchestrator {
    settings: Settings,
    catalogue: Arc<dyn Catalogue>,
    crawler: ChannelCrawler,
    persistence: Persistence,
}

impl Orchestrator {
    /// Create an orchestrator talking to the real services.
    pub fn new(settings: Settings) -> Result<Self> {
        let youtube_key = settings.youtube_api_key().ok_or_else(|| {
            StemningError::Config("YouTube API key missing (set youtube.api_key or YOUTUBE_API_KEY)".into())
        })?;
        let sentiment_key = settings.sentiment_api_key().ok_or_else(|| {
            StemningError::Config("Google API key missing (set sentiment.api_key or GOOGLE_API_KEY)".into())
        })?;

        // Each client gets its own budget.
        let limiter = || FixedWindowLimiter::from_settings(&settings.rate_limit);

        let catalogue: Arc<dyn Catalogue> = Arc::new(FaultTranslatingClient::new(
            RateLimitedClient::new(YoutubeDataApi::new(youtube_key)?, limiter()),
        ));
        let transcripts: Arc<dyn TranscriptSource> =
            Arc::new(RateLimitedClient::new(YoutubeTranscriptService::new()?, limiter()));
        let sentiment: Arc<dyn SentimentAnalyzer> = Arc::new(FaultTranslatingClient::new(
            RateLimitedClient::new(GoogleSentimentAnalyzer::new(sentiment_key)?, limiter()),
        ));

        let audio: Option<Arc<dyn AudioTranscriber>> = match settings.transcripts.fallback {
            FallbackPolicy::Transcribe => {
                info!("Audio fallback enabled ({})", settings.transcription.model);
                Some(Arc::new(AudioTranscriptionPath::from_settings(&settings)?))
            }
            FallbackPolicy::GiveUp => None,
        };

        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(&settings.sqlite_path())?);

        std::fs::create_dir_all(settings.temp_dir())?;

        Ok(Self::with_components(
            settings,
            Components {
                catalogue,
                transcripts,
                audio,
                sentiment,
                store,
            },
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, components: Components) -> Self {
        let resolver = Arc::new(TranscriptResolver::new(
            components.transcripts,
            components.audio,
            ResolverOptions::from(&settings.transcripts),
        ));

        let crawler = ChannelCrawler::new(
            components.catalogue.clone(),
            resolver,
            CrawlOptions {
                page_size: settings.youtube.page_size,
                min_duration_seconds: settings.youtube.min_duration_seconds,
            },
        );

        let persistence = Persistence::new(
            components.store,
            components.sentiment,
            settings.sentiment.max_chunk_chars,
        );

        Self {
            settings,
            catalogue: components.catalogue,
            crawler,
            persistence,
        }
    }

    /// Resolve user input to a channel ID and, when given by name, its handle.
    #[instrument(skip(self))]
    pub async fn resolve_channel(&self, input: &str) -> Result<(String, Option<String>)> {
        let channel = ChannelRef::parse(input)
            .ok_or_else(|| StemningError::InvalidInput(format!("Could not parse channel: {}", input)))?;

        match channel {
            ChannelRef::Id(id) => Ok((id, None)),
            ChannelRef::Handle(handle) => {
                let id = self.catalogue.resolve_handle(&handle).await?.ok_or_else(|| {
                    StemningError::InvalidInput(format!("No channel found for '{}'", handle))
                })?;
                info!("Resolved '{}' to {}", handle, id);
                Ok((id, Some(handle)))
            }
        }
    }

    /// Name of the collection a channel is stored in.
    pub fn collection_for(&self, channel_id: &str, handle: Option<&str>) -> String {
        self.settings
            .store
            .collection_naming
            .collection_name(channel_id, handle)
    }

    /// Resolve the input and enrich the channel it names.
    pub async fn enrich_input(&self, input: &str) -> Result<EnrichmentReport> {
        let (channel_id, handle) = self.resolve_channel(input).await?;
        Ok(self.enrich_channel(&channel_id, handle.as_deref()).await)
    }

    /// Crawl, score and store one channel.
    ///
    /// Failures below the channel level end up in the report's counters; a
    /// channel that yields no records leaves the store untouched.
    #[instrument(skip(self))]
    pub async fn enrich_channel(&self, channel_id: &str, handle: Option<&str>) -> EnrichmentReport {
        let collection = self.collection_for(channel_id, handle);
        let mut stats = RunStatistics::default();

        let crawl = self.crawler.crawl(channel_id, &mut stats).await;
        if crawl.records.is_empty() {
            warn!("No videos to store for channel {}", channel_id);
            return EnrichmentReport {
                channel_id: channel_id.to_string(),
                channel_name: crawl.channel_name,
                collection,
                stats,
                ..EnrichmentReport::default()
            };
        }

        let outcome = self
            .persistence
            .store_videos(crawl.records, channel_id, &crawl.channel_name, &collection, &mut stats)
            .await;

        // Without a stored overview, fall back to this run's records.
        let (average_sentiment, average_magnitude) = match &outcome.overview {
            Some(o) => (o.average_sentiment, o.average_magnitude),
            None => {
                let o = build_overview(channel_id, &crawl.channel_name, &outcome.records, Utc::now());
                (o.average_sentiment, o.average_magnitude)
            }
        };

        info!(
            "Enriched {}: {} stored, {} failed",
            channel_id, stats.stored, stats.store_failures
        );

        EnrichmentReport {
            channel_id: channel_id.to_string(),
            channel_name: crawl.channel_name,
            collection,
            records: outcome.records,
            stats,
            average_sentiment,
            average_magnitude,
            overview: outcome.overview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{ChannelDetails, PlaylistPage, VideoDetails};
    use crate::config::CollectionNaming;
    use crate::sentiment::Sentiment;
    use crate::store::{load_collection, MemoryDocumentStore};
    use crate::transcript::TranscriptSegment;
    use async_trait::async_trait;

    const CHANNEL: &str = "UCBR8-60-B28hp2BmDPdntcQ";

    struct FakeCatalogue;

    #[async_trait]
    impl Catalogue for FakeCatalogue {
        async fn resolve_handle(&self, handle: &str) -> Result<Option<String>> {
            Ok((handle == "studio").then(|| CHANNEL.to_string()))
        }

        async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelDetails>> {
            Ok((channel_id == CHANNEL).then(|| ChannelDetails {
                id: CHANNEL.into(),
                title: "Studio".into(),
                uploads_playlist_id: Some("UU1".into()),
            }))
        }

        async fn playlist_page(
            &self,
            _playlist_id: &str,
            _page_token: Option<&str>,
            _page_size: u32,
        ) -> Result<PlaylistPage> {
            Ok(PlaylistPage {
                video_ids: vec!["short".into(), "captioned".into(), "silent".into()],
                next_page_token: None,
            })
        }

        async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
            let (duration, views) = match video_id {
                "short" => ("PT45S", 10_000),
                "captioned" => ("PT8M", 500),
                _ => ("PT12M30S", 1_500),
            };
            Ok(Some(VideoDetails {
                id: video_id.into(),
                title: format!("{video_id} video"),
                duration: duration.into(),
                view_count: views,
            }))
        }
    }

    struct FakeTranscripts;

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch_segments(&self, video_id: &str, _language: &str) -> Result<Vec<TranscriptSegment>> {
            match video_id {
                "captioned" => Ok(vec![
                    TranscriptSegment::new("a wonderful kitchen", 0.0, 2.0),
                    TranscriptSegment::new("um", 2.0, 0.5),
                ]),
                _ => Err(StemningError::TranscriptsDisabled(video_id.into())),
            }
        }
    }

    struct FakeAudio;

    #[async_trait]
    impl AudioTranscriber for FakeAudio {
        async fn transcribe_video(&self, _video_id: &str, _language: Option<&str>) -> Result<String> {
            Ok("a gloomy basement".into())
        }
    }

    struct WordAnalyzer;

    #[async_trait]
    impl SentimentAnalyzer for WordAnalyzer {
        async fn analyze(&self, text: &str) -> Result<Sentiment> {
            if text.contains("wonderful") {
                Ok(Sentiment::new(0.9, 0.9))
            } else {
                Ok(Sentiment::new(-0.5, 0.5))
            }
        }
    }

    fn orchestrator(settings: Settings) -> (Orchestrator, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let orchestrator = Orchestrator::with_components(
            settings,
            Components {
                catalogue: Arc::new(FakeCatalogue),
                transcripts: Arc::new(FakeTranscripts),
                audio: Some(Arc::new(FakeAudio)),
                sentiment: Arc::new(WordAnalyzer),
                store: store.clone(),
            },
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_enrich_channel_end_to_end() {
        let (orchestrator, store) = orchestrator(Settings::default());
        let report = orchestrator.enrich_channel(CHANNEL, None).await;

        assert_eq!(report.channel_name, "Studio");
        assert_eq!(report.collection, format!("channel_{CHANNEL}"));

        let ids: Vec<&str> = report.records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["silent", "captioned"]);
        assert_eq!(report.records[0].transcript.as_deref(), Some("a gloomy basement"));
        assert_eq!(report.records[1].transcript.as_deref(), Some("a wonderful kitchen"));

        assert_eq!(report.stats.videos_seen, 3);
        assert_eq!(report.stats.skipped_short, 1);
        assert_eq!(report.stats.api_success, 1);
        assert_eq!(report.stats.api_failure, 1);
        assert_eq!(report.stats.transcription_success, 1);
        assert_eq!(report.stats.stored, 2);

        assert!((report.average_sentiment - 0.2).abs() < 1e-9);
        assert!((report.average_magnitude - 0.7).abs() < 1e-9);

        let stored = load_collection(store.as_ref(), &report.collection).await.unwrap();
        assert_eq!(stored.videos.len(), 2);
        let overview = stored.overview.unwrap();
        assert_eq!(overview.total_views, 2_000);
        assert_eq!(overview.video_count, 2);
    }

    #[tokio::test]
    async fn test_give_up_policy_stores_absent_transcript() {
        let mut settings = Settings::default();
        settings.transcripts.fallback = FallbackPolicy::GiveUp;
        let (orchestrator, store) = orchestrator(settings);

        let report = orchestrator.enrich_channel(CHANNEL, None).await;
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.stats.transcription_success, 0);

        let stored = load_collection(store.as_ref(), &report.collection).await.unwrap();
        let silent = stored.videos.iter().find(|r| r.video_id == "silent").unwrap();
        assert!(silent.transcript.is_none());
        assert!(silent.sentiment_score.is_none());

        let overview = stored.overview.unwrap();
        assert_eq!(overview.video_count, 1);
        assert_eq!(overview.total_views, 500);
    }

    #[tokio::test]
    async fn test_unknown_channel_leaves_store_untouched() {
        let (orchestrator, store) = orchestrator(Settings::default());
        let report = orchestrator.enrich_channel("UCxxxxxxxxxxxxxxxxxxxxxx", None).await;

        assert!(report.records.is_empty());
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enrich_input_by_handle() {
        let mut settings = Settings::default();
        settings.store.collection_naming = CollectionNaming::Handle;
        let (orchestrator, _store) = orchestrator(settings);

        let report = orchestrator.enrich_input("https://www.youtube.com/@studio").await.unwrap();
        assert_eq!(report.channel_id, CHANNEL);
        assert_eq!(report.collection, "channel_studio");

        assert!(orchestrator.enrich_input("@nobody").await.is_err());
    }
}
