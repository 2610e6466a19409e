//! Writing enriched records and the channel overview to the document store.

use crate::error::Result;
use crate::overview::build_overview;
use crate::sentiment::{analyze_transcript, SentimentAnalyzer};
use crate::stats::RunStatistics;
use crate::store::{load_collection, ChannelOverview, DocumentStore, VideoRecord, OVERVIEW_ID};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of persisting one channel.
#[derive(Debug, Clone)]
pub struct StoreOutcome {
    /// Records that were stored, with sentiment attached.
    pub records: Vec<VideoRecord>,
    /// The overview as written, when it could be replaced.
    pub overview: Option<ChannelOverview>,
}

/// Scores and stores video records, then refreshes the channel overview.
pub struct Persistence {
    store: Arc<dyn DocumentStore>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    max_chunk_chars: usize,
}

impl Persistence {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        analyzer: Arc<dyn SentimentAnalyzer>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            store,
            analyzer,
            max_chunk_chars,
        }
    }

    /// Attach sentiment to each record and upsert it, then replace the overview.
    ///
    /// A failing record is logged and counted without stopping the others.
    #[instrument(skip(self, records, stats), fields(count = records.len()))]
    pub async fn store_videos(
        &self,
        records: Vec<VideoRecord>,
        channel_id: &str,
        channel_name: &str,
        collection: &str,
        stats: &mut RunStatistics,
    ) -> StoreOutcome {
        match self.store.list_collections().await {
            Ok(names) if names.iter().any(|n| n == collection) => {
                info!("Collection '{}' already exists, updating documents", collection);
            }
            Ok(_) => info!("Creating new collection '{}'", collection),
            Err(e) => warn!("Could not list collections: {}", e),
        }

        let mut written = Vec::with_capacity(records.len());
        for mut record in records {
            if let Some(transcript) = &record.transcript {
                let summary =
                    analyze_transcript(self.analyzer.as_ref(), transcript, self.max_chunk_chars).await;
                record.sentiment_score = Some(summary.score);
                record.sentiment_magnitude = Some(summary.magnitude);
            }

            match self.upsert_record(collection, &record).await {
                Ok(()) => {
                    stats.stored += 1;
                    info!("Stored video {}", record.video_id);
                    written.push(record);
                }
                Err(e) => {
                    stats.store_failures += 1;
                    warn!("Failed to store video {}: {}", record.video_id, e);
                }
            }
        }

        let overview = match self.replace_overview(channel_id, channel_name, collection).await {
            Ok(overview) => Some(overview),
            Err(e) => {
                warn!("Failed to update overview for {}: {}", collection, e);
                None
            }
        };

        StoreOutcome {
            records: written,
            overview,
        }
    }

    async fn upsert_record(&self, collection: &str, record: &VideoRecord) -> Result<()> {
        let body = serde_json::to_value(record)?;
        self.store.upsert(collection, &record.video_id, &body).await
    }

    /// Rebuild the overview from what the collection now holds.
    async fn replace_overview(
        &self,
        channel_id: &str,
        channel_name: &str,
        collection: &str,
    ) -> Result<ChannelOverview> {
        let stored = load_collection(self.store.as_ref(), collection).await?;
        let overview = build_overview(channel_id, channel_name, &stored.videos, Utc::now());

        self.store.delete(collection, OVERVIEW_ID).await?;
        self.store
            .upsert(collection, OVERVIEW_ID, &serde_json::to_value(&overview)?)
            .await?;

        info!(
            "Overview for {}: {} videos, {} views, sentiment {:.3}",
            collection, overview.video_count, overview.total_views, overview.average_sentiment
        );
        Ok(overview)
    }
}
