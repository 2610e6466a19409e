//! Channel upload crawling.

use crate::catalogue::{Catalogue, ChannelDetails, VideoDetails};
use crate::duration::passes_min_duration;
use crate::error::{Result, StemningError};
use crate::stats::RunStatistics;
use crate::store::VideoRecord;
use crate::transcript::TranscriptResolver;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Crawl parameters.
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Playlist page size (at most 50).
    pub page_size: u32,
    /// Videos shorter than this many seconds are skipped.
    pub min_duration_seconds: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            min_duration_seconds: crate::duration::MIN_DURATION_SECONDS,
        }
    }
}

/// Result of a crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Channel display name, empty when the channel was not found.
    pub channel_name: String,
    /// Candidate records, most viewed first.
    pub records: Vec<VideoRecord>,
}

/// Walks a channel's uploads and builds a record per eligible video.
pub struct ChannelCrawler {
    catalogue: Arc<dyn Catalogue>,
    resolver: Arc<TranscriptResolver>,
    options: CrawlOptions,
}

impl ChannelCrawler {
    pub fn new(
        catalogue: Arc<dyn Catalogue>,
        resolver: Arc<TranscriptResolver>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            catalogue,
            resolver,
            options,
        }
    }

    /// Crawl every upload of a channel.
    ///
    /// Channel-level failures yield an empty result; per-video failures skip
    /// that video.
    #[instrument(skip(self, stats))]
    pub async fn crawl(&self, channel_id: &str, stats: &mut RunStatistics) -> CrawlResult {
        let channel = match self.catalogue.channel_details(channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                warn!("Channel {} not found", channel_id);
                return CrawlResult::default();
            }
            Err(e) => {
                warn!("Channel lookup failed for {}: {}", channel_id, e);
                return CrawlResult::default();
            }
        };

        let video_ids = match self.list_uploads(&channel).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Listing uploads failed for {}: {}", channel_id, e);
                return CrawlResult {
                    channel_name: channel.title,
                    records: Vec::new(),
                };
            }
        };

        info!("Found {} uploads for '{}'", video_ids.len(), channel.title);
        stats.videos_seen += video_ids.len() as u32;

        let mut records = Vec::new();
        for video_id in &video_ids {
            if let Some(record) = self.process_video(video_id, stats).await {
                records.push(record);
            }
        }

        sort_by_views(&mut records);

        CrawlResult {
            channel_name: channel.title,
            records,
        }
    }

    /// Collect upload ids in playlist order across all pages.
    async fn list_uploads(&self, channel: &ChannelDetails) -> Result<Vec<String>> {
        let playlist_id = channel.uploads_playlist_id.as_deref().ok_or_else(|| {
            StemningError::external(format!("channel {} has no uploads playlist", channel.id))
        })?;

        let mut ids = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .catalogue
                .playlist_page(playlist_id, token.as_deref(), self.options.page_size)
                .await?;
            ids.extend(page.video_ids);

            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn process_video(&self, video_id: &str, stats: &mut RunStatistics) -> Option<VideoRecord> {
        let details = match self.catalogue.video_details(video_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                warn!("No details for video {}, skipping", video_id);
                return None;
            }
            Err(e) => {
                warn!("Fetching details for {} failed: {}", video_id, e);
                return None;
            }
        };

        if !self.long_enough(&details, stats) {
            return None;
        }

        let resolution = self.resolver.resolve(video_id).await;
        resolution.record(stats);
        debug!("Transcript for {}: {:?}", video_id, resolution.origin);

        Some(VideoRecord::new(
            details.id,
            details.title,
            details.view_count,
            resolution.text,
        ))
    }

    fn long_enough(&self, details: &VideoDetails, stats: &mut RunStatistics) -> bool {
        match passes_min_duration(&details.duration, self.options.min_duration_seconds) {
            Ok(true) => true,
            Ok(false) => {
                info!("Skipping short video {} ({})", details.id, details.duration);
                stats.skipped_short += 1;
                false
            }
            Err(e) => {
                warn!("Skipping video {}: {}", details.id, e);
                false
            }
        }
    }
}

/// Most viewed first; ties keep upload order.
fn sort_by_views(records: &mut [VideoRecord]) {
    records.sort_by(|a, b| b.views.cmp(&a.views));
}
