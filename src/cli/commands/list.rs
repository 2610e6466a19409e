//! List command implementation.

use crate::catalogue::{Catalogue, ChannelRef, YoutubeDataApi};
use crate::cli::Output;
use crate::config::{CollectionNaming, Settings};
use crate::store::{load_collection, SqliteDocumentStore};
use anyhow::{anyhow, Result};

/// Run the list command.
pub async fn run_list(channel: &str, full_transcripts: bool, settings: Settings) -> Result<()> {
    let store = SqliteDocumentStore::new(&settings.sqlite_path())?;
    let api = settings.youtube_api_key().map(YoutubeDataApi::new).transpose()?;
    let catalogue = api.as_ref().map(|api| api as &dyn Catalogue);
    let collection = collection_name(channel, settings.store.collection_naming, catalogue).await?;

    let stored = match load_collection(&store, &collection).await {
        Ok(stored) => stored,
        Err(e) => {
            Output::error(&format!("Failed to read {}: {}", collection, e));
            return Err(e.into());
        }
    };

    if stored.videos.is_empty() && stored.overview.is_none() {
        Output::info(&format!(
            "Nothing stored in '{}'. Use 'stemning enrich {}' to add it.",
            collection, channel
        ));
        return Ok(());
    }

    let mut videos = stored.videos;
    videos.sort_by(|a, b| b.views.cmp(&a.views));

    Output::header(&format!("{} ({} videos)", collection, videos.len()));
    println!();
    for video in &videos {
        let sentiment = video.sentiment_score.zip(video.sentiment_magnitude);
        Output::video_info(&video.title, &video.video_id, video.views, sentiment);
        if let Some(text) = &video.transcript {
            Output::transcript(text, full_transcripts);
        }
    }

    if let Some(overview) = stored.overview {
        Output::header("Overview");
        Output::kv("Channel", &format!("{} ({})", overview.channel_name, overview.channel_id));
        Output::kv("Videos scored", &overview.video_count.to_string());
        Output::kv("Total views", &overview.total_views.to_string());
        Output::kv("Average sentiment", &format!("{:+.3}", overview.average_sentiment));
        Output::kv("Average magnitude", &format!("{:.3}", overview.average_magnitude));
        Output::kv("Last updated", &overview.last_updated.format("%Y-%m-%d %H:%M UTC").to_string());
    }

    Ok(())
}

/// Map user input to the collection `enrich` writes for it.
///
/// Only a handle under channel-id naming needs the catalogue.
async fn collection_name(
    input: &str,
    naming: CollectionNaming,
    catalogue: Option<&dyn Catalogue>,
) -> Result<String> {
    let input = input.trim();
    if input.starts_with("channel_") {
        return Ok(input.to_string());
    }

    match ChannelRef::parse(input) {
        Some(ChannelRef::Id(id)) => Ok(naming.collection_name(&id, None)),
        Some(ChannelRef::Handle(handle)) => match naming {
            CollectionNaming::Handle => Ok(naming.collection_name(&handle, Some(&handle))),
            CollectionNaming::ChannelId => {
                let catalogue = catalogue.ok_or_else(|| {
                    anyhow!(
                        "Looking up '{}' needs a YouTube API key; pass the channel ID instead",
                        handle
                    )
                })?;
                let id = catalogue
                    .resolve_handle(&handle)
                    .await?
                    .ok_or_else(|| anyhow!("No channel found for '{}'", handle))?;
                Ok(naming.collection_name(&id, Some(&handle)))
            }
        },
        None => Ok(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{ChannelDetails, PlaylistPage, VideoDetails};
    use crate::error::Result as StemningResult;
    use async_trait::async_trait;

    const ID: &str = "UCBR8-60-B28hp2BmDPdntcQ";

    struct HandleLookup;

    #[async_trait]
    impl Catalogue for HandleLookup {
        async fn resolve_handle(&self, handle: &str) -> StemningResult<Option<String>> {
            Ok((handle == "studio").then(|| ID.to_string()))
        }

        async fn channel_details(&self, _channel_id: &str) -> StemningResult<Option<ChannelDetails>> {
            Ok(None)
        }

        async fn playlist_page(
            &self,
            _playlist_id: &str,
            _page_token: Option<&str>,
            _page_size: u32,
        ) -> StemningResult<PlaylistPage> {
            Ok(PlaylistPage::default())
        }

        async fn video_details(&self, _video_id: &str) -> StemningResult<Option<VideoDetails>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_handle_matches_enrich_under_id_naming() {
        let naming = CollectionNaming::ChannelId;
        let name = collection_name("@studio", naming, Some(&HandleLookup)).await.unwrap();
        assert_eq!(name, naming.collection_name(ID, Some("studio")));
        assert_eq!(name, format!("channel_{}", ID));
    }

    #[tokio::test]
    async fn test_handle_matches_enrich_under_handle_naming() {
        let naming = CollectionNaming::Handle;
        let name = collection_name("@studio", naming, None).await.unwrap();
        assert_eq!(name, naming.collection_name(ID, Some("studio")));
        assert_eq!(name, "channel_studio");
    }

    #[tokio::test]
    async fn test_ids_and_collection_names_need_no_lookup() {
        for naming in [CollectionNaming::ChannelId, CollectionNaming::Handle] {
            assert_eq!(collection_name("channel_UC1", naming, None).await.unwrap(), "channel_UC1");
            assert_eq!(
                collection_name(ID, naming, None).await.unwrap(),
                format!("channel_{}", ID)
            );
        }
    }

    #[tokio::test]
    async fn test_handle_without_catalogue_is_an_error() {
        let result = collection_name("@studio", CollectionNaming::ChannelId, None).await;
        assert!(result.is_err());

        let unknown = collection_name("@nobody", CollectionNaming::ChannelId, Some(&HandleLookup)).await;
        assert!(unknown.is_err());
    }
}
