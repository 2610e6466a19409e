//! YouTube Data API v3 catalogue implementation.

use super::{Catalogue, ChannelDetails, PlaylistPage, VideoDetails};
use crate::error::{Result, StemningError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Default timeout for catalogue requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalogue backed by the YouTube Data API.
pub struct YoutubeDataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YoutubeDataApi {
    /// Create a client for the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, YOUTUBE_API_BASE)
    }

    /// Create a client against a different base URL (for a proxy or mock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET an endpoint and decode the JSON body, surfacing API errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(StemningError::ExternalCall {
                message: format!("{} {}: {}", endpoint, status.as_u16(), message),
                code: Some(status.as_u16()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Catalogue for YoutubeDataApi {
    #[instrument(skip(self))]
    async fn resolve_handle(&self, handle: &str) -> Result<Option<String>> {
        let handle = handle.trim_start_matches('@');

        // Handles first, then legacy usernames, then a channel search.
        let with_at = format!("@{}", handle);
        let by_handle: ChannelListResponse = self
            .get_json("channels", &[("part", "id"), ("forHandle", with_at.as_str())])
            .await?;
        if let Some(id) = by_handle.first_id() {
            return Ok(Some(id));
        }

        let by_username: ChannelListResponse = self
            .get_json("channels", &[("part", "id"), ("forUsername", handle)])
            .await?;
        if let Some(id) = by_username.first_id() {
            return Ok(Some(id));
        }

        let search: SearchListResponse = self
            .get_json(
                "search",
                &[("part", "snippet"), ("q", handle), ("type", "channel"), ("maxResults", "1")],
            )
            .await?;

        Ok(search
            .items
            .into_iter()
            .find_map(|item| item.id.channel_id))
    }

    #[instrument(skip(self))]
    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelDetails>> {
        let response: ChannelListResponse = self
            .get_json("channels", &[("part", "snippet,contentDetails"), ("id", channel_id)])
            .await?;

        Ok(response.items.into_iter().next().map(|item| ChannelDetails {
            id: item.id,
            title: item.snippet.map(|s| s.title).unwrap_or_default(),
            uploads_playlist_id: item
                .content_details
                .and_then(|cd| cd.related_playlists)
                .and_then(|rp| rp.uploads),
        }))
    }

    #[instrument(skip(self))]
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage> {
        let page_size = page_size.clamp(1, 50).to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response: PlaylistItemListResponse = self.get_json("playlistItems", &params).await?;
        let page = response.into_page();
        debug!("Fetched {} playlist items", page.video_ids.len());
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "snippet,contentDetails,statistics"), ("id", video_id)])
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(VideoItem::into_details)
            .transpose()
    }
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

impl ChannelListResponse {
    fn first_id(&self) -> Option<String> {
        self.items.first().map(|item| item.id.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    id: String,
    snippet: Option<ChannelSnippet>,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

impl PlaylistItemListResponse {
    fn into_page(self) -> PlaylistPage {
        PlaylistPage {
            video_ids: self
                .items
                .into_iter()
                .filter_map(|item| item.content_details.map(|cd| cd.video_id))
                .collect(),
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<VideoContentDetails>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    /// The API encodes counts as strings.
    view_count: Option<String>,
}

impl VideoItem {
    fn into_details(self) -> Result<VideoDetails> {
        let duration = self
            .content_details
            .and_then(|cd| cd.duration)
            .ok_or_else(|| StemningError::external(format!("video {} has no duration", self.id)))?;

        // Hidden view counts are reported as missing; treat them as zero.
        let view_count = match self.statistics.and_then(|s| s.view_count) {
            Some(raw) => raw.parse().map_err(|_| {
                StemningError::external(format!("video {} has invalid viewCount {:?}", self.id, raw))
            })?,
            None => 0,
        };

        Ok(VideoDetails {
            title: self.snippet.map(|s| s.title).unwrap_or_default(),
            id: self.id,
            duration,
            view_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_response() {
        let json = r#"{
            "items": [{
                "id": "UCBR8-60-B28hp2BmDPdntcQ",
                "snippet": {"title": "Studio McGee"},
                "contentDetails": {"relatedPlaylists": {"uploads": "UUBR8-60-B28hp2BmDPdntcQ"}}
            }]
        }"#;
        let response: ChannelListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_id().as_deref(), Some("UCBR8-60-B28hp2BmDPdntcQ"));

        let cd = response.items[0].content_details.as_ref().unwrap();
        assert_eq!(
            cd.related_playlists.as_ref().unwrap().uploads.as_deref(),
            Some("UUBR8-60-B28hp2BmDPdntcQ")
        );
    }

    #[test]
    fn test_parse_empty_channel_response() {
        let response: ChannelListResponse =
            serde_json::from_str(r#"{"pageInfo": {"totalResults": 0}}"#).unwrap();
        assert!(response.first_id().is_none());
    }

    #[test]
    fn test_playlist_page_conversion() {
        let json = r#"{
            "nextPageToken": "CDIQAA",
            "items": [
                {"contentDetails": {"videoId": "aaaaaaaaaaa"}},
                {"contentDetails": {"videoId": "bbbbbbbbbbb"}},
                {}
            ]
        }"#;
        let page = serde_json::from_str::<PlaylistItemListResponse>(json)
            .unwrap()
            .into_page();
        assert_eq!(page.video_ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]);
        assert_eq!(page.next_page_token.as_deref(), Some("CDIQAA"));

        let last = serde_json::from_str::<PlaylistItemListResponse>(r#"{"items": []}"#)
            .unwrap()
            .into_page();
        assert!(last.next_page_token.is_none());
    }

    #[test]
    fn test_video_item_conversion() {
        let json = r#"{
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {"title": "Kitchen tour"},
                "contentDetails": {"duration": "PT4M13S"},
                "statistics": {"viewCount": "12345"}
            }]
        }"#;
        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        let details = response.items.into_iter().next().unwrap().into_details().unwrap();
        assert_eq!(details.title, "Kitchen tour");
        assert_eq!(details.duration, "PT4M13S");
        assert_eq!(details.view_count, 12345);
    }

    #[test]
    fn test_video_item_hidden_views() {
        let json = r#"{"id": "x", "contentDetails": {"duration": "PT2M"}, "statistics": {}}"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.into_details().unwrap().view_count, 0);
    }
}
