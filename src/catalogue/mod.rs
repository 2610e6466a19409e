//! Channel catalogue abstraction.
//!
//! A catalogue resolves channels to their uploads playlist, pages through
//! playlists, and reports per-video metadata.

mod youtube;

pub use youtube::YoutubeDataApi;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Channel metadata needed to start a crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDetails {
    /// Channel ID (`UC...`).
    pub id: String,
    /// Display name.
    pub title: String,
    /// The platform-managed playlist holding every upload.
    pub uploads_playlist_id: Option<String>,
}

/// One page of a playlist listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPage {
    /// Video IDs on this page, in playlist order.
    pub video_ids: Vec<String>,
    /// Token for the next page, absent on the last page.
    pub next_page_token: Option<String>,
}

/// Metadata and statistics for a single video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    /// ISO-8601 duration, e.g. `PT4M13S`.
    pub duration: String,
    pub view_count: u64,
}

/// Trait for catalogue/metadata services.
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Resolve a handle or legacy username to a channel ID.
    async fn resolve_handle(&self, handle: &str) -> Result<Option<String>>;

    /// Fetch channel details. `None` when the channel does not exist.
    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelDetails>>;

    /// Fetch one page of playlist items.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage>;

    /// Fetch snippet, content details and statistics for a video.
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>>;
}

/// How the user referred to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// A canonical channel ID.
    Id(String),
    /// A handle (`@name`) or legacy username that needs resolving.
    Handle(String),
}

impl ChannelRef {
    /// Parse a channel ID, handle, username, or channel URL.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(url) = url::Url::parse(input) {
            return Self::from_url(&url);
        }
        if input.contains("youtube.com/") {
            return url::Url::parse(&format!("https://{}", input))
                .ok()
                .and_then(|u| Self::from_url(&u));
        }

        if is_channel_id(input) {
            return Some(ChannelRef::Id(input.to_string()));
        }

        let handle = input.trim_start_matches('@');
        if handle.is_empty() || handle.contains(char::is_whitespace) {
            return None;
        }
        Some(ChannelRef::Handle(handle.to_string()))
    }

    fn from_url(url: &url::Url) -> Option<Self> {
        let host = url.host_str()?;
        if !host.contains("youtube.com") {
            return None;
        }

        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["channel", id, ..] if is_channel_id(id) => Some(ChannelRef::Id(id.to_string())),
            ["c", name, ..] | ["user", name, ..] => Some(ChannelRef::Handle(name.to_string())),
            [first, ..] if first.starts_with('@') && first.len() > 1 => {
                Some(ChannelRef::Handle(first.trim_start_matches('@').to_string()))
            }
            _ => None,
        }
    }
}

/// Channel IDs are `UC` followed by 22 URL-safe base64 characters.
pub fn is_channel_id(input: &str) -> bool {
    input.len() == 24
        && input.starts_with("UC")
        && input[2..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "UCBR8-60-B28hp2BmDPdntcQ";

    #[test]
    fn test_parse_channel_id() {
        assert!(is_channel_id(ID));
        assert_eq!(ChannelRef::parse(ID), Some(ChannelRef::Id(ID.to_string())));
        assert!(!is_channel_id("UCshort"));
        assert!(!is_channel_id("UCBR8-60-B28hp2BmDPdntc!"));
        assert!(!is_channel_id("XXBR8-60-B28hp2BmDPdntcQ"));
    }

    #[test]
    fn test_parse_handles() {
        assert_eq!(
            ChannelRef::parse("@StudioMcGee"),
            Some(ChannelRef::Handle("StudioMcGee".to_string()))
        );
        assert_eq!(
            ChannelRef::parse("StudioMcGee"),
            Some(ChannelRef::Handle("StudioMcGee".to_string()))
        );
        assert_eq!(ChannelRef::parse("two words"), None);
        assert_eq!(ChannelRef::parse("  "), None);
    }

    #[test]
    fn test_parse_urls() {
        assert_eq!(
            ChannelRef::parse(&format!("https://www.youtube.com/channel/{ID}/videos")),
            Some(ChannelRef::Id(ID.to_string()))
        );
        assert_eq!(
            ChannelRef::parse("https://www.youtube.com/@StudioMcGee"),
            Some(ChannelRef::Handle("StudioMcGee".to_string()))
        );
        assert_eq!(
            ChannelRef::parse("youtube.com/user/legacyname"),
            Some(ChannelRef::Handle("legacyname".to_string()))
        );
        assert_eq!(ChannelRef::parse("https://example.com/@someone"), None);
    }
}
