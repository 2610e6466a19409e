//! Uniform translation of external-call failures.

use crate::catalogue::{Catalogue, ChannelDetails, PlaylistPage, VideoDetails};
use crate::error::{Result, StemningError};
use crate::sentiment::{Sentiment, SentimentAnalyzer};
use async_trait::async_trait;
use std::future::Future;
use tracing::warn;

/// Await an external call and turn any failure into [`StemningError::ExternalCall`].
///
/// The operation name and cause are logged. A status code already attached
/// to the error, or carried by an HTTP error, is kept.
pub async fn safe_call<T, F>(operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    call.await.map_err(|e| {
        warn!(operation, "External call failed: {}", e);
        into_external(e)
    })
}

fn into_external(error: StemningError) -> StemningError {
    match error {
        StemningError::ExternalCall { .. } => error,
        StemningError::Http(e) => StemningError::ExternalCall {
            code: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        other => StemningError::external(other.to_string()),
    }
}

/// A client whose every call goes through [`safe_call`].
pub struct FaultTranslatingClient<C> {
    inner: C,
}

impl<C> FaultTranslatingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: Catalogue> Catalogue for FaultTranslatingClient<C> {
    async fn resolve_handle(&self, handle: &str) -> Result<Option<String>> {
        safe_call("resolve_handle", self.inner.resolve_handle(handle)).await
    }

    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelDetails>> {
        safe_call("channel_details", self.inner.channel_details(channel_id)).await
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage> {
        safe_call(
            "playlist_page",
            self.inner.playlist_page(playlist_id, page_token, page_size),
        )
        .await
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        safe_call("video_details", self.inner.video_details(video_id)).await
    }
}

#[async_trait]
impl<C: SentimentAnalyzer> SentimentAnalyzer for FaultTranslatingClient<C> {
    async fn analyze(&self, text: &str) -> Result<Sentiment> {
        safe_call("analyze_sentiment", self.inner.analyze(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_through() {
        let value = safe_call("noop", async { Ok::<_, StemningError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_failures_become_external_calls() {
        let err = safe_call("parse", async {
            Err::<(), _>(StemningError::InvalidDuration("P1Y".into()))
        })
        .await
        .unwrap_err();

        match err {
            StemningError::ExternalCall { message, code } => {
                assert!(message.contains("P1Y"));
                assert_eq!(code, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_code_is_kept() {
        let err = safe_call("videos", async {
            Err::<(), _>(StemningError::ExternalCall {
                message: "quotaExceeded".into(),
                code: Some(403),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StemningError::ExternalCall { code: Some(403), .. }));
    }

    struct BrokenAnalyzer;

    #[async_trait]
    impl SentimentAnalyzer for BrokenAnalyzer {
        async fn analyze(&self, _text: &str) -> Result<Sentiment> {
            Err(StemningError::Io(std::io::Error::other("socket closed")))
        }
    }

    #[tokio::test]
    async fn test_wrapped_client_translates() {
        let client = FaultTranslatingClient::new(BrokenAnalyzer);
        let err = client.analyze("text").await.unwrap_err();
        assert!(matches!(err, StemningError::ExternalCall { .. }));
        assert!(err.to_string().contains("socket closed"));
    }
}
