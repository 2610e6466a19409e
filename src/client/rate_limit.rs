//! Fixed-window call throttling.

use crate::catalogue::{Catalogue, ChannelDetails, PlaylistPage, VideoDetails};
use crate::config::RateLimitSettings;
use crate::error::Result;
use crate::sentiment::{Sentiment, SentimentAnalyzer};
use crate::transcript::{TranscriptSegment, TranscriptSource};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Allows at most `max_calls` per `period`, sleeping the caller when exhausted.
///
/// The window is fixed, not sliding: up to `max_calls` may land right before
/// a boundary and another `max_calls` right after it.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_calls: u32,
    period: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    pub fn new(max_calls: u32, period: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            period,
            state: Mutex::new(WindowState {
                count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_calls, Duration::from_secs(settings.period_seconds))
    }

    /// Take one slot in the current window, waiting for the next window if needed.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let elapsed = state.window_start.elapsed();

        if elapsed >= self.period {
            state.count = 0;
            state.window_start = Instant::now();
        } else if state.count >= self.max_calls {
            let wait = self.period - elapsed;
            debug!("Rate limit of {} calls reached, sleeping {:?}", self.max_calls, wait);
            tokio::time::sleep(wait).await;
            state.count = 0;
            state.window_start = Instant::now();
        }

        state.count += 1;
    }
}

/// A client that acquires a limiter slot before every call.
pub struct RateLimitedClient<C> {
    inner: C,
    limiter: FixedWindowLimiter,
}

impl<C> RateLimitedClient<C> {
    pub fn new(inner: C, limiter: FixedWindowLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<C: Catalogue> Catalogue for RateLimitedClient<C> {
    async fn resolve_handle(&self, handle: &str) -> Result<Option<String>> {
        self.limiter.acquire().await;
        self.inner.resolve_handle(handle).await
    }

    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelDetails>> {
        self.limiter.acquire().await;
        self.inner.channel_details(channel_id).await
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<PlaylistPage> {
        self.limiter.acquire().await;
        self.inner.playlist_page(playlist_id, page_token, page_size).await
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        self.limiter.acquire().await;
        self.inner.video_details(video_id).await
    }
}

#[async_trait]
impl<C: TranscriptSource> TranscriptSource for RateLimitedClient<C> {
    async fn fetch_segments(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSegment>> {
        self.limiter.acquire().await;
        self.inner.fetch_segments(video_id, language).await
    }
}

#[async_trait]
impl<C: SentimentAnalyzer> SentimentAnalyzer for RateLimitedClient<C> {
    async fn analyze(&self, text: &str) -> Result<Sentiment> {
        self.limiter.acquire().await;
        self.inner.analyze(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_budget_do_not_wait() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_window_sleeps_until_reset() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));

        // The third call opened a new window with one slot used.
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_window_resets_without_sleep() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));
        limiter.acquire().await;

        tokio::time::advance(Duration::from_secs(6)).await;
        let before = Instant::now();
        limiter.acquire().await;

        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_calls_take_at_least_whole_windows() {
        // Five calls at two per window need at least two full waits.
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(30));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    struct CountingAnalyzer(AtomicU32);

    #[async_trait]
    impl SentimentAnalyzer for CountingAnalyzer {
        async fn analyze(&self, _text: &str) -> Result<Sentiment> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Sentiment::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrapped_client_is_throttled() {
        let client = RateLimitedClient::new(
            CountingAnalyzer(AtomicU32::new(0)),
            FixedWindowLimiter::new(1, Duration::from_secs(2)),
        );
        let start = Instant::now();

        client.analyze("a").await.unwrap();
        client.analyze("b").await.unwrap();

        assert_eq!(client.inner.0.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
