//! Per-run bookkeeping.

use serde::Serialize;

/// Counters for one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Transcript service calls that returned a transcript.
    pub api_success: u32,
    /// Transcript service calls that failed, for any reason.
    pub api_failure: u32,
    /// Audio fallbacks that produced text.
    pub transcription_success: u32,
    /// Audio fallbacks that failed.
    pub transcription_failure: u32,
    /// Records upserted.
    pub stored: u32,
    /// Records whose upsert failed.
    pub store_failures: u32,
    /// Uploads listed for the channel.
    pub videos_seen: u32,
    /// Uploads skipped as too short.
    pub skipped_short: u32,
}

impl RunStatistics {
    /// Transcript service success rate in percent, `None` before any call.
    pub fn api_success_rate(&self) -> Option<f64> {
        rate(self.api_success, self.api_failure)
    }

    /// Audio fallback success rate in percent, `None` when it never ran.
    pub fn transcription_success_rate(&self) -> Option<f64> {
        rate(self.transcription_success, self.transcription_failure)
    }
}

fn rate(ok: u32, failed: u32) -> Option<f64> {
    let total = ok + failed;
    (total > 0).then(|| ok as f64 * 100.0 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut stats = RunStatistics::default();
        assert_eq!(stats.api_success_rate(), None);

        stats.api_success = 3;
        stats.api_failure = 1;
        assert_eq!(stats.api_success_rate(), Some(75.0));
        assert_eq!(stats.transcription_success_rate(), None);
    }
}
