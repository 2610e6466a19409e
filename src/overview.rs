//! Channel-level aggregation.

use crate::store::{ChannelOverview, VideoRecord};
use chrono::{DateTime, Utc};

/// Build the overview document for a channel from its video records.
///
/// Only records with sentiment count toward the totals and averages; an empty
/// set yields zeros.
pub fn build_overview(
    channel_id: &str,
    channel_name: &str,
    records: &[VideoRecord],
    now: DateTime<Utc>,
) -> ChannelOverview {
    let scored: Vec<(&VideoRecord, f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r, r.sentiment_score?, r.sentiment_magnitude?)))
        .collect();

    let video_count = scored.len();
    let total_views = scored.iter().map(|(r, _, _)| r.views).sum();
    let (average_sentiment, average_magnitude) = if video_count == 0 {
        (0.0, 0.0)
    } else {
        let n = video_count as f64;
        (
            scored.iter().map(|(_, s, _)| s).sum::<f64>() / n,
            scored.iter().map(|(_, _, m)| m).sum::<f64>() / n,
        )
    };

    ChannelOverview {
        channel_id: channel_id.to_string(),
        channel_name: channel_name.to_string(),
        total_views,
        video_count,
        average_sentiment,
        average_magnitude,
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, views: u64, score: f64, magnitude: f64) -> VideoRecord {
        VideoRecord {
            sentiment_score: Some(score),
            sentiment_magnitude: Some(magnitude),
            ..VideoRecord::new(id, id, views, Some("text".into()))
        }
    }

    #[test]
    fn test_empty_overview() {
        let now = Utc::now();
        let overview = build_overview("UC1", "Chan", &[], now);

        assert_eq!(overview.video_count, 0);
        assert_eq!(overview.total_views, 0);
        assert_eq!(overview.average_sentiment, 0.0);
        assert_eq!(overview.average_magnitude, 0.0);
        assert_eq!(overview.last_updated, now);
    }

    #[test]
    fn test_totals_and_averages() {
        let records = vec![
            scored("a", 100, 0.5, 1.0),
            scored("b", 300, -0.1, 3.0),
            scored("c", 200, 0.2, 2.0),
        ];
        let overview = build_overview("UC1", "Chan", &records, Utc::now());

        assert_eq!(overview.total_views, 600);
        assert_eq!(overview.video_count, 3);
        assert!((overview.average_sentiment - 0.2).abs() < 1e-9);
        assert!((overview.average_magnitude - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_records_without_sentiment_are_ignored() {
        let records = vec![
            scored("a", 100, 0.4, 1.0),
            VideoRecord::new("b", "b", 5000, None),
        ];
        let overview = build_overview("UC1", "Chan", &records, Utc::now());

        assert_eq!(overview.video_count, 1);
        assert_eq!(overview.total_views, 100);
        assert!((overview.average_sentiment - 0.4).abs() < 1e-9);
    }
}
