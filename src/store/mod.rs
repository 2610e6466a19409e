//! Document store abstraction for Stemning.
//!
//! Documents are JSON objects grouped into named collections and keyed by a
//! string id. Each channel gets one collection holding a [`VideoRecord`] per
//! video and a single [`ChannelOverview`] under [`OVERVIEW_ID`].

mod memory;
mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use crate::error::{Result, StemningError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved document id of the channel overview.
pub const OVERVIEW_ID: &str = "channel_overview";

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: Value,
}

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, or set the given top-level fields on an existing one.
    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> Result<()>;

    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// All documents in a collection, ordered by id.
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>>;

    /// Names of all non-empty collections.
    async fn list_collections(&self) -> Result<Vec<String>>;
}

/// Apply `update`'s top-level fields onto `existing`.
///
/// Non-object values replace the document wholesale.
pub(crate) fn merge_fields(existing: Value, update: &Value) -> Value {
    match (existing, update) {
        (Value::Object(mut current), Value::Object(fields)) => {
            for (key, value) in fields {
                current.insert(key.clone(), value.clone());
            }
            Value::Object(current)
        }
        (_, update) => update.clone(),
    }
}

/// Per-video document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub views: u64,
    /// Absent when no transcript could be obtained.
    pub transcript: Option<String>,
    pub sentiment_score: Option<f64>,
    pub sentiment_magnitude: Option<f64>,
}

impl VideoRecord {
    /// A record without sentiment, as produced by the crawler.
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        views: u64,
        transcript: Option<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            views,
            transcript,
            sentiment_score: None,
            sentiment_magnitude: None,
        }
    }
}

/// Channel-level aggregate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOverview {
    pub channel_id: String,
    pub channel_name: String,
    pub total_views: u64,
    pub video_count: usize,
    pub average_sentiment: f64,
    pub average_magnitude: f64,
    pub last_updated: DateTime<Utc>,
}

/// Typed contents of a channel collection.
#[derive(Debug, Clone, Default)]
pub struct ChannelCollection {
    pub videos: Vec<VideoRecord>,
    pub overview: Option<ChannelOverview>,
}

/// Read a channel collection back into typed records.
///
/// Documents that do not parse as video records are skipped.
pub async fn load_collection(store: &dyn DocumentStore, collection: &str) -> Result<ChannelCollection> {
    let mut result = ChannelCollection::default();

    for doc in store.find_all(collection).await? {
        if doc.id == OVERVIEW_ID {
            result.overview = Some(serde_json::from_value(doc.body).map_err(|e| {
                StemningError::Persistence(format!("Malformed overview in {}: {}", collection, e))
            })?);
            continue;
        }

        match serde_json::from_value::<VideoRecord>(doc.body) {
            Ok(record) => result.videos.push(record),
            Err(e) => tracing::debug!("Skipping document {} in {}: {}", doc.id, collection, e),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_fields_sets_top_level() {
        let merged = merge_fields(
            json!({"video_id": "a", "views": 1, "note": "kept"}),
            &json!({"views": 2, "title": "new"}),
        );
        assert_eq!(merged, json!({"video_id": "a", "views": 2, "note": "kept", "title": "new"}));
    }

    #[test]
    fn test_video_record_serialization() {
        let record = VideoRecord::new("vid", "Title", 10, None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["transcript"], Value::Null);
        assert!(record.sentiment_score.is_none());

        let back: VideoRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    async fn test_load_collection_separates_overview() {
        let store = MemoryDocumentStore::new();
        let record = VideoRecord::new("vid", "Title", 10, Some("text".into()));
        store
            .upsert("c", "vid", &serde_json::to_value(&record).unwrap())
            .await
            .unwrap();

        let overview = ChannelOverview {
            channel_id: "UC1".into(),
            channel_name: "Chan".into(),
            total_views: 10,
            video_count: 1,
            average_sentiment: 0.5,
            average_magnitude: 1.0,
            last_updated: Utc::now(),
        };
        store
            .upsert("c", OVERVIEW_ID, &serde_json::to_value(&overview).unwrap())
            .await
            .unwrap();
        store.upsert("c", "junk", &json!({"foo": 1})).await.unwrap();

        let loaded = load_collection(&store, "c").await.unwrap();
        assert_eq!(loaded.videos, vec![record]);
        assert_eq!(loaded.overview, Some(overview));
    }
}
