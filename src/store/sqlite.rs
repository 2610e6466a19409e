//! SQLite-based document store implementation.
//!
//! Documents are stored as JSON text in a single table keyed by
//! `(collection, doc_id)`.

use super::{merge_fields, DocumentStore, StoredDocument};
use crate::error::{Result, StemningError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        doc_id TEXT NOT NULL,
        body TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (collection, doc_id)
    );
"#;

/// SQLite-based document store.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) a document store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite document store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StemningError::Persistence(format!("Failed to acquire lock: {}", e)))
    }

    fn read_body(collection: &str, id: &str, raw: &str) -> Result<Value> {
        serde_json::from_str(raw).map_err(|e| {
            StemningError::Persistence(format!("Corrupt document {}/{}: {}", collection, id, e))
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip(self, body))]
    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let merged = match existing {
            Some(raw) => merge_fields(Self::read_body(collection, id, &raw)?, body),
            None => body.clone(),
        };

        tx.execute(
            r#"
            INSERT INTO documents (collection, doc_id, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
            params![
                collection,
                id,
                serde_json::to_string(&merged)?,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        debug!("Upserted {}/{}", collection, id);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;

        let raw: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|r| Self::read_body(collection, id, &r)).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection, id],
        )?;

        Ok(deleted > 0)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY doc_id",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            let body = Self::read_body(collection, &id, &raw)?;
            docs.push(StoredDocument { id, body });
        }

        Ok(docs)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT DISTINCT collection FROM documents ORDER BY collection")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sqlite_document_store() {
        let store = SqliteDocumentStore::in_memory().unwrap();

        store.upsert("channel_a", "v1", &json!({"views": 1})).await.unwrap();
        store.upsert("channel_a", "v2", &json!({"views": 2})).await.unwrap();
        store.upsert("channel_b", "v1", &json!({"views": 3})).await.unwrap();

        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["channel_a", "channel_b"]
        );

        let docs = store.find_all("channel_a").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "v1");
        assert_eq!(docs[1].body, json!({"views": 2}));

        assert!(store.delete("channel_a", "v1").await.unwrap());
        assert!(!store.delete("channel_a", "v1").await.unwrap());
        assert!(store.get("channel_a", "v1").await.unwrap().is_none());
        assert_eq!(store.get("channel_b", "v1").await.unwrap(), Some(json!({"views": 3})));
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_document() {
        let store = SqliteDocumentStore::in_memory().unwrap();

        store
            .upsert("c", "v1", &json!({"title": "old", "views": 1, "extra": true}))
            .await
            .unwrap();
        store
            .upsert("c", "v1", &json!({"title": "new", "views": 5}))
            .await
            .unwrap();

        let docs = store.find_all("c").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, json!({"title": "new", "views": 5, "extra": true}));
    }

    #[tokio::test]
    async fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("documents.db");

        {
            let store = SqliteDocumentStore::new(&path).unwrap();
            store.upsert("c", "v1", &json!({"views": 7})).await.unwrap();
        }

        let reopened = SqliteDocumentStore::new(&path).unwrap();
        assert_eq!(reopened.get("c", "v1").await.unwrap(), Some(json!({"views": 7})));
    }
}
