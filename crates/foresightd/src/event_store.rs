//! Read-only access to upstream events.
//!
//! The extraction pipeline owns event data; this core only reads it.
//! The SQLite implementation stores each event as a JSON payload keyed
//! by event id, written by the upstream ingest job.

use anyhow::{Context, Result};
use async_trait::async_trait;
use foresight_common::EventData;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Event lookup interface consumed by the orchestrator.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<Option<EventData>>;
}

/// SQLite-backed event store.
pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    /// Open or create the store at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, for tests and local runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                event_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                ingested_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(())
    }

    /// Insert or replace an event. Used by the ingest side and by tests;
    /// the prediction pipeline never writes here.
    pub fn put_event(&self, event: &EventData) -> Result<()> {
        let payload = serde_json::to_string(event).context("Failed to serialize event")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO events (event_id, payload, ingested_at) VALUES (?1, ?2, ?3)",
            params![event.event_id, payload, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<EventData>> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM events WHERE event_id = ?1",
                params![event_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => {
                let event: EventData = serde_json::from_str(&payload)
                    .with_context(|| format!("Corrupt event payload for {}", event_id))?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(id: &str) -> EventData {
        EventData {
            event_id: id.to_string(),
            title: "Title".to_string(),
            summary: "Summary".to_string(),
            sources: vec![],
            entities: vec![],
            countries: vec![],
            topics: vec![],
            claims: vec![],
            tier_hint: None,
            score: None,
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store.put_event(&sample_event("evt-1")).unwrap();

        let found = store.get_event("evt-1").await.unwrap();
        assert_eq!(found.unwrap().event_id, "evt-1");

        let missing = store.get_event("evt-2").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store.put_event(&sample_event("evt-1")).unwrap();

        let mut updated = sample_event("evt-1");
        updated.title = "Updated".to_string();
        store.put_event(&updated).unwrap();

        let found = store.get_event("evt-1").await.unwrap().unwrap();
        assert_eq!(found.title, "Updated");
    }
}
