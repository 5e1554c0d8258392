//! Tier-aware prediction cache.
//!
//! Keyed by event id. Each record carries its own `ttl_expires_at`,
//! stamped at generation time from the tier. Lookups treat expired
//! records as absent without deleting them (lazy expiry); the next
//! successful generation overwrites the row.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use foresight_common::EventPrediction;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

/// Prediction cache interface consumed by the orchestrator.
#[async_trait]
pub trait PredictionCacheStore: Send + Sync {
    /// Returns the stored prediction only while its TTL has not elapsed.
    async fn get(&self, event_id: &str) -> Result<Option<EventPrediction>>;

    /// Insert or overwrite the record for the prediction's event id.
    async fn put(&self, prediction: &EventPrediction) -> Result<()>;
}

/// In-memory cache for tests and single-process runs.
#[derive(Default)]
pub struct MemoryCache {
    records: RwLock<HashMap<String, EventPrediction>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionCacheStore for MemoryCache {
    async fn get(&self, event_id: &str) -> Result<Option<EventPrediction>> {
        let records = self.records.read().unwrap();
        Ok(records
            .get(event_id)
            .filter(|p| !p.is_expired(Utc::now()))
            .cloned())
    }

    async fn put(&self, prediction: &EventPrediction) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(prediction.event_id.clone(), prediction.clone());
        Ok(())
    }
}

/// SQLite-backed persistent cache.
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                event_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                tier TEXT NOT NULL,
                generated_at TEXT NOT NULL,
                ttl_expires_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(())
    }
}

#[async_trait]
impl PredictionCacheStore for SqliteCache {
    async fn get(&self, event_id: &str) -> Result<Option<EventPrediction>> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM predictions WHERE event_id = ?1",
                params![event_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let prediction: EventPrediction = serde_json::from_str(&payload)
            .with_context(|| format!("Corrupt cached prediction for {}", event_id))?;

        // Lazy expiry: the row stays until the next put overwrites it.
        if prediction.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(prediction))
    }

    async fn put(&self, prediction: &EventPrediction) -> Result<()> {
        let payload = serde_json::to_string(prediction).context("Failed to serialize prediction")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO predictions
                (event_id, payload, tier, generated_at, ttl_expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                prediction.event_id,
                payload,
                prediction.tier.as_str(),
                prediction.generated_at.to_rfc3339(),
                prediction.ttl_expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use foresight_common::{ProbabilityCheck, Tier};

    fn prediction(event_id: &str, ttl: Duration) -> EventPrediction {
        let now = Utc::now();
        EventPrediction {
            event_id: event_id.to_string(),
            generated_at: now,
            ttl_expires_at: now + ttl,
            assumptions: vec![],
            outlooks: vec![],
            probability_check: ProbabilityCheck {
                sum: 1.0,
                method: "normalize".to_string(),
                original_sum: 1.0,
            },
            tier: Tier::Fast,
            evidence_count: 4,
            historical_patterns_count: 1,
            confidence_score: 0.55,
        }
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        cache.put(&prediction("evt-1", Duration::hours(3))).await.unwrap();

        let hit = cache.get("evt-1").await.unwrap();
        assert_eq!(hit.unwrap().evidence_count, 4);
        assert!(cache.get("evt-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_treated_as_absent() {
        let cache = MemoryCache::new();
        cache.put(&prediction("evt-1", Duration::hours(-1))).await.unwrap();
        assert!(cache.get("evt-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_cache_round_trip() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.put(&prediction("evt-1", Duration::hours(6))).await.unwrap();

        let hit = cache.get("evt-1").await.unwrap().unwrap();
        assert_eq!(hit.event_id, "evt-1");
        assert_eq!(hit.tier, Tier::Fast);
    }

    #[tokio::test]
    async fn test_sqlite_lazy_expiry() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.put(&prediction("evt-1", Duration::hours(-1))).await.unwrap();
        assert!(cache.get("evt-1").await.unwrap().is_none());

        // Overwrite with a fresh record; the stale row is replaced.
        cache.put(&prediction("evt-1", Duration::hours(1))).await.unwrap();
        assert!(cache.get("evt-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sqlite_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let cache = SqliteCache::open(&path).unwrap();
        cache.put(&prediction("evt-1", Duration::hours(1))).await.unwrap();

        // Reopen and read back.
        drop(cache);
        let cache = SqliteCache::open(&path).unwrap();
        assert!(cache.get("evt-1").await.unwrap().is_some());
    }
}
