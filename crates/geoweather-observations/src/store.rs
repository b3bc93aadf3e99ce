//! SQLite-backed append-only observation log with aggregation queries.

use chrono::DateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

use geoweather_locations::GeoPoint;

use crate::error::ObservationStoreError;
use crate::types::Observation;

/// Document store for [`Observation`]s.
///
/// Writes are blind appends; nothing here updates or deletes. Duplicate
/// `(location_key, fetched_at)` pairs are tolerated and resolved at read
/// time: insertion order (rowid) breaks ties.
pub struct ObservationStore {
    conn: Mutex<Connection>,
}

impl ObservationStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ObservationStoreError> {
        let conn = Connection::open(path)
            .map_err(|e| ObservationStoreError::Unavailable(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing and dry runs).
    pub fn in_memory() -> Result<Self, ObservationStoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ObservationStoreError::Unavailable(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), ObservationStoreError> {
        self.conn
            .lock()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS observations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    location_key TEXT NOT NULL,
                    fetched_at_ms INTEGER NOT NULL,
                    temperature REAL,
                    condition TEXT,
                    humidity INTEGER,
                    wind_speed REAL,
                    point TEXT,
                    raw_json TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_observations_key_time
                    ON observations(location_key, fetched_at_ms);
                "#,
            )
            .map_err(|e| ObservationStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Append one observation to the log.
    pub fn append(&self, obs: &Observation) -> Result<(), ObservationStoreError> {
        let point_json = obs.point.map(|p| p.to_geojson().to_string());
        let raw_json = obs.raw.to_string();

        self.conn
            .lock()
            .execute(
                r#"
                INSERT INTO observations
                (location_key, fetched_at_ms, temperature, condition, humidity, wind_speed, point, raw_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    obs.location_key,
                    obs.fetched_at.timestamp_millis(),
                    obs.temperature,
                    obs.condition,
                    obs.humidity,
                    obs.wind_speed,
                    point_json,
                    raw_json,
                ],
            )
            .map_err(|e| ObservationStoreError::Append(e.to_string()))?;

        tracing::debug!(location_key = %obs.location_key, "Observation appended");
        Ok(())
    }

    /// Latest observation per location key.
    ///
    /// Ties on `fetched_at` go to the most recently inserted row. Ordered by
    /// location key; locations with no observations simply do not appear.
    pub fn latest_snapshot(&self) -> Result<Vec<Observation>, ObservationStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT location_key, fetched_at_ms, temperature, condition, humidity, wind_speed, point, raw_json
                FROM observations o
                WHERE o.id = (
                    SELECT i.id FROM observations i
                    WHERE i.location_key = o.location_key
                    ORDER BY i.fetched_at_ms DESC, i.id DESC
                    LIMIT 1
                )
                ORDER BY o.location_key
                "#,
            )
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_observation)
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ObservationStoreError::Query(e.to_string()))
    }

    /// Full history for one location key, ascending by `fetched_at`.
    ///
    /// An unknown key yields an empty vec, never an error.
    pub fn history(&self, location_key: &str) -> Result<Vec<Observation>, ObservationStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT location_key, fetched_at_ms, temperature, condition, humidity, wind_speed, point, raw_json
                FROM observations
                WHERE location_key = ?1
                ORDER BY fetched_at_ms ASC, id ASC
                "#,
            )
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![location_key], Self::row_to_observation)
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ObservationStoreError::Query(e.to_string()))
    }

    /// Distinct location keys present in the log, sorted.
    ///
    /// Queried on demand by the presentation layer to populate its selector;
    /// nothing caches this at process start.
    pub fn location_keys(&self) -> Result<Vec<String>, ObservationStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT DISTINCT location_key FROM observations ORDER BY location_key")
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ObservationStoreError::Query(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ObservationStoreError::Query(e.to_string()))
    }

    /// Total number of stored observations.
    pub fn count(&self) -> Result<u32, ObservationStoreError> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))
            .map_err(|e| ObservationStoreError::Query(e.to_string()))
    }

    fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<Observation> {
        let fetched_at_ms: i64 = row.get(1)?;
        let point_json: Option<String> = row.get(6)?;
        let raw_json: String = row.get(7)?;

        let point = point_json
            .and_then(|p| serde_json::from_str::<serde_json::Value>(&p).ok())
            .and_then(|v| GeoPoint::from_geojson(&v));

        Ok(Observation {
            location_key: row.get(0)?,
            fetched_at: DateTime::from_timestamp_millis(fetched_at_ms).unwrap_or_default(),
            temperature: row.get(2)?,
            condition: row.get(3)?,
            humidity: row.get(4)?,
            wind_speed: row.get(5)?,
            point,
            raw: serde_json::from_str(&raw_json).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn obs(key: &str, ts_ms: i64, temp: f64) -> Observation {
        Observation {
            location_key: key.to_string(),
            fetched_at: DateTime::from_timestamp_millis(ts_ms).unwrap(),
            temperature: Some(temp),
            condition: Some("clear sky".to_string()),
            humidity: Some(60),
            wind_speed: Some(3.0),
            point: Some(GeoPoint::new(3.3792, 6.5244)),
            raw: serde_json::json!({"main": {"temp": temp}}),
        }
    }

    #[test]
    fn test_append_and_history_order() {
        let store = ObservationStore::in_memory().unwrap();

        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();
        store.append(&obs("Lagos", 20_000, 32.0)).unwrap();

        let history = store.history("Lagos").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].temperature, Some(30.0));
        assert_eq!(history[1].temperature, Some(32.0));
        assert!(history[0].fetched_at < history[1].fetched_at);
    }

    #[test]
    fn test_latest_snapshot_picks_max_fetched_at() {
        let store = ObservationStore::in_memory().unwrap();

        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();
        store.append(&obs("Lagos", 20_000, 32.0)).unwrap();

        let snapshot = store.latest_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].location_key, "Lagos");
        assert_eq!(snapshot[0].temperature, Some(32.0));
    }

    #[test]
    fn test_latest_snapshot_tie_breaks_on_insertion_order() {
        let store = ObservationStore::in_memory().unwrap();

        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();
        store.append(&obs("Lagos", 10_000, 31.5)).unwrap();

        let snapshot = store.latest_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].temperature, Some(31.5));
    }

    #[test]
    fn test_latest_snapshot_ordered_by_key() {
        let store = ObservationStore::in_memory().unwrap();

        store.append(&obs("Nairobi", 10_000, 22.0)).unwrap();
        store.append(&obs("Accra", 10_000, 29.0)).unwrap();
        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();

        let snapshot = store.latest_snapshot().unwrap();
        let keys: Vec<_> = snapshot.iter().map(|o| o.location_key.as_str()).collect();
        assert_eq!(keys, vec!["Accra", "Lagos", "Nairobi"]);
    }

    #[test]
    fn test_history_unknown_key_is_empty_not_error() {
        let store = ObservationStore::in_memory().unwrap();
        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();

        let history = store.history("Unknown").unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_empty_log_yields_empty_results() {
        let store = ObservationStore::in_memory().unwrap();

        assert!(store.latest_snapshot().unwrap().is_empty());
        assert!(store.history("Lagos").unwrap().is_empty());
        assert!(store.location_keys().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_observations_are_tolerated() {
        let store = ObservationStore::in_memory().unwrap();
        let duplicate = obs("Lagos", 10_000, 30.0);

        store.append(&duplicate).unwrap();
        store.append(&duplicate).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.history("Lagos").unwrap().len(), 2);
    }

    #[test]
    fn test_location_keys_distinct_and_sorted() {
        let store = ObservationStore::in_memory().unwrap();

        store.append(&obs("Nairobi", 10_000, 22.0)).unwrap();
        store.append(&obs("Lagos", 10_000, 30.0)).unwrap();
        store.append(&obs("Lagos", 20_000, 31.0)).unwrap();

        let keys = store.location_keys().unwrap();
        assert_eq!(keys, vec!["Lagos", "Nairobi"]);
    }

    #[test]
    fn test_observation_round_trips_through_store() {
        let store = ObservationStore::in_memory().unwrap();
        let original = obs("Lagos", 10_000, 30.0);

        store.append(&original).unwrap();

        let read_back = store.history("Lagos").unwrap().remove(0);
        assert_eq!(read_back, original);
    }

    #[test]
    fn test_missing_optional_fields_survive_storage() {
        let store = ObservationStore::in_memory().unwrap();
        let sparse = Observation {
            location_key: "Lagos".to_string(),
            fetched_at: DateTime::from_timestamp_millis(10_000).unwrap(),
            temperature: None,
            condition: None,
            humidity: None,
            wind_speed: None,
            point: None,
            raw: serde_json::json!({}),
        };

        store.append(&sparse).unwrap();

        let read_back = store.history("Lagos").unwrap().remove(0);
        assert!(read_back.temperature.is_none());
        assert!(read_back.point.is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.db");

        {
            let store = ObservationStore::new(&path).unwrap();
            store.append(&obs("Lagos", 10_000, 30.0)).unwrap();
        }

        let store = ObservationStore::new(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
