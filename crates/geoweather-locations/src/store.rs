//! SQLite-backed geospatial store for canonical location rows.

use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::types::Location;

/// Relational store for [`Location`] rows, keyed by name.
///
/// The `geom` column holds a GeoJSON `Point` recomputed from the coordinate
/// pair on every upsert, so the coordinates stay the single source of truth.
/// One connection per store, acquired per operation and released on all paths.
pub struct LocationStore {
    conn: Mutex<Connection>,
}

impl LocationStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing and dry runs).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                name TEXT PRIMARY KEY,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                geom TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Upsert a batch of locations in a single transaction.
    ///
    /// Either every row is persisted or none: any failure rolls the whole
    /// batch back. Returns the number of rows written.
    pub fn upsert_batch(&self, locations: &[Location]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        for location in locations {
            let geom = location.geometry().to_geojson().to_string();
            tx.execute(
                r#"
                INSERT OR REPLACE INTO locations (name, latitude, longitude, geom)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    location.name,
                    location.latitude,
                    location.longitude,
                    geom
                ],
            )?;
        }

        tx.commit()?;
        Ok(locations.len())
    }

    /// Get a location by name.
    pub fn get(&self, name: &str) -> Result<Option<Location>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT name, latitude, longitude FROM locations WHERE name = ?1")?;

        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_location(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all locations, ordered by name.
    pub fn list_all(&self) -> Result<Vec<Location>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT name, latitude, longitude FROM locations ORDER BY name")?;

        let rows = stmt.query_map([], Self::row_to_location)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read locations: {}", e))
    }

    /// Number of stored locations.
    pub fn count(&self) -> Result<u32> {
        let count: u32 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_location(row: &rusqlite::Row) -> rusqlite::Result<Location> {
        Ok(Location {
            name: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
        })
    }

    #[cfg(test)]
    fn stored_geometry(&self, name: &str) -> Result<Option<crate::geo::GeoPoint>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT geom FROM locations WHERE name = ?1")?;

        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            let geom_json: String = row.get(0)?;
            let value: serde_json::Value = serde_json::from_str(&geom_json)?;
            Ok(crate::geo::GeoPoint::from_geojson(&value))
        } else {
            Ok(None)
        }
    }
}
