//! Batch loader: raw tabular rows in, canonical location rows out.
//!
//! Cleaning order matters and mirrors the counts in [`LoadReport`]: project
//! the required fields, drop rows missing any of them, coerce coordinates,
//! deduplicate by name keeping the first occurrence, then upsert the whole
//! batch in one transaction.

use std::collections::HashSet;
use std::io::Read;

use crate::error::LoadError;
use crate::geo::coords_in_range;
use crate::store::LocationStore;
use crate::types::{Location, RawLocationRecord};

/// Accepted header spellings for the three required columns.
const NAME_COLUMNS: &[&str] = &["name", "city_name", "city", "accentcity"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "lng"];

/// Outcome of one load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub input_rows: u32,
    /// Rows dropped because a required field was absent or blank
    pub missing_dropped: u32,
    /// Rows dropped because a coordinate failed to parse or was out of range
    pub invalid_dropped: u32,
    /// Rows dropped as later occurrences of an already-seen name
    pub duplicates_dropped: u32,
    pub persisted: u32,
}

/// Loads raw location rows into a [`LocationStore`].
pub struct LocationLoader<'a> {
    store: &'a LocationStore,
}

impl<'a> LocationLoader<'a> {
    pub fn new(store: &'a LocationStore) -> Self {
        Self { store }
    }

    /// Load locations from a CSV source with a header row.
    ///
    /// Column names are matched case-insensitively against the accepted
    /// spellings; all values are read as strings and coerced explicitly.
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<LoadReport, LoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| LoadError::SourceRead(e.to_string()))?
            .clone();

        let name_idx = find_column(&headers, NAME_COLUMNS)
            .ok_or_else(|| LoadError::SourceRead("missing name column".to_string()))?;
        let lat_idx = find_column(&headers, LATITUDE_COLUMNS)
            .ok_or_else(|| LoadError::SourceRead("missing latitude column".to_string()))?;
        let lon_idx = find_column(&headers, LONGITUDE_COLUMNS)
            .ok_or_else(|| LoadError::SourceRead("missing longitude column".to_string()))?;

        let mut records = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| LoadError::SourceRead(e.to_string()))?;
            records.push(RawLocationRecord {
                name: field(&record, name_idx),
                latitude: field(&record, lat_idx),
                longitude: field(&record, lon_idx),
            });
        }

        self.load_records(records)
    }

    /// Load locations from already-projected raw records.
    pub fn load_records(&self, records: Vec<RawLocationRecord>) -> Result<LoadReport, LoadError> {
        let (locations, mut report) = clean(records);

        let persisted = self
            .store
            .upsert_batch(&locations)
            .map_err(|e| LoadError::StoreWrite(e.to_string()))?;
        report.persisted = persisted as u32;

        tracing::info!(
            input = report.input_rows,
            missing = report.missing_dropped,
            invalid = report.invalid_dropped,
            duplicates = report.duplicates_dropped,
            persisted = report.persisted,
            "Location load complete"
        );

        Ok(report)
    }
}

/// Apply the cleaning pipeline, counting each kind of drop.
fn clean(records: Vec<RawLocationRecord>) -> (Vec<Location>, LoadReport) {
    let mut report = LoadReport {
        input_rows: records.len() as u32,
        ..LoadReport::default()
    };

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut locations = Vec::new();

    for record in records {
        let (name, lat_raw, lon_raw) = match (record.name, record.latitude, record.longitude) {
            (Some(n), Some(lat), Some(lon)) => (n, lat, lon),
            _ => {
                report.missing_dropped += 1;
                continue;
            }
        };

        let (latitude, longitude) = match (parse_coord(&lat_raw), parse_coord(&lon_raw)) {
            (Some(lat), Some(lon)) if coords_in_range(lat, lon) => (lat, lon),
            _ => {
                tracing::debug!(name = %name, "Dropping row with unusable coordinates");
                report.invalid_dropped += 1;
                continue;
            }
        };

        if !seen_names.insert(name.clone()) {
            report.duplicates_dropped += 1;
            continue;
        }

        locations.push(Location::new(name, latitude, longitude));
    }

    (locations, report)
}

fn parse_coord(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

fn find_column(headers: &csv::StringRecord, accepted: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| accepted.contains(&h.trim().to_lowercase().as_str()))
}

fn field(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn raw(name: &str, lat: &str, lon: &str) -> RawLocationRecord {
        RawLocationRecord {
            name: Some(name.to_string()),
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
        }
    }

    #[test]
    fn test_counts_add_up() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let records = vec![
            raw("Lagos", "6.5244", "3.3792"),
            RawLocationRecord {
                name: Some("NoCoords".to_string()),
                latitude: None,
                longitude: Some("1.0".to_string()),
            },
            raw("BadLat", "not-a-number", "3.0"),
            raw("Lagos", "6.6", "3.4"),
            raw("Nairobi", "-1.2921", "36.8219"),
        ];

        let report = loader.load_records(records).unwrap();

        assert_eq!(report.input_rows, 5);
        assert_eq!(report.missing_dropped, 1);
        assert_eq!(report.invalid_dropped, 1);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.persisted, 2);
        assert_eq!(
            report.persisted,
            report.input_rows
                - report.missing_dropped
                - report.invalid_dropped
                - report.duplicates_dropped
        );
    }

    #[test]
    fn test_duplicate_keeps_first_occurrence() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        loader
            .load_records(vec![
                raw("Lagos", "6.5244", "3.3792"),
                raw("Lagos", "0.0", "0.0"),
            ])
            .unwrap();

        let stored = store.get("Lagos").unwrap().unwrap();
        assert_eq!(stored.latitude, 6.5244);
    }

    #[test]
    fn test_out_of_range_coordinates_dropped() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let report = loader
            .load_records(vec![raw("NorthOfPole", "95.0", "10.0")])
            .unwrap();

        assert_eq!(report.invalid_dropped, 1);
        assert_eq!(report.persisted, 0);
    }

    #[test]
    fn test_no_two_persisted_locations_share_a_name() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        loader
            .load_records(vec![
                raw("A", "1.0", "1.0"),
                raw("B", "2.0", "2.0"),
                raw("A", "3.0", "3.0"),
                raw("B", "4.0", "4.0"),
            ])
            .unwrap();

        let all = store.list_all().unwrap();
        let mut names: Vec<_> = all.iter().map(|l| l.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn test_rerun_with_same_input_is_idempotent() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let records = || {
            vec![
                raw("Lagos", "6.5244", "3.3792"),
                raw("Nairobi", "-1.2921", "36.8219"),
            ]
        };

        loader.load_records(records()).unwrap();
        let first = store.list_all().unwrap();

        loader.load_records(records()).unwrap();
        let second = store.list_all().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_load_csv_with_accentcity_headers() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let csv_data = "\
AccentCity,Latitude,Longitude
Lagos,6.5244,3.3792
Nairobi,-1.2921,36.8219
,1.0,1.0
";
        let report = loader.load_csv(csv_data.as_bytes()).unwrap();

        assert_eq!(report.input_rows, 3);
        assert_eq!(report.missing_dropped, 1);
        assert_eq!(report.persisted, 2);
        assert!(store.get("Lagos").unwrap().is_some());
    }

    #[test]
    fn test_load_csv_missing_column_is_source_error() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let csv_data = "city,lat\nLagos,6.5\n";
        let err = loader.load_csv(csv_data.as_bytes()).unwrap_err();

        assert!(matches!(err, LoadError::SourceRead(_)));
    }

    #[test]
    fn test_non_finite_coordinates_dropped() {
        let store = LocationStore::in_memory().unwrap();
        let loader = LocationLoader::new(&store);

        let report = loader
            .load_records(vec![raw("Weird", "NaN", "3.0")])
            .unwrap();

        assert_eq!(report.invalid_dropped, 1);
    }
}
