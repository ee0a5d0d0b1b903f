//! Driver and passenger event loaders.
//!
//! # File formats
//!
//! **Drivers** — CSV, one roster entry per row, 3 columns:
//!
//! ```csv
//! Date/Time,Lat,Lon
//! 4/18/2014 0:01:00,40.7316,-73.9873
//! 4/18/2014 0:03:00,40.7450,-73.9880
//! ```
//!
//! **Passengers** — CSV, one request per row, 5 columns:
//!
//! ```csv
//! Date/Time,Start_Lat,Start_Lon,End_Lat,End_Lon
//! 4/18/2014 0:02:00,40.7316,-73.9873,40.7577,-73.9857
//! ```
//!
//! Datetimes follow the `"M/D/YYYY H:MM:SS"` event-record format.  Rows are
//! expected in file order matching time order ([`DispatchSim::new`] enforces
//! it); ids are assigned sequentially from 1 in row order, so a record's id
//! doubles as its 1-based position in the input file.
//!
//! [`DispatchSim::new`]: crate::sim::DispatchSim::new

use std::io::Read;
use std::path::Path;

use rd_core::{DriverId, GeoPoint, PassengerId, Timestamp};

use crate::agents::{Driver, Passenger};
use crate::error::{SimError, SimResult};

/// Columns per driver row: datetime, lat, lon.
const DRIVER_COLUMNS: usize = 3;
/// Columns per passenger row: datetime, start lat/lon, end lat/lon.
const PASSENGER_COLUMNS: usize = 5;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the driver roster from a CSV file.
pub fn load_drivers_csv(path: &Path) -> SimResult<Vec<Driver>> {
    let file = std::fs::File::open(path).map_err(SimError::Io)?;
    load_drivers_reader(std::io::BufReader::new(file))
}

/// Like [`load_drivers_csv`] but accepts any `Read` source.
pub fn load_drivers_reader<R: Read>(reader: R) -> SimResult<Vec<Driver>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut drivers = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Data row i sits on line i + 2 (1-based, after the header).
        let line = i + 2;
        expect_columns(&row, DRIVER_COLUMNS, line)?;

        let available_at = parse_timestamp(&row, 0, line)?;
        let pos = parse_point(&row, 1, 2, line)?;
        drivers.push(Driver::new(DriverId(i as u32 + 1), available_at, pos));
    }

    Ok(drivers)
}

/// Load the passenger request stream from a CSV file.
pub fn load_passengers_csv(path: &Path) -> SimResult<Vec<Passenger>> {
    let file = std::fs::File::open(path).map_err(SimError::Io)?;
    load_passengers_reader(std::io::BufReader::new(file))
}

/// Like [`load_passengers_csv`] but accepts any `Read` source.
pub fn load_passengers_reader<R: Read>(reader: R) -> SimResult<Vec<Passenger>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut passengers = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = result?;
        let line = i + 2;
        expect_columns(&row, PASSENGER_COLUMNS, line)?;

        let requested_at = parse_timestamp(&row, 0, line)?;
        let pickup = parse_point(&row, 1, 2, line)?;
        let dropoff = parse_point(&row, 3, 4, line)?;
        passengers.push(Passenger::new(PassengerId(i as u32 + 1), requested_at, pickup, dropoff));
    }

    Ok(passengers)
}

// ── Row parsing ───────────────────────────────────────────────────────────────

fn expect_columns(row: &csv::StringRecord, expected: usize, line: usize) -> SimResult<()> {
    if row.len() != expected {
        return Err(SimError::MalformedRow {
            row:    line,
            reason: format!("expected {expected} columns, found {}", row.len()),
        });
    }
    Ok(())
}

fn parse_timestamp(row: &csv::StringRecord, column: usize, line: usize) -> SimResult<Timestamp> {
    let field = row.get(column).unwrap_or("");
    Timestamp::parse(field).map_err(|e| SimError::MalformedRow {
        row:    line,
        reason: e.to_string(),
    })
}

fn parse_point(
    row: &csv::StringRecord,
    lat_column: usize,
    lon_column: usize,
    line: usize,
) -> SimResult<GeoPoint> {
    let point = GeoPoint {
        lat: parse_field(row, lat_column, line)?,
        lon: parse_field(row, lon_column, line)?,
    };
    if !point.is_finite() {
        return Err(SimError::MalformedRow {
            row:    line,
            reason: "non-finite coordinate".to_string(),
        });
    }
    Ok(point)
}

fn parse_field(row: &csv::StringRecord, column: usize, line: usize) -> SimResult<f64> {
    row.get(column)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| SimError::MalformedRow {
            row:    line,
            reason: format!("column {column} is missing or not numeric"),
        })
}
