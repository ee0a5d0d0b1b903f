//! CSV ride-log backend.
//!
//! Creates one file in the configured output directory: `rides.csv`, one row
//! per passenger in request order.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::RideLogWriter;
use crate::{OutputResult, RideRow};

/// Appends ride rows to `rides.csv`.
pub struct CsvRideLog {
    rides:    Writer<File>,
    finished: bool,
}

impl CsvRideLog {
    /// Create (or truncate) `rides.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut rides = Writer::from_path(dir.join("rides.csv"))?;
        rides.write_record([
            "passenger_id",
            "requested_at_ms",
            "driver_id",
            "state",
            "anomaly",
            "wait_minutes",
            "deadhead_minutes",
            "ride_minutes",
            "profit_minutes",
        ])?;

        Ok(Self { rides, finished: false })
    }
}

impl RideLogWriter for CsvRideLog {
    fn write_ride(&mut self, row: &RideRow) -> OutputResult<()> {
        self.rides.write_record(&[
            row.passenger_id.to_string(),
            row.requested_at_ms.to_string(),
            row.driver_id.to_string(),
            row.state.to_string(),
            row.anomaly.to_string(),
            minutes(row.wait_minutes),
            minutes(row.deadhead_minutes),
            minutes(row.ride_minutes),
            minutes(row.profit_minutes),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rides.flush()?;
        Ok(())
    }
}

/// Failed rides have no legs; their cells stay empty.
fn minutes(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v:.3}"))
}
