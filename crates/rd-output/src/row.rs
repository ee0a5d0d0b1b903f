//! Plain data row types written by ride-log backends.

use rd_core::DriverId;
use rd_sim::{Anomaly, RideRecord};

/// One passenger's outcome, flattened for tabular output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideRow {
    pub passenger_id:    u32,
    /// Request clock in epoch milliseconds.
    pub requested_at_ms: i64,
    /// `u32::MAX` (the id sentinel) when no driver was ever matched.
    pub driver_id:       u32,
    pub state:           &'static str,
    /// Empty unless the ride failed after matching.
    pub anomaly:         &'static str,
    /// Leg minutes; `None` leaves the cells empty for failed rides.
    pub wait_minutes:     Option<f64>,
    pub deadhead_minutes: Option<f64>,
    pub ride_minutes:     Option<f64>,
    pub profit_minutes:   Option<f64>,
}

impl RideRow {
    /// Flatten a dispatch record into its loggable form.
    pub fn from_record(record: &RideRecord) -> RideRow {
        RideRow {
            passenger_id:     record.passenger.0,
            requested_at_ms:  record.requested_at.as_millis(),
            driver_id:        record.driver.map_or(DriverId::INVALID.0, |d| d.0),
            state:            record.state.as_str(),
            anomaly:          record.anomaly.map_or("", Anomaly::as_str),
            wait_minutes:     record.legs.map(|l| l.wait_minutes()),
            deadhead_minutes: record.legs.map(|l| l.time_to_pickup),
            ride_minutes:     record.legs.map(|l| l.time_to_dropoff),
            profit_minutes:   record.legs.map(|l| l.profit_minutes()),
        }
    }
}
