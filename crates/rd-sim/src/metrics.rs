//! Aggregate run report.

use std::fmt;

/// Totals and sums for one dispatch run.
///
/// Sums are in minutes and cover served rides only; failed rides contribute
/// to the counts but never to the sums.  Means are `Option` so an empty run
/// reports "no data" instead of dividing by zero.
#[derive(Clone, Debug, PartialEq)]
pub struct SimReport {
    /// Passengers in the request stream.
    pub passengers: usize,
    /// Rides that completed.
    pub served: usize,
    /// Passengers left without a ride, for any reason.
    pub unserved: usize,
    /// Unserved subset that failed on an unroutable or unusable match.
    pub anomalies: usize,
    /// Drivers in the roster.
    pub drivers: usize,
    /// Drivers that left the road after a ride.
    pub retired: usize,

    /// Passenger wait: availability + pickup + drop-off legs.
    pub total_wait_minutes: f64,
    /// Driver minutes spent parked before their ride's request arrived.
    pub total_idle_minutes: f64,
    /// Driver earnings proxy: drop-off leg minus pickup leg.
    pub total_profit_minutes: f64,
    /// Unpaid driving: the pickup legs alone.
    pub total_deadhead_minutes: f64,
}

impl SimReport {
    /// Mean passenger wait over served rides.
    pub fn mean_wait_minutes(&self) -> Option<f64> {
        per(self.total_wait_minutes, self.served)
    }

    /// Mean pre-request idle over served rides.
    pub fn mean_idle_minutes(&self) -> Option<f64> {
        per(self.total_idle_minutes, self.served)
    }

    /// Mean profit per served ride.
    pub fn mean_profit_per_ride(&self) -> Option<f64> {
        per(self.total_profit_minutes, self.served)
    }

    /// Mean profit across the whole roster, retired drivers included.
    pub fn mean_profit_per_driver(&self) -> Option<f64> {
        per(self.total_profit_minutes, self.drivers)
    }
}

fn per(sum: f64, count: usize) -> Option<f64> {
    if count > 0 { Some(sum / count as f64) } else { None }
}

fn mean(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None    => "n/a".to_string(),
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "passengers: {} ({} served, {} unserved, {} anomalies)",
            self.passengers, self.served, self.unserved, self.anomalies
        )?;
        writeln!(f, "drivers:    {} ({} retired)", self.drivers, self.retired)?;
        writeln!(f, "mean wait:  {} min", mean(self.mean_wait_minutes()))?;
        writeln!(f, "mean idle:  {} min", mean(self.mean_idle_minutes()))?;
        write!(
            f,
            "profit:     {:.1} driver-min total ({} per ride, {} per driver), {:.1} deadhead",
            self.total_profit_minutes,
            mean(self.mean_profit_per_ride()),
            mean(self.mean_profit_per_driver()),
            self.total_deadhead_minutes,
        )
    }
}
