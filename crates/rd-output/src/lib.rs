//! `rd-output` — ride-log writers for the ride-dispatch simulator.
//!
//! The simulator reports per-ride outcomes through `rd_sim::DispatchObserver`;
//! this crate turns that stream into a tabular log.  [`RideLogObserver`]
//! implements the observer trait and forwards every [`RideRow`] to a backend
//! implementing [`RideLogWriter`]; [`CsvRideLog`] is the file backend,
//! producing a single `rides.csv` with one row per passenger.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rd_output::{CsvRideLog, RideLogObserver};
//!
//! let log = CsvRideLog::new(Path::new("./output"))?;
//! let mut observer = RideLogObserver::new(log);
//! let report = sim.run(&mut observer);
//! if let Some(e) = observer.take_error() {
//!     eprintln!("ride log error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvRideLog;
pub use error::{OutputError, OutputResult};
pub use observer::RideLogObserver;
pub use row::RideRow;
pub use writer::RideLogWriter;
