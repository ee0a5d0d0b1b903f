//! Dispatch-subsystem error type.
//!
//! Only construction and loading can fail.  Once the loop runs, every outcome
//! is a recorded ride state: an unserved passenger is a `Failed` record and a
//! route that does not exist is an anomaly, never an `Err`.

use thiserror::Error;

use rd_core::DriverId;
use rd_spatial::SpatialError;

/// Errors produced by `rd-sim` construction and loaders.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("passenger {index} requests earlier than its predecessor; input must be time-ordered")]
    UnsortedPassengers { index: usize },

    #[error("driver {index} becomes available earlier than its predecessor; input must be time-ordered")]
    UnsortedDrivers { index: usize },

    #[error("duplicate driver id {0}")]
    DuplicateDriver(DriverId),

    #[error("event row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SimResult<T> = Result<T, SimError>;
