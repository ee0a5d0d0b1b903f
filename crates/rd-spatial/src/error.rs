//! Spatial-subsystem error type.
//!
//! Query outcomes are never errors: a grid with no reachable driver answers
//! `None`, a degenerate cell costs infinite minutes.  Only impossible
//! construction requests land here.

use thiserror::Error;

/// Errors produced by `rd-spatial` construction.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cannot build a grid over an empty road network")]
    EmptyNetwork,

    #[error("grid must have at least one cell per axis")]
    ZeroCells,
}

pub type SpatialResult<T> = Result<T, SpatialError>;
