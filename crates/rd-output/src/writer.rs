//! The `RideLogWriter` trait implemented by log backends.

use crate::{OutputResult, RideRow};

/// Trait implemented by ride-log backends.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`RideLogObserver::take_error`](crate::RideLogObserver::take_error).
pub trait RideLogWriter {
    /// Append one ride row.
    fn write_ride(&mut self, row: &RideRow) -> OutputResult<()>;

    /// Flush and close the underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
