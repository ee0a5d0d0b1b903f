//! `RideLogObserver<W>` — bridges `DispatchObserver` to a `RideLogWriter`.

use rd_sim::{DispatchObserver, RideRecord, SimReport};

use crate::row::RideRow;
use crate::writer::RideLogWriter;
use crate::OutputError;

/// A [`DispatchObserver`] that writes one [`RideRow`] per processed passenger
/// to any [`RideLogWriter`] backend.
///
/// Errors from the writer are stored internally because observer methods have
/// no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct RideLogObserver<W: RideLogWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: RideLogWriter> RideLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: RideLogWriter> DispatchObserver for RideLogObserver<W> {
    fn on_ride(&mut self, record: &RideRecord) {
        let row = RideRow::from_record(record);
        let result = self.writer.write_ride(&row);
        self.store_err(result);
    }

    fn on_finish(&mut self, _report: &SimReport) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
