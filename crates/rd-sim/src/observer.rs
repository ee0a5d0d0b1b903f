//! Dispatch observer trait for progress reporting and ride logging.

use rd_core::PassengerId;

use crate::metrics::SimReport;
use crate::sim::RideRecord;

/// Callbacks invoked by [`DispatchSim::run`][crate::DispatchSim::run] as the
/// passenger stream is consumed.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — served-ride counter
///
/// ```rust,ignore
/// struct ServedCounter(usize);
///
/// impl DispatchObserver for ServedCounter {
///     fn on_ride(&mut self, record: &RideRecord) {
///         if record.state == MatchState::Completed {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called once per passenger with the finished record, in request order.
    /// Fires for failed rides too, including the tail marked unserved on
    /// driver exhaustion.
    fn on_ride(&mut self, _record: &RideRecord) {}

    /// Called when an empty grid forces `admitted` upcoming drivers in ahead
    /// of their availability, while matching `passenger`.
    fn on_lookahead(&mut self, _passenger: PassengerId, _admitted: usize) {}

    /// Called when the driver supply runs out entirely: `remaining` counts
    /// `passenger` and everyone after it, all recorded as unserved.
    fn on_exhausted(&mut self, _passenger: PassengerId, _remaining: usize) {}

    /// Called once after the last passenger, with the final report.
    fn on_finish(&mut self, _report: &SimReport) {}
}

/// A [`DispatchObserver`] that does nothing.  Use when you need to call `run`
/// but don't want callbacks.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
