//! Dispatch loop configuration.

use crate::sim::DEFAULT_LOOKAHEAD_BATCH;

/// Tunables for a dispatch run.
///
/// The defaults reproduce the reference scenario: a driver keeps working
/// after a ride with probability 14/15, and an empty grid pulls the next 10
/// upcoming drivers in early.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Root seed for the continuation draws.
    pub seed: u64,
    /// Drivers admitted ahead of schedule when the grid runs empty.
    pub lookahead_batch: usize,
    /// Probability that a driver stays on the road after completing a ride.
    /// Clamped to `[0, 1]` at the draw.
    pub continue_probability: f64,
    /// Depth bound for the nearest-node index.
    pub kd_max_depth: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            seed:                  0,
            lookahead_batch:       DEFAULT_LOOKAHEAD_BATCH,
            continue_probability:  14.0 / 15.0,
            kd_max_depth:          rd_spatial::kdtree::DEFAULT_MAX_DEPTH,
        }
    }
}
