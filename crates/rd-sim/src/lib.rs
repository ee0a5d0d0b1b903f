//! Dispatch event loop for the ride-dispatch simulator.
//!
//! Everything upstream of this crate is static: a routable road network
//! (`rd-graph`) and the spatial indexes over it (`rd-spatial`).  This crate
//! adds the moving parts — a driver roster, a passenger request stream, and
//! the loop that matches one to the other:
//!
//! ```text
//!                    ┌───────────────────────────────────────┐
//!   passengers ──────▶  ① admit drivers due by request time  │
//!   (time order)     │  ② lookahead if the grid ran dry      │
//!                    │  ③ ring search for the closest driver │
//!                    │  ④ route driver→pickup→drop-off       │
//!                    │  ⑤ settle: pay, relocate or retire    │
//!                    └──────────────────┬────────────────────┘
//!                                       ▼
//!                          RideRecord per passenger,
//!                          SimReport at the end
//! ```
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | `agents`   | [`Driver`] and [`Passenger`] event records              |
//! | `config`   | [`DispatchConfig`] tunables                             |
//! | `context`  | [`SimulationContext`] — graph plus its spatial indexes  |
//! | `sim`      | [`DispatchSim`] and the ride/anomaly record types       |
//! | `observer` | [`DispatchObserver`] per-ride callbacks                 |
//! | `metrics`  | [`SimReport`] aggregate totals and means                |
//! | `loader`   | CSV loaders for rosters and request streams             |
//! | `error`    | [`SimError`]                                            |
//!
//! The loop is deterministic for a given [`DispatchConfig::seed`]: the only
//! randomness is the per-ride continuation draw, and ties in the spatial
//! queries break on ids, never on hash or heap order.

pub mod agents;
pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod observer;
pub mod sim;


pub use agents::{Driver, Passenger};
pub use config::DispatchConfig;
pub use context::SimulationContext;
pub use error::{SimError, SimResult};
pub use loader::{
    load_drivers_csv, load_drivers_reader, load_passengers_csv, load_passengers_reader,
};
pub use metrics::SimReport;
pub use observer::{DispatchObserver, NoopObserver};
pub use sim::{Anomaly, DispatchSim, MatchState, RideLegs, RideRecord, DEFAULT_LOOKAHEAD_BATCH};
