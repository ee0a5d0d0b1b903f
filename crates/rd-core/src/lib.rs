//! `rd-core` — foundational types for the ride-dispatch simulator.
//!
//! This crate is a dependency of every other `rd-*` crate.  It intentionally
//! has no `rd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `DriverId`, `PassengerId`         |
//! | [`geo`]         | `GeoPoint`, `GeoBounds`, degree-to-mile scaling       |
//! | [`time`]        | `Timestamp`, weekday/weekend classification           |
//! | [`rng`]         | `SimRng` (seeded, with derived child streams)         |
//! | [`entity`]      | `SpatialEntity` trait for index-resolvable agents     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types; required by |
//! |         | `rd-graph`'s JSON node loader.                             |

pub mod entity;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use entity::SpatialEntity;
pub use error::{CoreError, CoreResult};
pub use geo::{DegreeScale, GeoBounds, GeoPoint};
pub use ids::{DriverId, EdgeId, NodeId, PassengerId};
pub use rng::SimRng;
pub use time::{DayKind, Timestamp};
