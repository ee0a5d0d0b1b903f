//! `rd-spatial` — the two spatial structures behind driver dispatch.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`grid`]    | `SpatialGrid`: per-cell speed averages, driver occupancy,   |
//! |             | expanding-ring closest-driver search                        |
//! | [`clip`]    | segment/rectangle exit-fraction clipping (Liang–Barsky)     |
//! | [`kdtree`]  | `NodeIndex`: static k-d tree for nearest-road-node queries  |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! The grid answers "which available driver can reach this pickup soonest,
//! roughly?" using cell-level average speeds; the k-d tree answers "which
//! road node is this coordinate?" exactly.  Both are built once from the
//! road graph; only driver occupancy mutates afterwards.

pub mod clip;
pub mod error;
pub mod grid;
pub mod kdtree;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use grid::{GridCell, GridConfig, SpatialGrid};
pub use kdtree::NodeIndex;
