//! Trait seam between agents and the spatial index.
//!
//! Drivers and passengers both need "snap my position to the nearest road
//! node"; the index should not know either type.  `SpatialEntity` is the
//! whole contract: a stable identity for logging and a coordinate to query
//! by.

use std::fmt::Display;
use std::hash::Hash;

use crate::geo::GeoPoint;

/// Anything with an identity and a position that a spatial index can resolve.
pub trait SpatialEntity {
    type Id: Copy + Eq + Hash + Display;

    fn identity(&self) -> Self::Id;

    fn coordinates(&self) -> GeoPoint;
}
