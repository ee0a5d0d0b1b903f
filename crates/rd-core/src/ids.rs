//! Typed identifiers for the entities the simulator tracks.
//!
//! Every id is a dense `u32` row number into column-vector storage, so the
//! wrappers are free at runtime while keeping a `NodeId` from ever being
//! handed to something expecting a `DriverId`.  The inner value stays `pub`
//! for `id.0` access in hot loops; `index()` is the readable spelling.

use std::fmt;

/// Declare a batch of `u32`-backed id newtypes.
macro_rules! typed_id {
    ($($(#[$attr:meta])* $vis:vis struct $name:ident;)+) => {$(
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel for "no such entity"; never a real row number.
            pub const INVALID: $name = $name(u32::MAX);

            /// Row number in the owning collection.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    )+};
}

typed_id! {
    /// Dense index of a road-network node.  External ids from source data
    /// are remapped to these during graph construction.
    pub struct NodeId;

    /// Index of a directed road-network edge.
    pub struct EdgeId;

    /// Index of a driver in the simulation roster.
    pub struct DriverId;

    /// Index of a passenger request in arrival order.
    pub struct PassengerId;
}
