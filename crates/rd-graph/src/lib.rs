//! `rd-graph` — time-dependent road graph and travel-time routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (CSR adjacency), `RoadGraphBuilder`             |
//! | [`router`]  | `RoadGraph::shortest_travel_time` (Dijkstra)                |
//! | [`loader`]  | JSON node / CSV edge loaders, external-id remapping         |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                              |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{GraphError, GraphResult};
pub use loader::{EdgeRecord, build_graph, load_graph};
pub use network::{RoadGraph, RoadGraphBuilder};
