//! Graph-subsystem error type.
//!
//! Every variant here means malformed input or a broken cross-reference.
//! Routing outcomes are never errors: an unreachable destination is a normal
//! `None` from [`shortest_travel_time`](crate::RoadGraph::shortest_travel_time).

use thiserror::Error;

use rd_core::{GeoPoint, NodeId};

/// Errors produced by `rd-graph` builders and loaders.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("non-finite node coordinate {0}")]
    MalformedNode(GeoPoint),

    #[error("edge endpoint {0} not in graph")]
    UnknownEndpoint(NodeId),

    #[error("edge {from}->{to}: {reason}")]
    MalformedEdge {
        from:   NodeId,
        to:     NodeId,
        reason: &'static str,
    },

    #[error("edge row references unknown node id {0}")]
    UnknownNodeRef(u64),

    #[error("edge row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
