//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_mi`, and the two
//! speed tables) are sorted by source node and indexed by `EdgeId`.
//! Iteration over a node's outgoing edges is therefore a contiguous memory
//! scan — ideal for Dijkstra's inner loop.
//!
//! # Time-varying speeds
//!
//! Each directed edge carries 48 speeds: one per hour of day for weekdays and
//! one per hour for weekends.  The builder rejects non-positive or non-finite
//! entries, so every downstream `length / speed` division is safe.

use rd_core::{DayKind, EdgeId, GeoBounds, GeoPoint, NodeId};

use crate::error::{GraphError, GraphResult};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format with hourly speed profiles per edge.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`] or the loaders in
/// [`loader`](crate::loader).
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in miles.
    pub edge_length_mi: Vec<f64>,

    /// Average speed (mph) per hour of day, Monday through Friday.
    pub edge_weekday_mph: Vec<[f64; 24]>,

    /// Average speed (mph) per hour of day, Saturday and Sunday.
    pub edge_weekend_mph: Vec<[f64; 24]>,
}

impl RoadGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Edge attributes ───────────────────────────────────────────────────

    /// Speed of `edge` for the given hour and day classification, in mph.
    ///
    /// Guaranteed positive and finite by builder validation.
    #[inline]
    pub fn speed_mph(&self, edge: EdgeId, hour: u8, day: DayKind) -> f64 {
        match day {
            DayKind::Weekday => self.edge_weekday_mph[edge.index()][hour as usize],
            DayKind::Weekend => self.edge_weekend_mph[edge.index()][hour as usize],
        }
    }

    // ── Whole-graph statistics ────────────────────────────────────────────

    /// Tightest bounding rectangle around all nodes, or `None` if the graph
    /// is empty.  Used to default the dispatch grid's coverage area.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.node_pos.iter().copied())
    }

    /// Unweighted mean over every `(edge, hour, day-kind)` speed entry, in
    /// mph.  A coarse network health figure reported after loading; `0.0`
    /// for an edgeless graph.
    pub fn average_speed_mph(&self) -> f64 {
        let entries = self.edge_count() * 48;
        if entries == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .edge_weekday_mph
            .iter()
            .chain(self.edge_weekend_mph.iter())
            .flat_map(|table| table.iter())
            .sum();
        sum / entries as f64
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order and validates
/// each record as it arrives — malformed input stops here, never inside the
/// simulation.  `build()` sorts edges by source node and constructs the CSR
/// arrays.
///
/// # Example
///
/// ```
/// use rd_core::GeoPoint;
/// use rd_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(40.71, -74.00))?;
/// let c = b.add_node(GeoPoint::new(40.72, -73.99))?;
/// b.add_edge(a, c, 0.9, [25.0; 24], [28.0; 24])?;
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1); // directed
/// # Ok::<(), rd_graph::GraphError>(())
/// ```
pub struct RoadGraphBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:        NodeId,
    to:          NodeId,
    length_mi:   f64,
    weekday_mph: [f64; 24],
    weekend_mph: [f64; 24],
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading from disk.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    ///
    /// Rejects non-finite coordinates.
    pub fn add_node(&mut self, pos: GeoPoint) -> GraphResult<NodeId> {
        if !pos.is_finite() {
            return Err(GraphError::MalformedNode(pos));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        Ok(id)
    }

    /// Add a **directed** edge from `from` to `to`.
    ///
    /// - `length_mi`: physical length in miles; must be positive and finite.
    /// - `weekday_mph` / `weekend_mph`: hourly speeds; every entry must be
    ///   positive and finite.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_mi: f64,
        weekday_mph: [f64; 24],
        weekend_mph: [f64; 24],
    ) -> GraphResult<()> {
        for id in [from, to] {
            if id.index() >= self.nodes.len() {
                return Err(GraphError::UnknownEndpoint(id));
            }
        }
        let malformed = |reason| GraphError::MalformedEdge { from, to, reason };
        if !(length_mi.is_finite() && length_mi > 0.0) {
            return Err(malformed("length must be positive and finite"));
        }
        if !all_positive(&weekday_mph) {
            return Err(malformed("weekday speeds must be positive and finite"));
        }
        if !all_positive(&weekend_mph) {
            return Err(malformed("weekend speeds must be positive and finite"));
        }
        self.raw_edges.push(RawEdge { from, to, length_mi, weekday_mph, weekend_mph });
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort, where E = edges.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort edges by source node for CSR construction.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| e.from.0);

        let edge_from:        Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:          Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_mi:   Vec<f64>       = raw.iter().map(|e| e.length_mi).collect();
        let edge_weekday_mph: Vec<[f64; 24]> = raw.iter().map(|e| e.weekday_mph).collect();
        let edge_weekend_mph: Vec<[f64; 24]> = raw.iter().map(|e| e.weekend_mph).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        RoadGraph {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_mi,
            edge_weekday_mph,
            edge_weekend_mph,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn all_positive(table: &[f64; 24]) -> bool {
    table.iter().all(|&mph| mph.is_finite() && mph > 0.0)
}
