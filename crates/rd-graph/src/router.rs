//! Shortest-travel-time queries over the road graph.
//!
//! # Cost units
//!
//! Edge costs are **integer milliseconds** internally: `length / speed`
//! converted to ms and rounded once per edge.  Keeping the heap keys integral
//! sidesteps `f64` ordering entirely and makes tie-breaking exact; the public
//! result converts back to fractional minutes.
//!
//! # Departure-time snapshot
//!
//! The hour-of-day and weekday/weekend classification are taken from the
//! departure timestamp **once** and used for every edge on the path, even
//! when the path itself crosses an hour boundary.  Re-evaluating speeds at
//! per-edge arrival times would make costs time-dependent in a way plain
//! Dijkstra cannot handle correctly; the snapshot keeps the search exact for
//! the frozen cost function and is a good approximation for intra-city trips.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rd_core::{DayKind, EdgeId, NodeId, Timestamp};

use crate::network::RoadGraph;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;

impl RoadGraph {
    /// Minutes to drive from `from` to `to` departing at `depart`, or `None`
    /// if `to` is unreachable.
    ///
    /// `from == to` is `Some(0.0)`.  Both nodes must belong to this graph.
    ///
    /// Standard Dijkstra over the CSR adjacency; edge speeds are selected
    /// from the departure-hour snapshot described in the module docs.
    pub fn shortest_travel_time(
        &self,
        from: NodeId,
        to: NodeId,
        depart: Timestamp,
    ) -> Option<f64> {
        if from == to {
            return Some(0.0);
        }

        let hour = depart.hour_of_day();
        let day  = depart.day_kind();

        // dist[v] = best known cost (ms) to reach v.
        let mut dist = vec![u64::MAX; self.node_count()];
        dist[from.index()] = 0;

        // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
        // Secondary key NodeId ensures deterministic tie-breaking.
        let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, from)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == to {
                return Some(cost as f64 / MS_PER_MINUTE);
            }

            // Skip stale heap entries.
            if cost > dist[node.index()] {
                continue;
            }

            for edge in self.out_edges(node) {
                let neighbor = self.edge_to[edge.index()];
                let new_cost = cost.saturating_add(self.edge_cost_ms(edge, hour, day));

                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    heap.push(Reverse((new_cost, neighbor)));
                }
            }
        }

        None
    }

    /// Traversal cost of `edge` in milliseconds under the given snapshot.
    #[inline]
    fn edge_cost_ms(&self, edge: EdgeId, hour: u8, day: DayKind) -> u64 {
        let hours = self.edge_length_mi[edge.index()] / self.speed_mph(edge, hour, day);
        (hours * MS_PER_HOUR).round() as u64
    }
}
