//! Static k-d tree over road-network nodes.
//!
//! # Structure
//!
//! Split axis alternates with depth (even = latitude, odd = longitude); each
//! branch splits at the median coordinate, with the median point itself going
//! right.  Recursion stops at `max_depth` or when a split would leave one
//! side empty; remaining points become a leaf bucket.  Every tree node keeps
//! its bounding rectangle so queries can prune whole subtrees by
//! point-to-rectangle distance.
//!
//! # Queries
//!
//! `k_nearest` keeps the best `k` candidates in a bounded max-heap: the root
//! of the heap is the current worst, so a subtree is visited only while the
//! heap is short or the subtree's rectangle could match or beat that worst.
//! Distances are Euclidean in degree space — a consistent order for snapping,
//! not a physical distance.
//!
//! The tree is immutable after build; driver movement never touches it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rd_core::{GeoBounds, GeoPoint, NodeId, SpatialEntity};
use rd_graph::RoadGraph;

/// Depth bound for tree construction.  At one split per level this caps the
/// tree at ~4 billion branches, far beyond any city extract; the bound exists
/// to cut off pathological splits on heavily duplicated coordinates.
pub const DEFAULT_MAX_DEPTH: usize = 32;

// ── NodeIndex ─────────────────────────────────────────────────────────────────

/// Nearest-road-node index: a static k-d tree over `(NodeId, GeoPoint)`.
pub struct NodeIndex {
    root: Option<KdNode>,
    len:  usize,
}

struct KdNode {
    bounds: GeoBounds,
    kind:   KdKind,
}

enum KdKind {
    Branch {
        axis:  Axis,
        split: f64,
        left:  Box<KdNode>,
        right: Box<KdNode>,
    },
    Leaf(Vec<(NodeId, GeoPoint)>),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Axis {
    Lat,
    Lon,
}

impl Axis {
    #[inline]
    fn of_depth(depth: usize) -> Axis {
        if depth % 2 == 0 { Axis::Lat } else { Axis::Lon }
    }

    #[inline]
    fn coord(self, p: GeoPoint) -> f64 {
        match self {
            Axis::Lat => p.lat,
            Axis::Lon => p.lon,
        }
    }
}

impl NodeIndex {
    /// Index every node of `graph`.
    pub fn build(graph: &RoadGraph, max_depth: usize) -> NodeIndex {
        let points: Vec<(NodeId, GeoPoint)> = graph
            .node_pos
            .iter()
            .enumerate()
            .map(|(i, &pos)| (NodeId(i as u32), pos))
            .collect();
        Self::from_points(points, max_depth)
    }

    /// Build from an explicit point set.  An empty set yields an index that
    /// answers `None` to every query.
    pub fn from_points(mut points: Vec<(NodeId, GeoPoint)>, max_depth: usize) -> NodeIndex {
        let len = points.len();
        let Some(bounds) = GeoBounds::from_points(points.iter().map(|&(_, p)| p)) else {
            return NodeIndex { root: None, len: 0 };
        };
        let root = build_node(&mut points, 0, max_depth, bounds);
        NodeIndex { root: Some(root), len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `k` indexed nodes closest to `at`, ascending by degree-space
    /// Euclidean distance (ties by `NodeId`).  Shorter than `k` only when
    /// the index holds fewer points.
    pub fn k_nearest(&self, k: usize, at: GeoPoint) -> Vec<(f64, NodeId)> {
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
        if k > 0 {
            if let Some(root) = &self.root {
                search(root, k, at, &mut heap);
            }
        }
        let mut out: Vec<(f64, NodeId)> = heap.into_iter().map(|c| (c.dist, c.node)).collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }

    /// The single closest indexed node to `at`.
    pub fn nearest(&self, at: GeoPoint) -> Option<(f64, NodeId)> {
        self.k_nearest(1, at).into_iter().next()
    }

    /// Snap an entity's position to its nearest road node.
    ///
    /// `None` only for an empty index.
    pub fn resolve<E: SpatialEntity>(&self, entity: &E) -> Option<NodeId> {
        self.nearest(entity.coordinates()).map(|(_, id)| id)
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

fn build_node(
    points: &mut [(NodeId, GeoPoint)],
    depth: usize,
    max_depth: usize,
    bounds: GeoBounds,
) -> KdNode {
    let axis = Axis::of_depth(depth);
    let mid = points.len() / 2;

    // mid == 0 means one point (or none): splitting cannot make progress.
    if depth >= max_depth || mid == 0 {
        return KdNode { bounds, kind: KdKind::Leaf(points.to_vec()) };
    }

    points.select_nth_unstable_by(mid, |a, b| axis.coord(a.1).total_cmp(&axis.coord(b.1)));
    let split = axis.coord(points[mid].1);

    // Child rectangles narrow the parent on the split axis only.
    let (mut left_bounds, mut right_bounds) = (bounds, bounds);
    match axis {
        Axis::Lat => {
            left_bounds.max_lat = split;
            right_bounds.min_lat = split;
        }
        Axis::Lon => {
            left_bounds.max_lon = split;
            right_bounds.min_lon = split;
        }
    }

    let (left_pts, right_pts) = points.split_at_mut(mid);
    KdNode {
        bounds,
        kind: KdKind::Branch {
            axis,
            split,
            left:  Box::new(build_node(left_pts, depth + 1, max_depth, left_bounds)),
            right: Box::new(build_node(right_pts, depth + 1, max_depth, right_bounds)),
        },
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// Max-heap entry: the heap root is the worst of the best-k candidates.
struct Candidate {
    dist: f64,
    node: NodeId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.node.cmp(&other.node))
    }
}

fn search(node: &KdNode, k: usize, at: GeoPoint, heap: &mut BinaryHeap<Candidate>) {
    match &node.kind {
        KdKind::Leaf(points) => {
            for &(id, p) in points {
                let cand = Candidate { dist: at.euclidean_deg(p), node: id };
                if heap.len() < k {
                    heap.push(cand);
                } else if heap.peek().is_some_and(|w| cand < *w) {
                    heap.push(cand);
                    heap.pop();
                }
            }
        }
        KdKind::Branch { axis, split, left, right } => {
            let (near, far) = if axis.coord(at) > *split {
                (right, left)
            } else {
                (left, right)
            };
            if should_visit(near, k, at, heap) {
                search(near, k, at, heap);
            }
            if should_visit(far, k, at, heap) {
                search(far, k, at, heap);
            }
        }
    }
}

/// Non-strict on purpose: a rectangle at exactly the worst distance can still
/// hold an equal-distance point with a lower id, and the id tiebreak must see
/// it.  Only degenerate (duplicate-coordinate) data hits the equality case.
#[inline]
fn should_visit(node: &KdNode, k: usize, at: GeoPoint, heap: &BinaryHeap<Candidate>) -> bool {
    heap.len() < k || dist_to_rect(at, node.bounds) <= worst(heap)
}

#[inline]
fn worst(heap: &BinaryHeap<Candidate>) -> f64 {
    heap.peek().map(|c| c.dist).unwrap_or(f64::INFINITY)
}

/// Distance from `p` to the nearest point of `rect`; zero inside.
fn dist_to_rect(p: GeoPoint, rect: GeoBounds) -> f64 {
    let d_lat = (rect.min_lat - p.lat).max(0.0).max(p.lat - rect.max_lat);
    let d_lon = (rect.min_lon - p.lon).max(0.0).max(p.lon - rect.max_lon);
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}
