//! Node and edge loaders.
//!
//! # File formats
//!
//! **Nodes** — one JSON object keyed by external node id:
//!
//! ```json
//! {
//!   "42434559": { "lon": -74.184452, "lat": 40.579119 },
//!   "42434560": { "lon": -74.189744, "lat": 40.578068 }
//! }
//! ```
//!
//! **Edges** — CSV, one directed edge per row, 51 columns:
//!
//! ```csv
//! start_id,end_id,length,weekday_0,...,weekday_23,weekend_0,...,weekend_23
//! 42434559,42434560,0.32,19.1,...,22.7,20.4,...,23.0
//! ```
//!
//! `length` is in miles; the 48 speed columns are mph for each hour of day.
//!
//! External ids are arbitrary `u64`s from the upstream map extract.  They are
//! remapped to dense `NodeId`s in ascending external-id order, so the same
//! input files always produce the same graph regardless of hash-map iteration
//! order.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;

use rd_core::{GeoPoint, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::network::{RoadGraph, RoadGraphBuilder};

/// Columns per edge row: start, end, length, 24 weekday + 24 weekend speeds.
const EDGE_COLUMNS: usize = 51;

// ── Records ───────────────────────────────────────────────────────────────────

/// One parsed edge row, still carrying external node ids.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub start_id:    u64,
    pub end_id:      u64,
    pub length_mi:   f64,
    pub weekday_mph: [f64; 24],
    pub weekend_mph: [f64; 24],
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the node collection from a JSON file.
pub fn load_nodes_json(path: &Path) -> GraphResult<FxHashMap<u64, GeoPoint>> {
    let file = std::fs::File::open(path).map_err(GraphError::Io)?;
    load_nodes_reader(std::io::BufReader::new(file))
}

/// Like [`load_nodes_json`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_nodes_reader<R: Read>(reader: R) -> GraphResult<FxHashMap<u64, GeoPoint>> {
    let nodes: FxHashMap<u64, GeoPoint> = serde_json::from_reader(reader)?;
    Ok(nodes)
}

/// Load the edge table from a CSV file.
pub fn load_edges_csv(path: &Path) -> GraphResult<Vec<EdgeRecord>> {
    let file = std::fs::File::open(path).map_err(GraphError::Io)?;
    load_edges_reader(std::io::BufReader::new(file))
}

/// Like [`load_edges_csv`] but accepts any `Read` source.
pub fn load_edges_reader<R: Read>(reader: R) -> GraphResult<Vec<EdgeRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Data row i sits on line i + 2 (1-based, after the header).
        records.push(parse_edge_row(&row, i + 2)?);
    }

    Ok(records)
}

/// Assemble a [`RoadGraph`] from loaded node and edge records.
///
/// External ids are remapped to dense `NodeId`s (ascending external-id
/// order); edges referencing an id absent from `nodes` fail with
/// [`GraphError::UnknownNodeRef`].
pub fn build_graph(
    nodes: &FxHashMap<u64, GeoPoint>,
    edges: &[EdgeRecord],
) -> GraphResult<RoadGraph> {
    let mut external_ids: Vec<u64> = nodes.keys().copied().collect();
    external_ids.sort_unstable();

    let mut builder = RoadGraphBuilder::with_capacity(nodes.len(), edges.len());
    let mut id_map: FxHashMap<u64, NodeId> = FxHashMap::default();
    id_map.reserve(external_ids.len());

    for ext in external_ids {
        let id = builder.add_node(nodes[&ext])?;
        id_map.insert(ext, id);
    }

    for rec in edges {
        let resolve = |ext: u64| id_map.get(&ext).copied().ok_or(GraphError::UnknownNodeRef(ext));
        builder.add_edge(
            resolve(rec.start_id)?,
            resolve(rec.end_id)?,
            rec.length_mi,
            rec.weekday_mph,
            rec.weekend_mph,
        )?;
    }

    let graph = builder.build();
    log::info!(
        "road graph: {} nodes, {} edges, network average speed {:.1} mph",
        graph.node_count(),
        graph.edge_count(),
        graph.average_speed_mph()
    );
    Ok(graph)
}

/// Load both files and assemble the graph in one call.
pub fn load_graph(nodes_path: &Path, edges_path: &Path) -> GraphResult<RoadGraph> {
    let nodes = load_nodes_json(nodes_path)?;
    let edges = load_edges_csv(edges_path)?;
    build_graph(&nodes, &edges)
}

// ── Row parsing ───────────────────────────────────────────────────────────────

fn parse_edge_row(row: &csv::StringRecord, line: usize) -> GraphResult<EdgeRecord> {
    if row.len() != EDGE_COLUMNS {
        return Err(GraphError::MalformedRow {
            row:    line,
            reason: format!("expected {EDGE_COLUMNS} columns, found {}", row.len()),
        });
    }

    let mut weekday_mph = [0.0f64; 24];
    let mut weekend_mph = [0.0f64; 24];
    for h in 0..24 {
        weekday_mph[h] = parse_field(row, 3 + h, line)?;
        weekend_mph[h] = parse_field(row, 27 + h, line)?;
    }

    Ok(EdgeRecord {
        start_id:  parse_field(row, 0, line)?,
        end_id:    parse_field(row, 1, line)?,
        length_mi: parse_field(row, 2, line)?,
        weekday_mph,
        weekend_mph,
    })
}

fn parse_field<T: std::str::FromStr>(
    row: &csv::StringRecord,
    column: usize,
    line: usize,
) -> GraphResult<T> {
    row.get(column)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| GraphError::MalformedRow {
            row:    line,
            reason: format!("column {column} is missing or not numeric"),
        })
}
