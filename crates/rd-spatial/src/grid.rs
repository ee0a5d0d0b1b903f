//! City-scale dispatch grid: per-cell speed averages, driver occupancy, and
//! the expanding-ring closest-driver search.
//!
//! # Geometry
//!
//! A bounding rectangle is divided into `lat_cells x lon_cells` equal cells,
//! stored row-major by latitude index.  Every road node lands in exactly one
//! cell.  Every edge contributes its full length, split between the cells of
//! its two endpoints: the start cell receives the clipped portion up to where
//! the segment leaves it ([`crate::clip`]), the end cell receives the rest.
//! Cell totals therefore sum to the network's total edge length.
//!
//! # Speeds
//!
//! Each cell carries a weekday and a weekend 24-hour average-speed table,
//! the length-weighted mean over the edge portions resident in the cell.
//! A cell with no road length answers infinite minutes-per-mile, which makes
//! its drivers invisible to dispatch rather than spuriously attractive.
//!
//! # Dispatch search
//!
//! `closest_driver` flood-fills outward from the pickup's cell in
//! 4-connected rings.  Each ring is evaluated in full; the search expands to
//! the next ring only when the current ring held no finite-ETA driver, so
//! the winner is always found in the first ring that has one.  Ties break on
//! the lower `DriverId`, making results independent of hash-map iteration
//! order.

use rd_core::{DayKind, DegreeScale, DriverId, EdgeId, GeoBounds, GeoPoint, NodeId, Timestamp};
use rd_graph::RoadGraph;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::clip::{exit_fraction, ClipRect};
use crate::error::{SpatialError, SpatialResult};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Grid construction parameters.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Number of cell rows (latitude bands).
    pub lat_cells: usize,
    /// Number of cell columns (longitude bands).
    pub lon_cells: usize,
    /// Explicit coverage rectangle.  `None` derives it from the road
    /// network's node positions.
    pub bounds: Option<GeoBounds>,
    /// Degree-to-mile factors for ETA estimation.
    pub scale: DegreeScale,
    /// How many rings beyond the pickup's own cell `closest_driver` may
    /// expand through: `Some(0)` restricts the search to the pickup cell,
    /// `None` lets it cover the whole grid.
    pub max_search_rings: Option<u32>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lat_cells:        20,
            lon_cells:        30,
            bounds:           None,
            scale:            DegreeScale::default(),
            max_search_rings: None,
        }
    }
}

// ── GridCell ──────────────────────────────────────────────────────────────────

/// One cell of the dispatch grid.
#[derive(Debug)]
pub struct GridCell {
    /// Road nodes positioned inside this cell.
    pub nodes: FxHashSet<NodeId>,
    /// Edge portions resident in this cell: `(edge, portion_miles)`.
    pub edges: Vec<(EdgeId, f64)>,
    /// Sum of the portion lengths, the weight denominator for the averages.
    pub total_edge_len_mi: f64,
    /// Length-weighted average speed per hour, weekday table.
    pub weekday_avg_mph: [f64; 24],
    /// Length-weighted average speed per hour, weekend table.
    pub weekend_avg_mph: [f64; 24],

    drivers: FxHashMap<DriverId, CellOccupant>,
}

/// A driver currently resident in a cell.
#[derive(Debug)]
struct CellOccupant {
    pos:          GeoPoint,
    available_at: Timestamp,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            nodes:             FxHashSet::default(),
            edges:             Vec::new(),
            total_edge_len_mi: 0.0,
            weekday_avg_mph:   [0.0; 24],
            weekend_avg_mph:   [0.0; 24],
            drivers:           FxHashMap::default(),
        }
    }
}

impl GridCell {
    /// Estimated minutes to cover one mile in this cell at the given hour.
    ///
    /// Infinite when the cell has no recorded speed (no road length, or all
    /// resident edges report 0 mph), so distances through it dominate any
    /// finite alternative.
    pub fn minutes_per_mile(&self, hour: u8, day: DayKind) -> f64 {
        let mph = match day {
            DayKind::Weekday => self.weekday_avg_mph[hour as usize],
            DayKind::Weekend => self.weekend_avg_mph[hour as usize],
        };
        if mph > 0.0 {
            60.0 / mph
        } else {
            f64::INFINITY
        }
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn resident_drivers(&self) -> impl Iterator<Item = DriverId> + '_ {
        self.drivers.keys().copied()
    }

    fn push_edge(&mut self, edge: EdgeId, portion_mi: f64) {
        self.edges.push((edge, portion_mi));
        self.total_edge_len_mi += portion_mi;
    }

    /// Best finite-ETA driver in this cell for a pickup at `from`, using the
    /// cell's own pace `mpm` (minutes per mile).  A driver still finishing a
    /// previous ride adds the remaining minutes until `available_at` on top
    /// of travel time.
    fn closest_driver(
        &self,
        from: GeoPoint,
        at: Timestamp,
        mpm: f64,
        scale: DegreeScale,
    ) -> Option<(f64, DriverId)> {
        let mut best: Option<(f64, DriverId)> = None;
        for (&id, occ) in &self.drivers {
            let mut eta = from.manhattan_miles(occ.pos, scale) * mpm;
            let pending = occ.available_at.minutes_since(at);
            if pending > 0.0 {
                eta += pending;
            }
            // Infinite pace yields an infinite (or, at zero distance, NaN)
            // ETA; either way the driver is not a candidate.
            if !eta.is_finite() {
                continue;
            }
            if better((eta, id), best) {
                best = Some((eta, id));
            }
        }
        best
    }
}

/// `(eta, id)` ordering: lower ETA wins, lower ID breaks ties.
fn better(candidate: (f64, DriverId), best: Option<(f64, DriverId)>) -> bool {
    match best {
        None => true,
        Some((b_eta, b_id)) => candidate
            .0
            .total_cmp(&b_eta)
            .then_with(|| candidate.1.cmp(&b_id))
            .is_lt(),
    }
}

// ── SpatialGrid ───────────────────────────────────────────────────────────────

/// The dispatch grid: static road geometry plus mutable driver occupancy.
#[derive(Debug)]
pub struct SpatialGrid {
    cells:            Vec<GridCell>,
    lat_cells:        usize,
    lon_cells:        usize,
    bounds:           GeoBounds,
    scale:            DegreeScale,
    max_search_rings: Option<u32>,
    driver_count:     usize,
}

impl SpatialGrid {
    /// Build the grid over `graph`: place nodes, apportion edge lengths, and
    /// compute the per-cell speed tables.
    pub fn build(graph: &RoadGraph, config: GridConfig) -> SpatialResult<SpatialGrid> {
        if config.lat_cells == 0 || config.lon_cells == 0 {
            return Err(SpatialError::ZeroCells);
        }
        let bounds = config
            .bounds
            .or_else(|| graph.bounds())
            .ok_or(SpatialError::EmptyNetwork)?;

        let cell_count = config.lat_cells * config.lon_cells;
        let mut grid = SpatialGrid {
            cells:            (0..cell_count).map(|_| GridCell::default()).collect(),
            lat_cells:        config.lat_cells,
            lon_cells:        config.lon_cells,
            bounds,
            scale:            config.scale,
            max_search_rings: config.max_search_rings,
            driver_count:     0,
        };

        for (i, &pos) in graph.node_pos.iter().enumerate() {
            grid.add_node(NodeId(i as u32), pos);
        }
        for e in 0..graph.edge_count() {
            grid.add_edge(graph, EdgeId(e as u32));
        }
        grid.calc_average_speeds(graph);

        log::info!(
            "spatial grid ready: {}x{} cells over {}, {} nodes, {} edges apportioned",
            grid.lat_cells,
            grid.lon_cells,
            grid.bounds,
            graph.node_count(),
            graph.edge_count(),
        );
        Ok(grid)
    }

    // ── Static geometry ───────────────────────────────────────────────────────

    /// Register a road node in the cell containing its position.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) {
        let (i, j) = self.cell_index(pos);
        self.cell_mut(i, j).nodes.insert(id);
    }

    /// Apportion an edge's length between its endpoint cells.
    ///
    /// When both endpoints share a cell, that cell receives the full length
    /// as a single entry.  Otherwise the start cell receives the portion up
    /// to the segment's exit from it and the end cell the remainder.  A
    /// failed clip (start node clamped in from outside the bounds) falls
    /// back to attributing the full length to the start cell.
    pub fn add_edge(&mut self, graph: &RoadGraph, edge: EdgeId) {
        let from = graph.node_pos[graph.edge_from[edge.index()].index()];
        let to = graph.node_pos[graph.edge_to[edge.index()].index()];
        let length = graph.edge_length_mi[edge.index()];

        let (si, sj) = self.cell_index(from);
        let (ei, ej) = self.cell_index(to);
        if (si, sj) == (ei, ej) {
            self.cell_mut(si, sj).push_edge(edge, length);
            return;
        }

        let rect = self.cell_rect(si, sj);
        let start_portion = match exit_fraction((from.lat, from.lon), (to.lat, to.lon), rect) {
            Some(t) => t * length,
            None => {
                log::warn!("clip failed for {edge} from {from} to {to}; start cell takes full length");
                length
            }
        };
        self.cell_mut(si, sj).push_edge(edge, start_portion);
        self.cell_mut(ei, ej).push_edge(edge, length - start_portion);
    }

    /// Recompute every cell's hourly speed tables from its resident edge
    /// portions.  Tables are zeroed first, so calling this again after
    /// further `add_edge` calls gives the same result as a fresh build.
    pub fn calc_average_speeds(&mut self, graph: &RoadGraph) {
        for cell in &mut self.cells {
            cell.weekday_avg_mph = [0.0; 24];
            cell.weekend_avg_mph = [0.0; 24];
            if cell.total_edge_len_mi <= 0.0 {
                continue;
            }
            for &(edge, portion) in &cell.edges {
                let e = edge.index();
                for h in 0..24 {
                    cell.weekday_avg_mph[h] += portion * graph.edge_weekday_mph[e][h];
                    cell.weekend_avg_mph[h] += portion * graph.edge_weekend_mph[e][h];
                }
            }
            for h in 0..24 {
                cell.weekday_avg_mph[h] /= cell.total_edge_len_mi;
                cell.weekend_avg_mph[h] /= cell.total_edge_len_mi;
            }
        }
    }

    // ── Driver occupancy ──────────────────────────────────────────────────────

    /// Register a driver at `pos`, free for dispatch from `available_at`.
    pub fn add_driver(&mut self, id: DriverId, pos: GeoPoint, available_at: Timestamp) {
        let (i, j) = self.cell_index(pos);
        let prev = self.cell_mut(i, j).drivers.insert(id, CellOccupant { pos, available_at });
        if prev.is_none() {
            self.driver_count += 1;
        }
    }

    /// Remove a driver.  `pos` must be the position it was registered under,
    /// since that determines which cell is holding it.
    pub fn remove_driver(&mut self, id: DriverId, pos: GeoPoint) {
        let (i, j) = self.cell_index(pos);
        let removed = self.cell_mut(i, j).drivers.remove(&id).is_some();
        debug_assert!(removed, "driver {id} is not resident at {pos}");
        if removed {
            self.driver_count -= 1;
        }
    }

    /// Relocate a driver, updating the moment it next becomes available.
    pub fn move_driver_to(
        &mut self,
        id: DriverId,
        old_pos: GeoPoint,
        new_pos: GeoPoint,
        available_at: Timestamp,
    ) {
        self.remove_driver(id, old_pos);
        self.add_driver(id, new_pos, available_at);
    }

    pub fn driver_count(&self) -> usize {
        self.driver_count
    }

    // ── Dispatch search ───────────────────────────────────────────────────────

    /// Find the driver with the lowest estimated arrival at `from`, in
    /// minutes from `at`.
    ///
    /// The estimate is Manhattan miles times the candidate's cell pace at
    /// the hour of `at`, plus any minutes remaining until the driver becomes
    /// available.  Searching proceeds ring by ring outward from the pickup
    /// cell and stops at the first ring containing a usable driver, or after
    /// `max_search_rings` empty-handed rings, or when the grid is exhausted.
    pub fn closest_driver(&self, from: GeoPoint, at: Timestamp) -> Option<(DriverId, f64)> {
        if self.driver_count == 0 {
            return None;
        }
        let hour = at.hour_of_day();
        let day = at.day_kind();
        let (oi, oj) = self.cell_index(from);

        let mut queued = vec![false; self.cells.len()];
        queued[self.flat(oi, oj)] = true;
        let mut ring = vec![(oi, oj)];

        let mut best: Option<(f64, DriverId)> = None;
        let mut rings_searched = 0u32;

        loop {
            for &(i, j) in &ring {
                let cell = self.cell(i, j);
                let mpm = cell.minutes_per_mile(hour, day);
                if let Some(found) = cell.closest_driver(from, at, mpm, self.scale) {
                    if better(found, best) {
                        best = Some(found);
                    }
                }
            }
            if best.is_some() {
                break;
            }

            rings_searched += 1;
            if let Some(max) = self.max_search_rings {
                if rings_searched > max {
                    break;
                }
            }

            let next = self.expand_ring(&ring, &mut queued);
            if next.is_empty() {
                break;
            }
            ring = next;
        }

        best.map(|(eta, id)| (id, eta))
    }

    /// 4-connected neighbors of every ring cell not yet visited.
    fn expand_ring(&self, ring: &[(usize, usize)], queued: &mut [bool]) -> Vec<(usize, usize)> {
        const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        let mut next = Vec::new();
        for &(i, j) in ring {
            for (di, dj) in OFFSETS {
                let ni = i as isize + di;
                let nj = j as isize + dj;
                if ni < 0 || nj < 0 {
                    continue;
                }
                let (ni, nj) = (ni as usize, nj as usize);
                if ni >= self.lat_cells || nj >= self.lon_cells {
                    continue;
                }
                let f = self.flat(ni, nj);
                if !queued[f] {
                    queued[f] = true;
                    next.push((ni, nj));
                }
            }
        }
        next
    }

    // ── Access ────────────────────────────────────────────────────────────────

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn scale(&self) -> DegreeScale {
        self.scale
    }

    pub fn lat_cells(&self) -> usize {
        self.lat_cells
    }

    pub fn lon_cells(&self) -> usize {
        self.lon_cells
    }

    pub fn cell(&self, lat_idx: usize, lon_idx: usize) -> &GridCell {
        &self.cells[self.flat(lat_idx, lon_idx)]
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Cell indices `(lat_idx, lon_idx)` containing `p`.
    ///
    /// f64-to-usize casts saturate (NaN to 0), so coordinates outside the
    /// bounds clamp into the border cells instead of panicking; the closed
    /// upper boundary folds into the last cell on each axis.
    pub fn cell_index(&self, p: GeoPoint) -> (usize, usize) {
        let t_lat = (p.lat - self.bounds.min_lat) / self.bounds.lat_span() * self.lat_cells as f64;
        let t_lon = (p.lon - self.bounds.min_lon) / self.bounds.lon_span() * self.lon_cells as f64;
        let i = (t_lat.floor() as usize).min(self.lat_cells - 1);
        let j = (t_lon.floor() as usize).min(self.lon_cells - 1);
        (i, j)
    }

    fn cell_rect(&self, lat_idx: usize, lon_idx: usize) -> ClipRect {
        let h = self.bounds.lat_span() / self.lat_cells as f64;
        let w = self.bounds.lon_span() / self.lon_cells as f64;
        ClipRect {
            min_x: self.bounds.min_lat + lat_idx as f64 * h,
            max_x: self.bounds.min_lat + (lat_idx + 1) as f64 * h,
            min_y: self.bounds.min_lon + lon_idx as f64 * w,
            max_y: self.bounds.min_lon + (lon_idx + 1) as f64 * w,
        }
    }

    fn cell_mut(&mut self, lat_idx: usize, lon_idx: usize) -> &mut GridCell {
        let f = self.flat(lat_idx, lon_idx);
        &mut self.cells[f]
    }

    #[inline]
    fn flat(&self, lat_idx: usize, lon_idx: usize) -> usize {
        lat_idx * self.lon_cells + lon_idx
    }
}
