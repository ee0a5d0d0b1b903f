//! Unit tests for rd-spatial.
//!
//! All tests use hand-crafted networks with a 1:1 degree-to-mile scale so
//! expected ETAs can be computed on paper.

#[cfg(test)]
mod helpers {
    use rd_core::{DegreeScale, GeoBounds, GeoPoint};
    use rd_graph::{RoadGraph, RoadGraphBuilder};

    use crate::GridConfig;

    pub fn uniform(mph: f64) -> [f64; 24] {
        [mph; 24]
    }

    /// Two nodes, one directed edge, same speed at every hour on both
    /// calendars.
    pub fn one_edge_graph(a: GeoPoint, b: GeoPoint, length_mi: f64, mph: f64) -> RoadGraph {
        let mut bld = RoadGraphBuilder::new();
        let na = bld.add_node(a).unwrap();
        let nb = bld.add_node(b).unwrap();
        bld.add_edge(na, nb, length_mi, uniform(mph), uniform(mph)).unwrap();
        bld.build()
    }

    /// 2x2 cells over [0,2]x[0,2] degrees, 1 mile per degree on both axes.
    ///
    /// Cell layout (lat_idx, lon_idx):
    ///   (1,0) | (1,1)
    ///   ------+------
    ///   (0,0) | (0,1)
    pub fn square_config() -> GridConfig {
        GridConfig {
            lat_cells:        2,
            lon_cells:        2,
            bounds:           Some(GeoBounds::new(0.0, 0.0, 2.0, 2.0)),
            scale:            DegreeScale { miles_per_lat_degree: 1.0, miles_per_lon_degree: 1.0 },
            max_search_rings: None,
        }
    }

    pub fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

// ── Segment clipping ──────────────────────────────────────────────────────────

#[cfg(test)]
mod clipping {
    use crate::clip::{exit_fraction, ClipRect};

    const UNIT: ClipRect = ClipRect { min_x: 0.0, max_x: 1.0, min_y: 0.0, max_y: 1.0 };

    #[test]
    fn exit_through_side() {
        // Crosses x = 1 at t = (1 - 0.5) / 2 = 0.25.
        let t = exit_fraction((0.5, 0.5), (2.5, 0.5), UNIT);
        assert_eq!(t, Some(0.25));
    }

    #[test]
    fn exit_through_corner() {
        // Both boundaries crossed at t = 0.5; the minimum wins (and they agree).
        let t = exit_fraction((0.5, 0.5), (1.5, 1.5), UNIT);
        assert_eq!(t, Some(0.5));
    }

    #[test]
    fn contained_segment_keeps_full_length() {
        let t = exit_fraction((0.25, 0.25), (0.75, 0.5), UNIT);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn axis_parallel_segment() {
        // Vertical segment: dx = 0, exits through y = 1 at t = 0.75 / 1.5.
        let t = exit_fraction((0.5, 0.25), (0.5, 1.75), UNIT);
        assert_eq!(t, Some(0.5));
    }

    #[test]
    fn start_beyond_rect_is_rejected() {
        // Whole segment left of the rect: empty clip interval.
        assert_eq!(exit_fraction((-1.0, 0.5), (-0.5, 0.5), UNIT), None);
    }

    #[test]
    fn start_on_boundary_exits_immediately() {
        let t = exit_fraction((1.0, 0.5), (2.0, 0.5), UNIT);
        assert_eq!(t, Some(0.0));
    }
}

// ── Cell geometry & speed tables ──────────────────────────────────────────────

#[cfg(test)]
mod cells {
    use rd_core::{DayKind, GeoBounds, GeoPoint, SimRng};
    use rd_graph::RoadGraphBuilder;

    use super::helpers;
    use crate::{GridConfig, SpatialError, SpatialGrid};

    #[test]
    fn cell_index_partitions_bounds() {
        let graph = RoadGraphBuilder::new().build();
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        assert_eq!(grid.cell_index(GeoPoint::new(0.5, 0.5)), (0, 0));
        assert_eq!(grid.cell_index(GeoPoint::new(0.5, 1.5)), (0, 1));
        assert_eq!(grid.cell_index(GeoPoint::new(1.5, 0.5)), (1, 0));
        assert_eq!(grid.cell_index(GeoPoint::new(1.99, 1.99)), (1, 1));
    }

    #[test]
    fn out_of_bounds_folds_into_border_cells() {
        let graph = RoadGraphBuilder::new().build();
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        // Max corner belongs to the last cell; interior seam rounds up.
        assert_eq!(grid.cell_index(GeoPoint::new(2.0, 2.0)), (1, 1));
        assert_eq!(grid.cell_index(GeoPoint::new(1.0, 1.0)), (1, 1));
        // Far outside clamps to the nearest border cell.
        assert_eq!(grid.cell_index(GeoPoint::new(-3.0, 5.0)), (0, 1));
    }

    #[test]
    fn same_cell_edge_kept_whole() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.2, 0.2),
            GeoPoint::new(0.7, 0.7),
            1.0,
            30.0,
        );
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        let cell = grid.cell(0, 0);
        assert_eq!(cell.edges.len(), 1);
        assert_eq!(cell.total_edge_len_mi, 1.0);
        assert_eq!(grid.cell(0, 1).edges.len(), 0);
        assert_eq!(grid.cell(1, 0).edges.len(), 0);
        assert_eq!(grid.cell(1, 1).edges.len(), 0);
    }

    #[test]
    fn split_edge_balances_between_cells() {
        // Crosses the lat = 1 seam exactly halfway: one mile to each cell.
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(1.5, 0.5),
            2.0,
            30.0,
        );
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        assert_eq!(grid.cell(0, 0).total_edge_len_mi, 1.0);
        assert_eq!(grid.cell(1, 0).total_edge_len_mi, 1.0);
        assert_eq!(grid.cell(0, 0).edges.len(), 1);
        assert_eq!(grid.cell(1, 0).edges.len(), 1);
    }

    #[test]
    fn apportioned_length_is_conserved() {
        let mut rng = SimRng::new(17);
        let mut bld = RoadGraphBuilder::new();
        let nodes: Vec<_> = (0..30)
            .map(|_| {
                let p = GeoPoint::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..5.0));
                bld.add_node(p).unwrap()
            })
            .collect();
        for _ in 0..40 {
            let a = nodes[rng.gen_range(0..nodes.len())];
            let b = nodes[rng.gen_range(0..nodes.len())];
            let len = rng.gen_range(0.1..3.0);
            bld.add_edge(a, b, len, helpers::uniform(25.0), helpers::uniform(25.0)).unwrap();
        }
        let graph = bld.build();

        let mut cfg = helpers::square_config();
        cfg.lat_cells = 4;
        cfg.lon_cells = 5;
        cfg.bounds = Some(GeoBounds::new(0.0, 0.0, 4.0, 5.0));
        let grid = SpatialGrid::build(&graph, cfg).unwrap();

        let cell_total: f64 = grid.cells().map(|c| c.total_edge_len_mi).sum();
        let edge_total: f64 = graph.edge_length_mi.iter().sum();
        assert!(
            helpers::close(cell_total, edge_total),
            "cells hold {cell_total} mi of {edge_total} mi"
        );
    }

    #[test]
    fn speed_tables_are_length_weighted() {
        let mut bld = RoadGraphBuilder::new();
        let a = bld.add_node(GeoPoint::new(0.1, 0.1)).unwrap();
        let b = bld.add_node(GeoPoint::new(0.2, 0.2)).unwrap();
        let c = bld.add_node(GeoPoint::new(0.3, 0.3)).unwrap();
        let d = bld.add_node(GeoPoint::new(0.4, 0.4)).unwrap();
        bld.add_edge(a, b, 1.0, helpers::uniform(20.0), helpers::uniform(10.0)).unwrap();
        bld.add_edge(c, d, 3.0, helpers::uniform(40.0), helpers::uniform(30.0)).unwrap();
        let graph = bld.build();

        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let cell = grid.cell(0, 0);

        // Weekday: (1*20 + 3*40) / 4 = 35; weekend: (1*10 + 3*30) / 4 = 25.
        assert_eq!(cell.weekday_avg_mph, [35.0; 24]);
        assert_eq!(cell.weekend_avg_mph, [25.0; 24]);
    }

    #[test]
    fn speed_recompute_is_idempotent() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.2, 0.2),
            GeoPoint::new(1.7, 1.7),
            2.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let weekday = grid.cell(0, 0).weekday_avg_mph;
        let weekend = grid.cell(0, 0).weekend_avg_mph;

        grid.calc_average_speeds(&graph);
        assert_eq!(grid.cell(0, 0).weekday_avg_mph, weekday);
        assert_eq!(grid.cell(0, 0).weekend_avg_mph, weekend);
    }

    #[test]
    fn roadless_cell_has_infinite_pace() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.2, 0.2),
            GeoPoint::new(0.7, 0.7),
            1.0,
            30.0,
        );
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        assert!(grid.cell(1, 1).minutes_per_mile(0, DayKind::Weekday).is_infinite());
        // 30 mph → 2 minutes per mile in the occupied cell.
        assert_eq!(grid.cell(0, 0).minutes_per_mile(0, DayKind::Weekday), 2.0);
    }

    #[test]
    fn bounds_derived_from_nodes_when_unset() {
        let mut bld = RoadGraphBuilder::new();
        bld.add_node(GeoPoint::new(1.0, 2.0)).unwrap();
        bld.add_node(GeoPoint::new(3.0, 5.0)).unwrap();
        let graph = bld.build();

        let mut cfg = helpers::square_config();
        cfg.bounds = None;
        let grid = SpatialGrid::build(&graph, cfg).unwrap();
        assert_eq!(grid.bounds(), GeoBounds::new(1.0, 2.0, 3.0, 5.0));
    }

    #[test]
    fn zero_cell_axis_rejected() {
        let graph = RoadGraphBuilder::new().build();
        let mut cfg = helpers::square_config();
        cfg.lat_cells = 0;
        let err = SpatialGrid::build(&graph, cfg).unwrap_err();
        assert!(matches!(err, SpatialError::ZeroCells));
    }

    #[test]
    fn empty_network_without_bounds_rejected() {
        let graph = RoadGraphBuilder::new().build();
        let mut cfg = helpers::square_config();
        cfg.bounds = None;
        let err = SpatialGrid::build(&graph, cfg).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyNetwork));
    }

    #[test]
    fn default_config_is_city_sized() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.lat_cells, 20);
        assert_eq!(cfg.lon_cells, 30);
        assert!(cfg.bounds.is_none());
        assert!(cfg.max_search_rings.is_none());
    }
}

// ── Driver occupancy ──────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use rd_core::{DriverId, GeoPoint, Timestamp};
    use rd_graph::RoadGraphBuilder;

    use super::helpers;
    use crate::SpatialGrid;

    #[test]
    fn add_move_remove_roundtrip() {
        let graph = RoadGraphBuilder::new().build();
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        let old = GeoPoint::new(0.5, 0.5);
        let new = GeoPoint::new(1.5, 1.5);
        grid.add_driver(DriverId(1), old, Timestamp::ZERO);
        assert_eq!(grid.driver_count(), 1);
        assert_eq!(grid.cell(0, 0).driver_count(), 1);

        grid.move_driver_to(DriverId(1), old, new, Timestamp::from_secs(60));
        assert_eq!(grid.driver_count(), 1);
        assert_eq!(grid.cell(0, 0).driver_count(), 0);
        assert_eq!(grid.cell(1, 1).driver_count(), 1);

        grid.remove_driver(DriverId(1), new);
        assert_eq!(grid.driver_count(), 0);
        assert_eq!(grid.cell(1, 1).driver_count(), 0);
    }

    #[test]
    fn residents_are_listed_per_cell() {
        let graph = RoadGraphBuilder::new().build();
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();

        grid.add_driver(DriverId(3), GeoPoint::new(0.2, 0.2), Timestamp::ZERO);
        grid.add_driver(DriverId(8), GeoPoint::new(0.8, 0.8), Timestamp::ZERO);

        let mut residents: Vec<_> = grid.cell(0, 0).resident_drivers().collect();
        residents.sort();
        assert_eq!(residents, vec![DriverId(3), DriverId(8)]);
    }
}

// ── Closest-driver search ─────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use rd_core::{DriverId, GeoPoint, Timestamp};

    use super::helpers;
    use crate::SpatialGrid;

    // Timestamp::ZERO is a Thursday, 00:00 — hour 0 of a weekday.

    #[test]
    fn finds_driver_in_pickup_cell() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        grid.add_driver(DriverId(1), GeoPoint::new(0.5, 0.5), Timestamp::ZERO);

        // 0.4 Manhattan miles at 2 min/mile.
        let (id, eta) = grid
            .closest_driver(GeoPoint::new(0.5, 0.9), Timestamp::ZERO)
            .unwrap();
        assert_eq!(id, DriverId(1));
        assert!(helpers::close(eta, 0.8), "eta = {eta}");
    }

    #[test]
    fn expands_rings_to_far_corner() {
        // Road (and therefore a speed) only in the far-corner cell (1,1);
        // pickup sits in (0,0).  Rings: {(0,0)}, {(0,1),(1,0)}, {(1,1)}.
        let graph = helpers::one_edge_graph(
            GeoPoint::new(1.25, 1.25),
            GeoPoint::new(1.75, 1.75),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        grid.add_driver(DriverId(4), GeoPoint::new(1.5, 1.5), Timestamp::ZERO);

        let (id, eta) = grid
            .closest_driver(GeoPoint::new(0.1, 0.1), Timestamp::ZERO)
            .unwrap();
        assert_eq!(id, DriverId(4));
        // 2.8 Manhattan miles at 2 min/mile.
        assert!(helpers::close(eta, 5.6), "eta = {eta}");
    }

    #[test]
    fn ring_budget_bounds_the_search() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(1.25, 1.25),
            GeoPoint::new(1.75, 1.75),
            1.0,
            30.0,
        );
        // Driver two rings out from the pickup cell.
        for (max, found) in [(Some(0), false), (Some(1), false), (Some(2), true), (None, true)] {
            let mut cfg = helpers::square_config();
            cfg.max_search_rings = max;
            let mut grid = SpatialGrid::build(&graph, cfg).unwrap();
            grid.add_driver(DriverId(1), GeoPoint::new(1.5, 1.5), Timestamp::ZERO);

            let hit = grid.closest_driver(GeoPoint::new(0.1, 0.1), Timestamp::ZERO);
            assert_eq!(hit.is_some(), found, "max_search_rings = {max:?}");
        }
    }

    #[test]
    fn picks_minimum_eta_within_a_ring() {
        // Two cells in the same ring, different paces: (0,1) at 60 mph,
        // (1,0) at 15 mph.  Both drivers are 1.0 Manhattan mile out.
        let mut bld = rd_graph::RoadGraphBuilder::new();
        let a = bld.add_node(GeoPoint::new(0.2, 1.2)).unwrap();
        let b = bld.add_node(GeoPoint::new(0.8, 1.8)).unwrap();
        let c = bld.add_node(GeoPoint::new(1.2, 0.2)).unwrap();
        let d = bld.add_node(GeoPoint::new(1.8, 0.8)).unwrap();
        bld.add_edge(a, b, 1.0, helpers::uniform(60.0), helpers::uniform(60.0)).unwrap();
        bld.add_edge(c, d, 1.0, helpers::uniform(15.0), helpers::uniform(15.0)).unwrap();
        let graph = bld.build();

        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        grid.add_driver(DriverId(7), GeoPoint::new(0.5, 1.5), Timestamp::ZERO);
        grid.add_driver(DriverId(9), GeoPoint::new(1.5, 0.5), Timestamp::ZERO);

        let hit = grid.closest_driver(GeoPoint::new(0.5, 0.5), Timestamp::ZERO);
        assert_eq!(hit, Some((DriverId(7), 1.0)));
    }

    #[test]
    fn equal_eta_prefers_lower_id() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let pos = GeoPoint::new(0.5, 0.5);
        grid.add_driver(DriverId(5), pos, Timestamp::ZERO);
        grid.add_driver(DriverId(2), pos, Timestamp::ZERO);

        let (id, _) = grid.closest_driver(GeoPoint::new(0.5, 0.9), Timestamp::ZERO).unwrap();
        assert_eq!(id, DriverId(2));
    }

    #[test]
    fn busy_driver_pays_remaining_wait() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let busy_until = Timestamp::ZERO.advance_minutes(10.0);
        grid.add_driver(DriverId(1), GeoPoint::new(0.5, 0.5), busy_until);

        let (_, eta) = grid.closest_driver(GeoPoint::new(0.5, 0.9), Timestamp::ZERO).unwrap();
        assert!(helpers::close(eta, 10.8), "eta = {eta}");
    }

    #[test]
    fn already_available_driver_is_unpenalized() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        grid.add_driver(DriverId(1), GeoPoint::new(0.5, 0.5), Timestamp::ZERO);

        // Ten minutes later, availability in the past adds nothing.
        let later = Timestamp::from_secs(600);
        let (_, eta) = grid.closest_driver(GeoPoint::new(0.5, 0.9), later).unwrap();
        assert!(helpers::close(eta, 0.8), "eta = {eta}");
    }

    #[test]
    fn driver_in_roadless_cell_is_unreachable() {
        // A driver in a cell with no recorded speed can never produce a
        // finite ETA, not even at zero distance.
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let stranded = GeoPoint::new(1.5, 1.5);
        grid.add_driver(DriverId(1), stranded, Timestamp::ZERO);

        assert_eq!(grid.closest_driver(GeoPoint::new(0.5, 0.5), Timestamp::ZERO), None);
        assert_eq!(grid.closest_driver(stranded, Timestamp::ZERO), None);
    }

    #[test]
    fn empty_grid_answers_none() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.9, 0.1),
            1.0,
            30.0,
        );
        let grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        assert_eq!(grid.closest_driver(GeoPoint::new(0.5, 0.5), Timestamp::ZERO), None);
    }

    #[test]
    fn request_hour_selects_pace() {
        // 30 mph at hour 0, 60 mph the rest of the day.
        let mut weekday = helpers::uniform(60.0);
        weekday[0] = 30.0;
        let mut bld = rd_graph::RoadGraphBuilder::new();
        let a = bld.add_node(GeoPoint::new(0.1, 0.1)).unwrap();
        let b = bld.add_node(GeoPoint::new(0.9, 0.1)).unwrap();
        bld.add_edge(a, b, 1.0, weekday, helpers::uniform(60.0)).unwrap();
        let graph = bld.build();

        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        grid.add_driver(DriverId(1), GeoPoint::new(0.5, 0.5), Timestamp::ZERO);

        let pickup = GeoPoint::new(0.5, 0.9);
        let (_, midnight) = grid.closest_driver(pickup, Timestamp::ZERO).unwrap();
        let (_, one_am) = grid.closest_driver(pickup, Timestamp::from_secs(3_600)).unwrap();
        assert!(helpers::close(midnight, 0.8), "eta = {midnight}");
        assert!(helpers::close(one_am, 0.4), "eta = {one_am}");
    }

    #[test]
    fn weekend_request_uses_weekend_table() {
        // 60 mph on weekdays, 30 mph on weekends.
        let mut bld = rd_graph::RoadGraphBuilder::new();
        let a = bld.add_node(GeoPoint::new(0.1, 0.1)).unwrap();
        let b = bld.add_node(GeoPoint::new(0.9, 0.1)).unwrap();
        bld.add_edge(a, b, 1.0, helpers::uniform(60.0), helpers::uniform(30.0)).unwrap();
        let graph = bld.build();

        let mut grid = SpatialGrid::build(&graph, helpers::square_config()).unwrap();
        let friday = Timestamp::parse("4/25/2014 12:00:00").unwrap();
        let saturday = Timestamp::parse("4/26/2014 12:00:00").unwrap();
        grid.add_driver(DriverId(1), GeoPoint::new(0.5, 0.5), Timestamp::ZERO);

        let pickup = GeoPoint::new(0.5, 0.9);
        let (_, fri_eta) = grid.closest_driver(pickup, friday).unwrap();
        let (_, sat_eta) = grid.closest_driver(pickup, saturday).unwrap();
        assert!(helpers::close(fri_eta, 0.4), "eta = {fri_eta}");
        assert!(helpers::close(sat_eta, 0.8), "eta = {sat_eta}");
    }
}

// ── Nearest-node index ────────────────────────────────────────────────────────

#[cfg(test)]
mod kdtree {
    use rd_core::{DriverId, GeoPoint, NodeId, SimRng, SpatialEntity};

    use super::helpers;
    use crate::kdtree::DEFAULT_MAX_DEPTH;
    use crate::NodeIndex;

    /// `side x side` lattice of distinct points, 0.5 degrees apart,
    /// `NodeId(i * side + j)` at `(i * 0.5, j * 0.5)`.
    fn lattice(side: u32) -> Vec<(NodeId, GeoPoint)> {
        (0..side * side)
            .map(|n| {
                let (i, j) = (n / side, n % side);
                (NodeId(n), GeoPoint::new(i as f64 * 0.5, j as f64 * 0.5))
            })
            .collect()
    }

    fn scattered(n: u32, seed: u64) -> Vec<(NodeId, GeoPoint)> {
        let mut rng = SimRng::new(seed);
        (0..n)
            .map(|i| {
                (
                    NodeId(i),
                    GeoPoint::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)),
                )
            })
            .collect()
    }

    fn brute_k(points: &[(NodeId, GeoPoint)], k: usize, at: GeoPoint) -> Vec<(f64, NodeId)> {
        let mut all: Vec<(f64, NodeId)> = points
            .iter()
            .map(|&(id, p)| (at.euclidean_deg(p), id))
            .collect();
        all.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        all.truncate(k);
        all
    }

    #[test]
    fn every_node_is_its_own_nearest() {
        let points = lattice(5);
        let index = NodeIndex::from_points(points.clone(), DEFAULT_MAX_DEPTH);
        assert_eq!(index.len(), 25);
        for (id, p) in points {
            assert_eq!(index.nearest(p), Some((0.0, id)));
        }
    }

    #[test]
    fn knn_matches_brute_force() {
        let points = scattered(60, 7);
        let index = NodeIndex::from_points(points.clone(), DEFAULT_MAX_DEPTH);

        let queries = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(2.9, -2.9),
            GeoPoint::new(-1.3, 0.2),
            GeoPoint::new(5.0, 5.0), // outside the point cloud
        ];
        for q in queries {
            for k in [1, 5, 13] {
                assert_eq!(index.k_nearest(k, q), brute_k(&points, k, q), "k = {k}, q = {q}");
            }
        }
    }

    #[test]
    fn k_zero_is_empty() {
        let index = NodeIndex::from_points(lattice(3), DEFAULT_MAX_DEPTH);
        assert!(index.k_nearest(0, GeoPoint::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn k_beyond_len_returns_everything() {
        let points = lattice(3);
        let index = NodeIndex::from_points(points.clone(), DEFAULT_MAX_DEPTH);
        let out = index.k_nearest(100, GeoPoint::new(0.7, 0.7));
        assert_eq!(out.len(), points.len());
        assert!(out.windows(2).all(|w| w[0].0 <= w[1].0), "not ascending: {out:?}");
    }

    #[test]
    fn empty_index_answers_none() {
        let index = NodeIndex::from_points(Vec::new(), DEFAULT_MAX_DEPTH);
        assert!(index.is_empty());
        assert_eq!(index.nearest(GeoPoint::new(0.0, 0.0)), None);
        assert!(index.k_nearest(3, GeoPoint::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn duplicate_positions_tie_on_id() {
        let p = GeoPoint::new(1.0, 1.0);
        let points: Vec<_> = (0..6).map(|i| (NodeId(i), p)).collect();
        let index = NodeIndex::from_points(points, DEFAULT_MAX_DEPTH);

        assert_eq!(index.nearest(p), Some((0.0, NodeId(0))));
        let ids: Vec<_> = index.k_nearest(3, p).into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn zero_depth_degenerates_to_scan() {
        let points = scattered(30, 3);
        let index = NodeIndex::from_points(points.clone(), 0);
        let q = GeoPoint::new(0.4, -0.9);
        assert_eq!(index.k_nearest(4, q), brute_k(&points, 4, q));
    }

    #[test]
    fn build_indexes_all_graph_nodes() {
        let graph = helpers::one_edge_graph(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            1.0,
            30.0,
        );
        let index = NodeIndex::build(&graph, DEFAULT_MAX_DEPTH);
        assert_eq!(index.len(), 2);
        let (_, id) = index.nearest(GeoPoint::new(0.1, 0.1)).unwrap();
        assert_eq!(id, NodeId(0));
    }

    #[test]
    fn resolve_snaps_entity_position() {
        struct Probe {
            id: DriverId,
            at: GeoPoint,
        }
        impl SpatialEntity for Probe {
            type Id = DriverId;
            fn identity(&self) -> DriverId {
                self.id
            }
            fn coordinates(&self) -> GeoPoint {
                self.at
            }
        }

        let index = NodeIndex::from_points(lattice(4), DEFAULT_MAX_DEPTH);
        let probe = Probe { id: DriverId(1), at: GeoPoint::new(0.26, 0.01) };
        // (0.26, 0.01) is nearer to the lattice point (0.5, 0.0) = NodeId(4)
        // than to the origin.
        assert_eq!(index.resolve(&probe), Some(NodeId(4)));
    }
}
