//! Synthetic Midtown Manhattan street lattice.
//!
//! Avenues run north–south, streets east–west, in Manhattan block
//! proportions: short blocks between adjacent streets (~0.05 mi), long
//! blocks between adjacent avenues (~0.17 mi).  Every segment is two-way;
//! cross streets carry an hourly speed profile with weekday rush-hour dips,
//! avenues run the same profile scaled up for their signal progression.

use rd_core::{DegreeScale, GeoPoint, NodeId};
use rd_graph::{GraphResult, RoadGraph, RoadGraphBuilder};

/// East–west rows of the lattice.
pub const STREETS: usize = 12;
/// North–south columns of the lattice.
pub const AVENUES: usize = 8;

/// Degree step between adjacent streets (latitude axis).
pub const STREET_STEP_LAT: f64 = 0.0008;
/// Degree step between adjacent avenues (longitude axis).
pub const AVENUE_STEP_LON: f64 = 0.0037;

/// South-west corner of the lattice, near 34th St & 9th Ave.
pub const ORIGIN_LAT: f64 = 40.748;
pub const ORIGIN_LON: f64 = -73.997;

/// Avenues flow this much faster than cross streets at every hour.
const AVENUE_FLOW_FACTOR: f64 = 1.3;

/// Cross-street speeds (mph) by hour of day, Monday–Friday.
const STREET_WEEKDAY_MPH: [f64; 24] = [
    21.0, 22.0, 22.0, 22.0, 21.0, 18.0, // 00–05  overnight
    14.0, 9.0, 8.0, 9.0, 12.0, 12.0, // 06–11  morning rush into midday
    11.0, 11.0, 12.0, 11.0, 8.0, 7.0, // 12–17  midday into evening rush
    8.0, 11.0, 14.0, 16.0, 18.0, 20.0, // 18–23  evening taper
];

/// Cross-street speeds (mph) by hour of day, weekends.
const STREET_WEEKEND_MPH: [f64; 24] = [
    22.0, 23.0, 23.0, 23.0, 22.0, 21.0, // 00–05  overnight
    19.0, 17.0, 15.0, 14.0, 13.0, 12.0, // 06–11  slow build through brunch
    12.0, 12.0, 12.0, 13.0, 13.0, 13.0, // 12–17  steady afternoon
    14.0, 14.0, 15.0, 16.0, 18.0, 20.0, // 18–23  evening taper
];

#[inline]
fn node_at(ids: &[NodeId], street: usize, avenue: usize) -> NodeId {
    ids[street * AVENUES + avenue]
}

/// Build the lattice: `STREETS x AVENUES` corners, every block two-way.
pub fn build_network() -> GraphResult<RoadGraph> {
    let scale = DegreeScale::default();
    let street_block_mi = AVENUE_STEP_LON * scale.miles_per_lon_degree;
    let avenue_block_mi = STREET_STEP_LAT * scale.miles_per_lat_degree;

    let avenue_weekday = STREET_WEEKDAY_MPH.map(|mph| mph * AVENUE_FLOW_FACTOR);
    let avenue_weekend = STREET_WEEKEND_MPH.map(|mph| mph * AVENUE_FLOW_FACTOR);

    let mut b = RoadGraphBuilder::with_capacity(
        STREETS * AVENUES,
        2 * (STREETS * (AVENUES - 1) + (STREETS - 1) * AVENUES),
    );

    let mut corners = Vec::with_capacity(STREETS * AVENUES);
    for s in 0..STREETS {
        for a in 0..AVENUES {
            corners.push(b.add_node(GeoPoint::new(
                ORIGIN_LAT + s as f64 * STREET_STEP_LAT,
                ORIGIN_LON + a as f64 * AVENUE_STEP_LON,
            ))?);
        }
    }

    // Cross streets: east–west blocks between adjacent avenues.
    for s in 0..STREETS {
        for a in 0..AVENUES - 1 {
            let (u, v) = (node_at(&corners, s, a), node_at(&corners, s, a + 1));
            b.add_edge(u, v, street_block_mi, STREET_WEEKDAY_MPH, STREET_WEEKEND_MPH)?;
            b.add_edge(v, u, street_block_mi, STREET_WEEKDAY_MPH, STREET_WEEKEND_MPH)?;
        }
    }

    // Avenues: north–south blocks between adjacent streets.
    for s in 0..STREETS - 1 {
        for a in 0..AVENUES {
            let (u, v) = (node_at(&corners, s, a), node_at(&corners, s + 1, a));
            b.add_edge(u, v, avenue_block_mi, avenue_weekday, avenue_weekend)?;
            b.add_edge(v, u, avenue_block_mi, avenue_weekday, avenue_weekend)?;
        }
    }

    Ok(b.build())
}
