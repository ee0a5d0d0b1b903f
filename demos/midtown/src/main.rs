//! midtown — ride-dispatch demo on a synthetic Midtown Manhattan lattice.
//!
//! Simulates one Friday of ride demand across a 12 x 8 avenue/street
//! lattice: 40 drivers come on shift through the morning, 240 passengers
//! request rides between random corners over twelve hours.  Every processed
//! request lands in `output/midtown/rides.csv`; set `LOG=info` (or `debug`)
//! to watch the dispatch loop work.  Swap the lattice for a real city
//! extract (`rd_graph::load_graph`) to run at full scale.

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use rd_core::{DriverId, GeoPoint, PassengerId, SimRng, Timestamp};
use rd_graph::RoadGraph;
use rd_output::{CsvRideLog, RideLogObserver, RideLogWriter};
use rd_sim::{
    DispatchConfig, DispatchObserver, DispatchSim, Driver, MatchState, Passenger, RideRecord,
    SimReport, SimulationContext,
};
use rd_spatial::GridConfig;

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const DRIVER_COUNT:      usize = 40;
const PASSENGER_COUNT:   usize = 240;
const SEED:              u64   = 42;
const SHIFT_START:       &str  = "4/25/2014 6:00:00"; // a Friday
const SHIFT_SPREAD_MIN:  f64   = 180.0; // drivers come online over 3 h
const DEMAND_SPREAD_MIN: f64   = 720.0; // requests spread over 12 h
const GRID_LAT_CELLS:    usize = 6;     // ~2 streets per cell row
const GRID_LON_CELLS:    usize = 8;     // ~1 avenue per cell column

// ── Scenario generation ───────────────────────────────────────────────────────

/// A point near a random corner: node position plus up to half a block of
/// jitter on each axis, like a phone GPS fix at the curb.
fn curbside(rng: &mut SimRng, graph: &RoadGraph) -> GeoPoint {
    let corner = graph.node_pos[rng.gen_range(0..graph.node_count())];
    GeoPoint::new(
        corner.lat + rng.gen_range(-0.5..0.5) * network::STREET_STEP_LAT,
        corner.lon + rng.gen_range(-0.5..0.5) * network::AVENUE_STEP_LON,
    )
}

/// Driver shifts spread through the morning; ids follow roster order after
/// the sort, the way the CSV loaders hand them out.
fn generate_drivers(rng: &mut SimRng, graph: &RoadGraph, shift_start: Timestamp) -> Vec<Driver> {
    let mut shifts: Vec<(Timestamp, GeoPoint)> = (0..DRIVER_COUNT)
        .map(|_| {
            let at = shift_start.advance_minutes(rng.gen_range(0.0..SHIFT_SPREAD_MIN));
            (at, curbside(rng, graph))
        })
        .collect();
    shifts.sort_by_key(|&(at, _)| at);
    shifts
        .into_iter()
        .enumerate()
        .map(|(i, (at, pos))| Driver::new(DriverId(i as u32 + 1), at, pos))
        .collect()
}

/// Ride requests between random corners, spread across the working day.
fn generate_passengers(
    rng: &mut SimRng,
    graph: &RoadGraph,
    shift_start: Timestamp,
) -> Vec<Passenger> {
    let mut requests: Vec<(Timestamp, GeoPoint, GeoPoint)> = (0..PASSENGER_COUNT)
        .map(|_| {
            let at = shift_start.advance_minutes(rng.gen_range(0.0..DEMAND_SPREAD_MIN));
            (at, curbside(rng, graph), curbside(rng, graph))
        })
        .collect();
    requests.sort_by_key(|&(at, _, _)| at);
    requests
        .into_iter()
        .enumerate()
        .map(|(i, (at, pickup, dropoff))| {
            Passenger::new(PassengerId(i as u32 + 1), at, pickup, dropoff)
        })
        .collect()
}

// ── Observer wrapper to count events ──────────────────────────────────────────

struct CountingObserver<W: RideLogWriter> {
    inner:      RideLogObserver<W>,
    served:     usize,
    failed:     usize,
    lookaheads: usize,
}

impl<W: RideLogWriter> CountingObserver<W> {
    fn new(inner: RideLogObserver<W>) -> Self {
        Self { inner, served: 0, failed: 0, lookaheads: 0 }
    }
}

impl<W: RideLogWriter> DispatchObserver for CountingObserver<W> {
    fn on_ride(&mut self, record: &RideRecord) {
        if record.state == MatchState::Completed {
            self.served += 1;
        } else {
            self.failed += 1;
        }
        self.inner.on_ride(record);
    }

    fn on_lookahead(&mut self, passenger: PassengerId, admitted: usize) {
        self.lookaheads += 1;
        self.inner.on_lookahead(passenger, admitted);
    }

    fn on_exhausted(&mut self, passenger: PassengerId, remaining: usize) {
        self.inner.on_exhausted(passenger, remaining);
    }

    fn on_finish(&mut self, report: &SimReport) {
        self.inner.on_finish(report);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::builder().parse_env("LOG").init();

    println!("=== midtown — ride dispatch on a synthetic Manhattan lattice ===");
    println!("Drivers: {DRIVER_COUNT}  |  Passengers: {PASSENGER_COUNT}  |  Seed: {SEED}");
    println!();

    // 1. Build the street lattice.
    let graph = build_network()?;
    println!(
        "Lattice: {} corners, {} directed blocks, {:.1} mph network average",
        graph.node_count(),
        graph.edge_count(),
        graph.average_speed_mph(),
    );

    // 2. Generate the day's event streams from one root seed.
    let shift_start = Timestamp::parse(SHIFT_START)?;
    let mut root = SimRng::new(SEED);
    let mut shift_rng = root.child(0);
    let mut demand_rng = root.child(1);
    let drivers = generate_drivers(&mut shift_rng, &graph, shift_start);
    let passengers = generate_passengers(&mut demand_rng, &graph, shift_start);
    println!(
        "First shift at {}, last request at {}",
        drivers[0].available_at,
        passengers[PASSENGER_COUNT - 1].requested_at,
    );
    println!();

    // 3. Spatial context: dispatch grid + nearest-corner index.
    let grid_config = GridConfig {
        lat_cells: GRID_LAT_CELLS,
        lon_cells: GRID_LON_CELLS,
        ..GridConfig::default()
    };
    let dispatch = DispatchConfig { seed: SEED, ..DispatchConfig::default() };
    let context = SimulationContext::build(graph, grid_config, dispatch.kd_max_depth)?;

    // 4. Assemble the simulator.
    let mut sim = DispatchSim::new(context, drivers, passengers, dispatch)?;

    // 5. Ride log.
    std::fs::create_dir_all("output/midtown")?;
    let writer = CsvRideLog::new(Path::new("output/midtown"))?;
    let mut obs = CountingObserver::new(RideLogObserver::new(writer));

    // 6. Run the day.
    let t0 = Instant::now();
    let report = sim.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("ride log error: {e}");
    }

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  rides.csv: {} rows ({} completed, {} failed), {} lookahead admissions",
        obs.served + obs.failed,
        obs.served,
        obs.failed,
        obs.lookaheads,
    );
    println!();
    println!("{report}");
    println!();

    // 8. Where the roster ended up.
    println!("{:<8} {:<22} {:<20}", "Driver", "Last fix", "Available at");
    println!("{}", "-".repeat(52));
    for d in sim.drivers().iter().take(8) {
        println!(
            "{:<8} ({:.4}, {:.4})    {}",
            d.id.0, d.pos.lat, d.pos.lon, d.available_at,
        );
    }
    if sim.drivers().len() > 8 {
        println!("... and {} more", sim.drivers().len() - 8);
    }

    Ok(())
}
