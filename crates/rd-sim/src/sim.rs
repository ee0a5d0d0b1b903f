//! The `DispatchSim` struct and its passenger loop.

use std::fmt;

use rustc_hash::FxHashMap;

use rd_core::{DriverId, NodeId, PassengerId, SimRng, Timestamp};

use crate::agents::{Driver, Passenger};
use crate::config::DispatchConfig;
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::metrics::SimReport;
use crate::observer::DispatchObserver;

/// Drivers admitted early when the grid runs empty.
pub const DEFAULT_LOOKAHEAD_BATCH: usize = 10;

// ── Ride records ──────────────────────────────────────────────────────────────

/// Lifecycle of one passenger's match.
///
/// Records end in `Completed` or `Failed`; the other states are the stations
/// a ride passes through on the way.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MatchState {
    Unassigned,
    DriverSought,
    Matched,
    Routed,
    Completed,
    Failed,
}

impl MatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::Unassigned   => "unassigned",
            MatchState::DriverSought => "driver_sought",
            MatchState::Matched      => "matched",
            MatchState::Routed       => "routed",
            MatchState::Completed    => "completed",
            MatchState::Failed       => "failed",
        }
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a matched ride could not be carried out.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Anomaly {
    /// Drivers were on the grid, but the flood fill found no finite-ETA one.
    NoUsableDriver,
    /// No road path from the matched driver to the pickup (or no road nodes
    /// to snap to at all).
    PickupUnroutable,
    /// No road path from the pickup to the drop-off.
    DropoffUnroutable,
}

impl Anomaly {
    pub fn as_str(self) -> &'static str {
        match self {
            Anomaly::NoUsableDriver    => "no_usable_driver",
            Anomaly::PickupUnroutable  => "pickup_unroutable",
            Anomaly::DropoffUnroutable => "dropoff_unroutable",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three time legs of a served ride, in minutes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RideLegs {
    /// Minutes until the driver becomes available, zero if already free.
    pub time_to_available: f64,
    /// Driving minutes from the driver's position to the pickup node.
    pub time_to_pickup: f64,
    /// Driving minutes from the pickup node to the drop-off node.
    pub time_to_dropoff: f64,
}

impl RideLegs {
    /// What the passenger experiences: all three legs end to end.
    pub fn wait_minutes(&self) -> f64 {
        self.time_to_available + self.time_to_pickup + self.time_to_dropoff
    }

    /// What the driver earns: paid drop-off leg minus unpaid pickup leg.
    pub fn profit_minutes(&self) -> f64 {
        self.time_to_dropoff - self.time_to_pickup
    }
}

/// The full outcome of one passenger's request.
#[derive(Clone, Debug, PartialEq)]
pub struct RideRecord {
    pub passenger:    PassengerId,
    pub requested_at: Timestamp,
    pub state:        MatchState,
    /// Set from `Matched` onward.
    pub driver:       Option<DriverId>,
    /// Set from `Routed` onward.
    pub legs:         Option<RideLegs>,
    pub anomaly:      Option<Anomaly>,
}

impl RideRecord {
    pub fn new(passenger: PassengerId, requested_at: Timestamp) -> RideRecord {
        RideRecord {
            passenger,
            requested_at,
            state: MatchState::Unassigned,
            driver: None,
            legs: None,
            anomaly: None,
        }
    }
}

// ── DispatchSim ───────────────────────────────────────────────────────────────

/// The dispatch runner.
///
/// Consumes a time-ordered passenger stream against a time-ordered driver
/// roster, one passenger at a time:
///
/// 1. **Admit** — every driver with `available_at ≤ requested_at` enters the
///    grid.
/// 2. **Lookahead** — an empty grid pulls the next `lookahead_batch` drivers
///    in ahead of their availability; an empty grid *and* an exhausted
///    roster fails this and every remaining passenger.
/// 3. **Search** — expanding-ring `closest_driver` query at the pickup.
/// 4. **Route** — driver, pickup, and drop-off snap to road nodes; two
///    shortest-travel-time legs, both departing from the request's clock.
/// 5. **Settle** — wait/idle/profit accrual, then the continuation draw:
///    the driver either relocates to the drop-off (available again after the
///    full wait) or retires from the grid.
///
/// Every passenger yields exactly one [`RideRecord`], delivered to the
/// observer in request order.
pub struct DispatchSim {
    context:    SimulationContext,
    config:     DispatchConfig,
    drivers:    Vec<Driver>,
    passengers: Vec<Passenger>,
    by_id:      FxHashMap<DriverId, usize>,
    rng:        SimRng,

    next_driver:    usize,
    next_passenger: usize,
    records:        Vec<RideRecord>,
    served:         usize,
    retired:        usize,
    anomalies:      usize,
    wait_sum:       f64,
    idle_sum:       f64,
    profit_sum:     f64,
    deadhead_sum:   f64,
}

impl DispatchSim {
    /// Validate the event streams and assemble a ready-to-run simulator.
    ///
    /// Both streams must already be time-ordered (ties allowed); the loop
    /// relies on that order and never sorts.
    pub fn new(
        context: SimulationContext,
        drivers: Vec<Driver>,
        passengers: Vec<Passenger>,
        config: DispatchConfig,
    ) -> SimResult<DispatchSim> {
        for (i, pair) in passengers.windows(2).enumerate() {
            if pair[1].requested_at < pair[0].requested_at {
                return Err(SimError::UnsortedPassengers { index: i + 1 });
            }
        }
        for (i, pair) in drivers.windows(2).enumerate() {
            if pair[1].available_at < pair[0].available_at {
                return Err(SimError::UnsortedDrivers { index: i + 1 });
            }
        }
        let mut by_id = FxHashMap::default();
        by_id.reserve(drivers.len());
        for (i, d) in drivers.iter().enumerate() {
            if by_id.insert(d.id, i).is_some() {
                return Err(SimError::DuplicateDriver(d.id));
            }
        }

        let rng = SimRng::new(config.seed);
        let record_capacity = passengers.len();
        Ok(DispatchSim {
            context,
            config,
            drivers,
            passengers,
            by_id,
            rng,
            next_driver:    0,
            next_passenger: 0,
            records:        Vec::with_capacity(record_capacity),
            served:         0,
            retired:        0,
            anomalies:      0,
            wait_sum:       0.0,
            idle_sum:       0.0,
            profit_sum:     0.0,
            deadhead_sum:   0.0,
        })
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Consume the passenger stream and return the final report.
    ///
    /// Calls observer hooks as it goes.  The stream is consumed exactly once;
    /// a second call finds nothing left and returns the same report.
    pub fn run<O: DispatchObserver>(&mut self, observer: &mut O) -> SimReport {
        while self.next_passenger < self.passengers.len() {
            let passenger = self.passengers[self.next_passenger];
            self.next_passenger += 1;

            // ── Phase 1: scheduled admission ──────────────────────────────
            self.admit_available(passenger.requested_at);

            // ── Phase 2: lookahead, or give up ────────────────────────────
            if self.context.grid.driver_count() == 0 {
                let admitted = self.admit_lookahead();
                if admitted > 0 {
                    log::info!(
                        "no active drivers at {}; admitting {admitted} upcoming early",
                        passenger.requested_at
                    );
                    observer.on_lookahead(passenger.id, admitted);
                }
                if self.context.grid.driver_count() == 0 {
                    let remaining = self.passengers.len() - self.next_passenger + 1;
                    log::warn!("driver supply exhausted; {remaining} passengers go unserved");
                    observer.on_exhausted(passenger.id, remaining);
                    self.fail_remaining(passenger, observer);
                    break;
                }
            }

            // ── Phases 3–5: search, route, settle ─────────────────────────
            let record = self.dispatch(passenger);
            observer.on_ride(&record);
            self.records.push(record);
        }

        let report = self.report();
        observer.on_finish(&report);
        report
    }

    /// Aggregate report over everything processed so far.
    pub fn report(&self) -> SimReport {
        SimReport {
            passengers:             self.passengers.len(),
            served:                 self.served,
            unserved:               self.records.len() - self.served,
            anomalies:              self.anomalies,
            drivers:                self.drivers.len(),
            retired:                self.retired,
            total_wait_minutes:     self.wait_sum,
            total_idle_minutes:     self.idle_sum,
            total_profit_minutes:   self.profit_sum,
            total_deadhead_minutes: self.deadhead_sum,
        }
    }

    /// One record per processed passenger, in request order.
    pub fn records(&self) -> &[RideRecord] {
        &self.records
    }

    /// Current driver states; positions and availability advance as rides
    /// complete.
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    // ── Admission ─────────────────────────────────────────────────────────────

    fn admit_available(&mut self, cutoff: Timestamp) {
        while let Some(d) = self.drivers.get(self.next_driver) {
            if d.available_at > cutoff {
                break;
            }
            self.context.grid.add_driver(d.id, d.pos, d.available_at);
            self.next_driver += 1;
        }
    }

    fn admit_lookahead(&mut self) -> usize {
        let queued = self.drivers.len() - self.next_driver;
        let batch = self.config.lookahead_batch.min(queued);
        for _ in 0..batch {
            let d = self.drivers[self.next_driver];
            self.context.grid.add_driver(d.id, d.pos, d.available_at);
            self.next_driver += 1;
        }
        batch
    }

    /// Record the current passenger and the whole remaining stream as
    /// unserved.
    fn fail_remaining<O: DispatchObserver>(&mut self, current: Passenger, observer: &mut O) {
        let mut pending = vec![current];
        while self.next_passenger < self.passengers.len() {
            pending.push(self.passengers[self.next_passenger]);
            self.next_passenger += 1;
        }
        for p in pending {
            let mut record = RideRecord::new(p.id, p.requested_at);
            record.state = MatchState::Failed;
            observer.on_ride(&record);
            self.records.push(record);
        }
    }

    // ── Matching ──────────────────────────────────────────────────────────────

    fn dispatch(&mut self, p: Passenger) -> RideRecord {
        let mut record = RideRecord::new(p.id, p.requested_at);

        record.state = MatchState::DriverSought;
        let Some((driver_id, eta)) = self.context.grid.closest_driver(p.pickup, p.requested_at)
        else {
            self.anomalies += 1;
            record.state = MatchState::Failed;
            record.anomaly = Some(Anomaly::NoUsableDriver);
            log::warn!(
                "passenger {}: {} drivers on the grid but none usable",
                p.id,
                self.context.grid.driver_count()
            );
            return record;
        };
        record.driver = Some(driver_id);
        record.state = MatchState::Matched;
        log::trace!("passenger {}: matched {driver_id}, grid eta {eta:.2} min", p.id);

        // Matched driver ids always come from this sim's own admissions.
        let didx = self.by_id[&driver_id];
        let (Some(driver_node), Some(pickup_node), Some(dropoff_node)) = (
            self.driver_node(didx),
            self.context.nodes.resolve(&p),
            self.context.nodes.nearest(p.dropoff).map(|(_, n)| n),
        ) else {
            return self.route_failed(record, Anomaly::PickupUnroutable);
        };

        let driver = self.drivers[didx];
        let time_to_available = driver.available_at.minutes_since(p.requested_at).max(0.0);

        let Some(time_to_pickup) =
            self.context.graph.shortest_travel_time(driver_node, pickup_node, p.requested_at)
        else {
            return self.route_failed(record, Anomaly::PickupUnroutable);
        };
        let depart_pickup = p.requested_at.advance_minutes(time_to_pickup);
        let Some(time_to_dropoff) =
            self.context.graph.shortest_travel_time(pickup_node, dropoff_node, depart_pickup)
        else {
            return self.route_failed(record, Anomaly::DropoffUnroutable);
        };

        let legs = RideLegs { time_to_available, time_to_pickup, time_to_dropoff };
        record.legs = Some(legs);
        record.state = MatchState::Routed;

        // ── Settlement ────────────────────────────────────────────────────
        let wait = legs.wait_minutes();
        self.wait_sum += wait;
        self.idle_sum += p.requested_at.minutes_since(driver.available_at).max(0.0);
        self.profit_sum += legs.profit_minutes();
        self.deadhead_sum += time_to_pickup;

        if self.rng.gen_bool(self.config.continue_probability) {
            let freed = p.requested_at.advance_minutes(wait);
            self.context.grid.move_driver_to(driver_id, driver.pos, p.dropoff, freed);
            let d = &mut self.drivers[didx];
            d.pos = p.dropoff;
            d.available_at = freed;
            d.node = Some(dropoff_node);
        } else {
            self.context.grid.remove_driver(driver_id, driver.pos);
            self.retired += 1;
            log::debug!("{driver_id} retires after serving passenger {}", p.id);
        }

        self.served += 1;
        record.state = MatchState::Completed;
        record
    }

    /// Nearest road node for a driver, resolved once and cached.
    fn driver_node(&mut self, didx: usize) -> Option<NodeId> {
        if let Some(node) = self.drivers[didx].node {
            return Some(node);
        }
        let node = self.context.nodes.resolve(&self.drivers[didx])?;
        self.drivers[didx].node = Some(node);
        Some(node)
    }

    fn route_failed(&mut self, mut record: RideRecord, anomaly: Anomaly) -> RideRecord {
        self.anomalies += 1;
        record.state = MatchState::Failed;
        record.anomaly = Some(anomaly);
        // The matched driver is left on the grid untouched; a later request
        // from a reachable pickup can still use them.
        log::warn!("passenger {}: {anomaly}", record.passenger);
        record
    }
}
