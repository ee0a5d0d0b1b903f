//! Driver and passenger records.
//!
//! Both are plain event-stream rows: a driver announces where and when it
//! starts offering rides, a passenger announces a pickup and a drop-off.
//! The dispatch loop owns the only mutable copies and updates drivers in
//! place as rides complete.

use rd_core::{DriverId, GeoPoint, NodeId, PassengerId, SpatialEntity, Timestamp};

/// One driver in the roster.
///
/// `pos` and `available_at` advance with every completed ride; `node` is the
/// nearest-road-node cache, filled the first time the driver is routed and
/// kept current from ride drop-offs afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Driver {
    pub id:           DriverId,
    pub available_at: Timestamp,
    pub pos:          GeoPoint,
    pub node:         Option<NodeId>,
}

impl Driver {
    pub fn new(id: DriverId, available_at: Timestamp, pos: GeoPoint) -> Driver {
        Driver { id, available_at, pos, node: None }
    }
}

impl SpatialEntity for Driver {
    type Id = DriverId;

    fn identity(&self) -> DriverId {
        self.id
    }

    fn coordinates(&self) -> GeoPoint {
        self.pos
    }
}

/// One ride request.
///
/// Pickup and drop-off nodes are resolved at dispatch time, not load time, so
/// unmatched passengers never pay for index queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Passenger {
    pub id:           PassengerId,
    pub requested_at: Timestamp,
    pub pickup:       GeoPoint,
    pub dropoff:      GeoPoint,
}

impl Passenger {
    pub fn new(
        id: PassengerId,
        requested_at: Timestamp,
        pickup: GeoPoint,
        dropoff: GeoPoint,
    ) -> Passenger {
        Passenger { id, requested_at, pickup, dropoff }
    }
}

/// A passenger's index position is its pickup; the drop-off is resolved
/// directly against the node index when a ride is routed.
impl SpatialEntity for Passenger {
    type Id = PassengerId;

    fn identity(&self) -> PassengerId {
        self.id
    }

    fn coordinates(&self) -> GeoPoint {
        self.pickup
    }
}
