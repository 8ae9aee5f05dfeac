//! Instance data model for the electric vehicle routing problem.
//!
//! An [`Instance`] is the raw, pre-expansion view of one benchmark file pair:
//! one depot, the physical charging stations, the customers, and the
//! instance-wide [`VehicleParameters`]. Station duplication for multi-visit
//! modeling happens downstream and never copies these records.

use crate::{EvResult, EvrptwError};
use serde::{Deserialize, Serialize};

/// Role of a location in the routing problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// The single depot (route start and end)
    Depot,
    /// A physical charging station
    Station,
    /// A customer with demand and a time window
    Customer,
}

impl LocationKind {
    /// Parse the single-letter type tag used in instance files.
    pub fn from_tag(tag: &str) -> EvResult<Self> {
        match tag {
            "d" => Ok(LocationKind::Depot),
            "f" => Ok(LocationKind::Station),
            "c" => Ok(LocationKind::Customer),
            other => Err(EvrptwError::MalformedInstance(format!(
                "unknown location type tag '{other}'"
            ))),
        }
    }
}

/// One stop: depot, charging station, or customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier from the instance file (e.g. "C101", "S3")
    pub id: String,
    /// Location role
    pub kind: LocationKind,
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
    /// Cargo demand (0 for depot and stations)
    pub demand: i64,
    /// Earliest service start
    pub ready: i64,
    /// Latest service start
    pub due: i64,
    /// Fixed service duration (0 for depot and stations)
    pub service_time: i64,
}

impl Location {
    /// Euclidean distance to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Instance-wide vehicle constants from the parameter row of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    /// Battery capacity Q
    pub battery_capacity: f64,
    /// Cargo capacity C
    pub cargo_capacity: f64,
    /// Battery consumption rate h (battery units per distance unit)
    pub consumption_rate: f64,
    /// Recharging rate g (time units per battery unit recharged)
    pub recharge_rate: f64,
    /// Vehicle velocity v
    pub velocity: f64,
}

impl VehicleParameters {
    /// Check parameter ranges.
    ///
    /// Velocity must be strictly positive (travel times divide by it);
    /// capacities and rates must be non-negative.
    pub fn validate(&self) -> EvResult<()> {
        if self.velocity <= 0.0 {
            return Err(EvrptwError::InvalidParameter(format!(
                "velocity must be positive, got {}",
                self.velocity
            )));
        }
        if self.battery_capacity < 0.0 || self.cargo_capacity < 0.0 {
            return Err(EvrptwError::InvalidParameter(
                "capacities must be non-negative".into(),
            ));
        }
        if self.consumption_rate < 0.0 || self.recharge_rate < 0.0 {
            return Err(EvrptwError::InvalidParameter(
                "consumption and recharge rates must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// One raw problem instance: depot, physical stations, customers, vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance name (file stem, e.g. "c101C5")
    pub name: String,
    /// Vehicle constants
    pub vehicle: VehicleParameters,
    /// The single depot
    pub depot: Location,
    /// Physical charging stations, in file order
    pub stations: Vec<Location>,
    /// Customers, in file order
    pub customers: Vec<Location>,
}

impl Instance {
    /// Number of physical charging stations.
    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    /// Number of customers.
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }
}
