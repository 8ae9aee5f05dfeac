//! MILP models for the electric vehicle routing problem with time windows
//! (EVRPTW) and its battery-degradation (BD) cost variants.
//!
//! The crate is organized as a pipeline:
//!
//! - [`expand`]: dummy-station index expansion over a raw instance
//! - [`geometry`]: distance and travel-time matrices over expanded indices
//! - [`backend`]: the abstract MILP solver seam and its `good_lp` binding
//! - [`formulate`]: variable and constraint passes composing three variants
//! - [`solve`]: entry points producing [`evrptw_core::SolveReport`]s
//!
//! The three variants: minimum-distance EVRPTW, the BD extension whose
//! objective is the weighted state-of-charge threshold violations, and the
//! BD pricing of an externally fixed route.

pub mod backend;
pub mod expand;
pub mod formulate;
pub mod geometry;
pub mod solve;

pub use backend::{GoodLpBackend, MilpBackend};
pub use expand::ExpandedInstance;
pub use formulate::{BdParams, PRICE_LEVELS};
pub use geometry::Matrices;
pub use solve::{bd_cost_of_fixed_routes, solve_evrptw, solve_evrptw_bd, SolveConfig};

#[cfg(test)]
pub(crate) mod test_fixtures {
    use evrptw_core::{Instance, Location, LocationKind, VehicleParameters};

    fn location(id: &str, kind: LocationKind, x: i64, y: i64, demand: i64) -> Location {
        Location {
            id: id.to_owned(),
            kind,
            x,
            y,
            demand,
            ready: 0,
            due: 1000,
            service_time: 0,
        }
    }

    fn vehicle(battery_capacity: f64, cargo_capacity: f64) -> VehicleParameters {
        VehicleParameters {
            battery_capacity,
            cargo_capacity,
            consumption_rate: 1.0,
            recharge_rate: 1.0,
            velocity: 1.0,
        }
    }

    /// Generic instance with the requested station and customer counts,
    /// spread over distinct coordinates.
    pub(crate) fn instance_with(n_stations: usize, n_customers: usize) -> Instance {
        let stations = (0..n_stations)
            .map(|k| {
                location(
                    &format!("S{k}"),
                    LocationKind::Station,
                    10 + 15 * k as i64,
                    20,
                    0,
                )
            })
            .collect();
        let customers = (0..n_customers)
            .map(|k| {
                location(
                    &format!("C{k}"),
                    LocationKind::Customer,
                    5 + 7 * k as i64,
                    35 + 3 * k as i64,
                    10,
                )
            })
            .collect();
        Instance {
            name: "fixture".into(),
            vehicle: vehicle(1000.0, 200.0),
            depot: location("D0", LocationKind::Depot, 40, 50, 0),
            stations,
            customers,
        }
    }

    /// No stations; depot at the origin, customers at (0,10) and (0,20).
    pub(crate) fn two_customer_instance(
        demand_near: i64,
        demand_far: i64,
        cargo_capacity: f64,
    ) -> Instance {
        Instance {
            name: "two-customers".into(),
            vehicle: vehicle(1000.0, cargo_capacity),
            depot: location("D0", LocationKind::Depot, 0, 0, 0),
            stations: Vec::new(),
            customers: vec![
                location("C1", LocationKind::Customer, 0, 10, demand_near),
                location("C2", LocationKind::Customer, 0, 20, demand_far),
            ],
        }
    }

    /// Depot at the origin, one station at (0,5), one customer at (0,10).
    pub(crate) fn station_instance(battery_capacity: f64) -> Instance {
        Instance {
            name: "one-station".into(),
            vehicle: vehicle(battery_capacity, 100.0),
            depot: location("D0", LocationKind::Depot, 0, 0, 0),
            stations: vec![location("S1", LocationKind::Station, 0, 5, 0)],
            customers: vec![location("C1", LocationKind::Customer, 0, 10, 10)],
        }
    }
}
