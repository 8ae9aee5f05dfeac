//! # evrptw-core: EVRPTW Data Model Core
//!
//! Shared data structures and error types for the Electric Vehicle Routing
//! Problem with Time Windows (EVRPTW) MILP toolkit.
//!
//! The raw instance model lives here ([`Instance`], [`Location`],
//! [`VehicleParameters`]); instance loading is in `evrptw-io` and model
//! construction in `evrptw-milp`.

pub mod error;
pub mod model;
pub mod solution;

pub use error::{EvResult, EvrptwError};
pub use model::{Instance, Location, LocationKind, VehicleParameters};
pub use solution::{ArcMatrix, SolveReport, SolveStatus};
