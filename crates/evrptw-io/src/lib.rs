//! # evrptw-io: Instance and Result File IO
//!
//! Reads EVRPTW benchmark instance file pairs, persisted arc-traversal
//! assignments, and writes per-instance result files.

pub mod arcs;
pub mod instance;
pub mod report;

pub use arcs::read_arc_matrix;
pub use instance::{load_instance, read_locations, read_vehicle};
pub use report::write_report;
