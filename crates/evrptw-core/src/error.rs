//! Unified error types for the EVRPTW toolkit
//!
//! This module provides a common error type [`EvrptwError`] that can represent
//! errors from any part of the system. Domain-specific failures are converted
//! to `EvrptwError` for uniform handling at API boundaries.

use thiserror::Error;

/// Unified error type for all EVRPTW operations.
///
/// Instance-level failures ([`EvrptwError::MalformedInstance`],
/// [`EvrptwError::InvalidParameter`], [`EvrptwError::Infeasible`]) abort only
/// the instance being processed; [`EvrptwError::SolverUnavailable`] aborts
/// the whole run.
#[derive(Error, Debug)]
pub enum EvrptwError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparseable or structurally incomplete instance data
    #[error("Malformed instance: {0}")]
    MalformedInstance(String),

    /// Out-of-range vehicle or model parameters (non-positive velocity,
    /// negative capacities)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The solver backend could not be initialized
    #[error("Solver unavailable: {0}")]
    SolverUnavailable(String),

    /// No feasible solution was found within the limit
    #[error("No feasible solution: {0}")]
    Infeasible(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using EvrptwError.
pub type EvResult<T> = Result<T, EvrptwError>;

impl From<anyhow::Error> for EvrptwError {
    fn from(err: anyhow::Error) -> Self {
        EvrptwError::Other(err.to_string())
    }
}

impl From<String> for EvrptwError {
    fn from(s: String) -> Self {
        EvrptwError::Other(s)
    }
}

impl From<&str> for EvrptwError {
    fn from(s: &str) -> Self {
        EvrptwError::Other(s.to_string())
    }
}
