//! Solve status and report types shared between the model layer and IO.

use serde::{Deserialize, Serialize};

/// Outcome of one solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Time limit reached with a feasible incumbent.
    TimeLimitReached,
    /// Problem is infeasible.
    Infeasible,
    /// Unbounded, numerical trouble, or any other non-result.
    Other,
}

impl SolveStatus {
    /// Whether the solve produced an assignment worth reporting.
    ///
    /// A time-limited solve with an incumbent is reported with the
    /// best-found objective; only infeasible/unsolved runs are dropped.
    pub fn is_usable(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::TimeLimitReached)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::TimeLimitReached => write!(f, "time_limit_reached"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Other => write!(f, "other"),
        }
    }
}

/// Result of one solved model: status, objective, wall time, and the
/// nonzero variable assignment by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// Final solver status
    pub status: SolveStatus,
    /// Objective value of the reported assignment
    pub objective: f64,
    /// Wall-clock time of the whole solve call in milliseconds
    pub runtime_ms: u128,
    /// Nonzero variable values, in creation order
    pub variables: Vec<(String, f64)>,
}

impl SolveReport {
    /// Look up a variable value by name (None if zero or absent).
    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// A previously computed route given as a fixed 0/1 arc matrix over the
/// expanded location indices. Treated as data, not as decision variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcMatrix {
    size: usize,
    used: Vec<bool>,
}

impl ArcMatrix {
    /// Create an all-zero matrix over `size` expanded locations
    /// (customers + dummies + both depot copies).
    pub fn new(size: usize) -> Self {
        Self {
            size,
            used: vec![false; size * size],
        }
    }

    /// Matrix dimension (number of expanded locations).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether arc (i, j) is part of the route.
    pub fn used(&self, i: usize, j: usize) -> bool {
        self.used[i * self.size + j]
    }

    /// Mark arc (i, j) as used.
    pub fn set(&mut self, i: usize, j: usize) {
        self.used[i * self.size + j] = true;
    }

    /// Iterate over all used arcs.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |i| {
            (0..self.size)
                .filter(move |&j| self.used(i, j))
                .map(move |j| (i, j))
        })
    }
}
