//! Abstract MILP solver backend.
//!
//! The model formulator emits variables, linear constraints and an objective
//! against [`MilpBackend`]; the optimization algorithm itself lives behind
//! this seam. [`GoodLpBackend`] is the provided implementation, buffering the
//! emitted model and materializing it as a `good_lp` problem on
//! [`MilpBackend::optimize`].

use evrptw_core::{EvResult, SolveStatus};
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel};
use tracing::{debug, warn};

/// Handle to one emitted decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Continuous within its bounds
    Continuous,
    /// Binary 0/1
    Binary,
}

/// Comparison direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Leq,
    Geq,
    Eq,
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

/// Solver backend interface consumed by the model formulator.
///
/// One backend instance holds exactly one model for one solve invocation;
/// dropping it releases all solver resources on every exit path.
pub trait MilpBackend {
    /// Create a bounded variable. The name is carried through to reporting.
    fn add_variable(&mut self, name: String, lower: f64, upper: f64, kind: VariableKind) -> VarId;

    /// Add `Σ coef·var  <relation>  rhs`.
    fn add_constraint(&mut self, terms: &[(VarId, f64)], relation: Relation, rhs: f64);

    /// Set the linear objective.
    fn set_objective(&mut self, terms: &[(VarId, f64)], sense: ObjectiveSense);

    /// Run the solver. Non-optimal outcomes are statuses, not errors;
    /// `Err` is reserved for backend-level failures.
    fn optimize(&mut self, time_limit_secs: f64) -> EvResult<SolveStatus>;

    /// Value of a variable in the incumbent assignment
    /// (0.0 before a successful optimize).
    fn value(&self, var: VarId) -> f64;

    /// Objective value of the incumbent assignment.
    fn objective_value(&self) -> f64;

    /// Names of all emitted variables, in creation order.
    fn variable_names(&self) -> &[String];
}

#[derive(Debug, Clone)]
struct VarSpec {
    name: String,
    lower: f64,
    upper: f64,
    kind: VariableKind,
}

/// [`MilpBackend`] implementation on top of `good_lp` with the pure-Rust
/// `microlp` solver.
///
/// `microlp` exposes no time-limit parameter; the configured limit is
/// recorded for reporting but the solve runs to completion. The status
/// mapping still distinguishes infeasibility from other failures.
#[derive(Debug, Default)]
pub struct GoodLpBackend {
    vars: Vec<VarSpec>,
    names: Vec<String>,
    constraints: Vec<(Vec<(VarId, f64)>, Relation, f64)>,
    objective: Vec<(VarId, f64)>,
    sense: Option<ObjectiveSense>,
    values: Vec<f64>,
}

impl GoodLpBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Name/value pairs of the incumbent assignment, in creation order.
    /// Empty before a successful optimize.
    pub fn assignment(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl MilpBackend for GoodLpBackend {
    fn add_variable(&mut self, name: String, lower: f64, upper: f64, kind: VariableKind) -> VarId {
        let id = VarId(self.vars.len());
        self.names.push(name.clone());
        self.vars.push(VarSpec {
            name,
            lower,
            upper,
            kind,
        });
        id
    }

    fn add_constraint(&mut self, terms: &[(VarId, f64)], relation: Relation, rhs: f64) {
        self.constraints.push((terms.to_vec(), relation, rhs));
    }

    fn set_objective(&mut self, terms: &[(VarId, f64)], sense: ObjectiveSense) {
        self.objective = terms.to_vec();
        self.sense = Some(sense);
    }

    fn optimize(&mut self, time_limit_secs: f64) -> EvResult<SolveStatus> {
        debug!(
            variables = self.vars.len(),
            constraints = self.constraints.len(),
            time_limit_secs,
            "materializing model"
        );

        let mut problem = variables!();
        let mut handles = Vec::with_capacity(self.vars.len());
        for spec in &self.vars {
            let definition = match spec.kind {
                VariableKind::Continuous => variable().min(spec.lower).max(spec.upper),
                VariableKind::Binary => variable().binary(),
            };
            handles.push(problem.add(definition.name(spec.name.clone())));
        }

        let mut objective = Expression::from(0.0);
        for (var, coef) in &self.objective {
            objective += *coef * handles[var.index()];
        }
        let unsolved = match self.sense.unwrap_or(ObjectiveSense::Minimize) {
            ObjectiveSense::Minimize => problem.minimise(objective),
            ObjectiveSense::Maximize => problem.maximise(objective),
        };

        let mut model = unsolved.using(good_lp::default_solver);
        for (terms, relation, rhs) in &self.constraints {
            let mut lhs = Expression::from(0.0);
            for (var, coef) in terms {
                lhs += *coef * handles[var.index()];
            }
            let c = match relation {
                Relation::Leq => constraint!(lhs <= *rhs),
                Relation::Geq => constraint!(lhs >= *rhs),
                Relation::Eq => constraint!(lhs == *rhs),
            };
            model = model.with(c);
        }

        match model.solve() {
            Ok(solution) => {
                self.values = handles.iter().map(|h| solution.value(*h)).collect();
                Ok(SolveStatus::Optimal)
            }
            Err(ResolutionError::Infeasible) => Ok(SolveStatus::Infeasible),
            Err(err) => {
                warn!(error = %err, "solver returned a non-result");
                Ok(SolveStatus::Other)
            }
        }
    }

    fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    fn objective_value(&self) -> f64 {
        self.objective
            .iter()
            .map(|(var, coef)| coef * self.value(*var))
            .sum()
    }

    fn variable_names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_milp() {
        // min 3a + 2b  s.t.  a + b >= 1,  a,b binary  =>  b = 1, objective 2
        let mut backend = GoodLpBackend::new();
        let a = backend.add_variable("a".into(), 0.0, 1.0, VariableKind::Binary);
        let b = backend.add_variable("b".into(), 0.0, 1.0, VariableKind::Binary);
        backend.add_constraint(&[(a, 1.0), (b, 1.0)], Relation::Geq, 1.0);
        backend.set_objective(&[(a, 3.0), (b, 2.0)], ObjectiveSense::Minimize);

        let status = backend.optimize(10.0).unwrap();
        assert_eq!(status, SolveStatus::Optimal);
        assert!((backend.value(a) - 0.0).abs() < 1e-6);
        assert!((backend.value(b) - 1.0).abs() < 1e-6);
        assert!((backend.objective_value() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_is_status_not_error() {
        let mut backend = GoodLpBackend::new();
        let x = backend.add_variable("x".into(), 0.0, 1.0, VariableKind::Continuous);
        backend.add_constraint(&[(x, 1.0)], Relation::Geq, 2.0);
        backend.set_objective(&[(x, 1.0)], ObjectiveSense::Minimize);

        let status = backend.optimize(10.0).unwrap();
        assert_eq!(status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_continuous_bounds_respected() {
        let mut backend = GoodLpBackend::new();
        let x = backend.add_variable("x".into(), 2.5, 7.0, VariableKind::Continuous);
        backend.set_objective(&[(x, 1.0)], ObjectiveSense::Minimize);

        let status = backend.optimize(10.0).unwrap();
        assert_eq!(status, SolveStatus::Optimal);
        assert!((backend.value(x) - 2.5).abs() < 1e-6);
    }
}
