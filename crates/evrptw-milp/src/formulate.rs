//! MILP formulation of EVRPTW and its battery-degradation variants.
//!
//! Three closely related models are produced from one set of
//! constraint-emission passes over a shared [`ModelBuilder`]:
//!
//! 1. [`build_base_model`]: minimum-distance EVRPTW with binary arc
//!    variables.
//! 2. [`build_bd_model`]: the base model augmented with battery-degradation
//!    (BD) bookkeeping; the objective is the weighted sum of
//!    state-of-charge threshold violations only.
//! 3. [`build_fixed_bd_model`]: the continuous sub-model for a fixed,
//!    previously computed route; arc values enter the big-M terms as
//!    constants and no routing variables exist.
//!
//! Arc coefficients flow through [`ArcValue`], so every big-M constraint is
//! written once and works for both decision-variable arcs and fixed arcs.

use crate::backend::{MilpBackend, ObjectiveSense, Relation, VarId, VariableKind};
use crate::expand::ExpandedInstance;
use crate::geometry::Matrices;
use evrptw_core::{ArcMatrix, EvResult, EvrptwError};
use serde::{Deserialize, Serialize};

/// Battery-degradation cost parameters.
///
/// The comfortable state-of-charge band is `[lower_fraction, upper_fraction]`
/// of battery capacity; charge held below/above it is penalized linearly at
/// `price_low` / `price_high` per unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BdParams {
    /// Lower band threshold LB, as a fraction of Q
    pub lower_fraction: f64,
    /// Upper band threshold UB, as a fraction of Q
    pub upper_fraction: f64,
    /// Penalty WL per unit of charge below LB
    pub price_low: f64,
    /// Penalty WH per unit of charge above UB
    pub price_high: f64,
}

/// The (WL, WH) price pairs studied in the reference experiments.
pub const PRICE_LEVELS: [(f64, f64); 3] = [(0.1, 0.2), (0.5, 1.0), (2.5, 5.0)];

impl Default for BdParams {
    fn default() -> Self {
        Self {
            lower_fraction: 0.25,
            upper_fraction: 0.85,
            price_low: PRICE_LEVELS[0].0,
            price_high: PRICE_LEVELS[0].1,
        }
    }
}

impl BdParams {
    /// Select one of the predefined [`PRICE_LEVELS`].
    pub fn with_price_level(mut self, level: usize) -> EvResult<Self> {
        let (wl, wh) = PRICE_LEVELS.get(level).ok_or_else(|| {
            EvrptwError::InvalidParameter(format!(
                "price level {level} out of range 0..{}",
                PRICE_LEVELS.len()
            ))
        })?;
        self.price_low = *wl;
        self.price_high = *wh;
        Ok(self)
    }

    fn validate(&self) -> EvResult<()> {
        if !(0.0..=1.0).contains(&self.lower_fraction)
            || !(0.0..=1.0).contains(&self.upper_fraction)
            || self.lower_fraction > self.upper_fraction
        {
            return Err(EvrptwError::InvalidParameter(format!(
                "thresholds must satisfy 0 <= LB <= UB <= 1, got LB={} UB={}",
                self.lower_fraction, self.upper_fraction
            )));
        }
        Ok(())
    }
}

/// An arc coefficient source: a binary decision variable in the routing
/// variants, a fixed 0/1 constant in the fixed-route variant.
#[derive(Debug, Clone, Copy)]
pub enum ArcValue {
    Var(VarId),
    Fixed(f64),
}

/// Arc values over the expanded index grid, present for tail `i` in `0..=n`
/// and head `j` in `1..=n+1` with `i != j`.
#[derive(Debug, Clone)]
pub struct ArcVars {
    size: usize,
    arcs: Vec<Option<ArcValue>>,
}

impl ArcVars {
    fn empty(size: usize) -> Self {
        Self {
            size,
            arcs: vec![None; size * size],
        }
    }

    fn put(&mut self, i: usize, j: usize, value: ArcValue) {
        self.arcs[i * self.size + j] = Some(value);
    }

    /// Arc value for (i, j).
    ///
    /// # Panics
    /// Panics for pairs outside the emitted grid (diagonal, arcs into the
    /// start depot, arcs out of the end depot).
    pub fn at(&self, i: usize, j: usize) -> ArcValue {
        self.arcs[i * self.size + j].unwrap_or_else(|| panic!("no arc ({i},{j}) in model"))
    }
}

/// Continuous per-node variables shared by all variants.
#[derive(Debug, Clone)]
pub struct ScheduleVars {
    /// `tau,i`: arrival time, bounded by location i's own time window
    pub arrival: Vec<VarId>,
    /// `u,i`: cargo on arrival, in [0, C]
    pub cargo: Vec<VarId>,
    /// `y,i`: battery on arrival, in [0, Q]
    pub battery_arrival: Vec<VarId>,
    /// `Y,i`: battery on departure after recharging, for i in 0..=n_dummies
    pub battery_departure: Vec<VarId>,
}

/// Battery-degradation threshold variables.
#[derive(Debug, Clone)]
pub struct BdVars {
    /// `zL,i`: charge below LB on arrival at station dummy i (index i-1)
    pub below_lb: Vec<VarId>,
    /// `zH,i`: charge above UB on departure from station dummy i (index i-1)
    pub above_ub: Vec<VarId>,
    /// `zH,0,i`: above-UB excess on the depot -> i leg (index i-1)
    pub from_depot: Vec<VarId>,
    /// `zL,i,n+1`: below-LB deficit on the i -> depot leg (index i-1)
    pub to_depot: Vec<VarId>,
}

/// Linear expression accumulator. Constants are folded into the
/// right-hand side at emission.
#[derive(Debug, Clone, Default)]
struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    fn new() -> Self {
        Self::default()
    }

    fn term(&mut self, coef: f64, var: VarId) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    fn arc(&mut self, coef: f64, arc: ArcValue) -> &mut Self {
        match arc {
            ArcValue::Var(v) => self.terms.push((v, coef)),
            ArcValue::Fixed(x) => self.constant += coef * x,
        }
        self
    }

    fn plus(&mut self, c: f64) -> &mut Self {
        self.constant += c;
        self
    }
}

/// Shared model-building context: one backend, one expanded instance, one
/// matrix set. Each variant is a sequence of passes over this context.
pub struct ModelBuilder<'a, B: MilpBackend> {
    backend: &'a mut B,
    exp: &'a ExpandedInstance<'a>,
    mat: &'a Matrices,
}

impl<'a, B: MilpBackend> ModelBuilder<'a, B> {
    pub fn new(backend: &'a mut B, exp: &'a ExpandedInstance<'a>, mat: &'a Matrices) -> Self {
        Self { backend, exp, mat }
    }

    fn n(&self) -> usize {
        self.exp.n()
    }

    fn n_dummies(&self) -> usize {
        self.exp.n_dummies()
    }

    fn vehicle(&self) -> &evrptw_core::VehicleParameters {
        &self.exp.instance().vehicle
    }

    /// Emit `expr <relation> rhs`, folding the expression constant into the
    /// right-hand side.
    fn constrain(&mut self, expr: LinExpr, relation: Relation, rhs: f64) {
        self.backend
            .add_constraint(&expr.terms, relation, rhs - expr.constant);
    }

    /// Battery level when leaving node i: post-recharge departure level for
    /// the depot and station dummies, arrival level otherwise.
    fn battery_departed(&self, sched: &ScheduleVars, i: usize) -> VarId {
        if i <= self.n_dummies() {
            sched.battery_departure[i]
        } else {
            sched.battery_arrival[i]
        }
    }

    // === Variable passes ===

    /// Binary arc variables `x,i,j` for tails 0..=n and heads 1..=n+1.
    pub fn routing_variables(&mut self) -> ArcVars {
        let n = self.n();
        let mut arcs = ArcVars::empty(n + 2);
        for i in 0..=n {
            for j in 1..=n + 1 {
                if i == j {
                    continue;
                }
                let var = self.backend.add_variable(
                    format!("x,{i},{j}"),
                    0.0,
                    1.0,
                    VariableKind::Binary,
                );
                arcs.put(i, j, ArcValue::Var(var));
            }
        }
        arcs
    }

    /// Fixed arc values from a previously computed route.
    pub fn fixed_routing(&mut self, matrix: &ArcMatrix) -> EvResult<ArcVars> {
        let n = self.n();
        if matrix.size() != n + 2 {
            return Err(EvrptwError::MalformedInstance(format!(
                "arc matrix covers {} locations, instance expands to {}",
                matrix.size(),
                n + 2
            )));
        }
        let mut arcs = ArcVars::empty(n + 2);
        for i in 0..=n {
            for j in 1..=n + 1 {
                if i == j {
                    continue;
                }
                let value = if matrix.used(i, j) { 1.0 } else { 0.0 };
                arcs.put(i, j, ArcValue::Fixed(value));
            }
        }
        Ok(arcs)
    }

    /// Arrival time, cargo and battery variables for every expanded node.
    pub fn schedule_variables(&mut self) -> ScheduleVars {
        let n = self.n();
        let q = self.vehicle().battery_capacity;
        let c = self.vehicle().cargo_capacity;

        let mut vars = ScheduleVars {
            arrival: Vec::with_capacity(n + 2),
            cargo: Vec::with_capacity(n + 2),
            battery_arrival: Vec::with_capacity(n + 2),
            battery_departure: Vec::with_capacity(self.n_dummies() + 1),
        };
        for i in 0..=n + 1 {
            let loc = self.exp.location(i);
            vars.arrival.push(self.backend.add_variable(
                format!("tau,{i}"),
                loc.ready as f64,
                loc.due as f64,
                VariableKind::Continuous,
            ));
            vars.cargo.push(self.backend.add_variable(
                format!("u,{i}"),
                0.0,
                c,
                VariableKind::Continuous,
            ));
            vars.battery_arrival.push(self.backend.add_variable(
                format!("y,{i}"),
                0.0,
                q,
                VariableKind::Continuous,
            ));
            if i <= self.n_dummies() {
                vars.battery_departure.push(self.backend.add_variable(
                    format!("Y,{i}"),
                    0.0,
                    q,
                    VariableKind::Continuous,
                ));
            }
        }
        vars
    }

    /// Threshold-violation variables for the BD variants.
    pub fn bd_variables(&mut self, bd: &BdParams) -> BdVars {
        let n = self.n();
        let q = self.vehicle().battery_capacity;
        let below_cap = bd.lower_fraction * q;
        let above_cap = (1.0 - bd.upper_fraction) * q;

        let mut vars = BdVars {
            below_lb: Vec::with_capacity(self.n_dummies()),
            above_ub: Vec::with_capacity(self.n_dummies()),
            from_depot: Vec::with_capacity(n),
            to_depot: Vec::with_capacity(n),
        };
        for i in 1..=n {
            vars.from_depot.push(self.backend.add_variable(
                format!("zH,0,{i}"),
                0.0,
                above_cap,
                VariableKind::Continuous,
            ));
            vars.to_depot.push(self.backend.add_variable(
                format!("zL,{i},{}", n + 1),
                0.0,
                below_cap,
                VariableKind::Continuous,
            ));
        }
        for i in 1..=self.n_dummies() {
            vars.below_lb.push(self.backend.add_variable(
                format!("zL,{i}"),
                0.0,
                below_cap,
                VariableKind::Continuous,
            ));
            vars.above_ub.push(self.backend.add_variable(
                format!("zH,{i}"),
                0.0,
                above_cap,
                VariableKind::Continuous,
            ));
        }
        vars
    }

    // === Constraint passes ===

    /// Every customer is left exactly once.
    pub fn customer_connectivity(&mut self, arcs: &ArcVars) {
        let n = self.n();
        for i in self.n_dummies() + 1..=n {
            let mut expr = LinExpr::new();
            for j in 1..=n + 1 {
                if i != j {
                    expr.arc(1.0, arcs.at(i, j));
                }
            }
            self.constrain(expr, Relation::Eq, 1.0);
        }
    }

    /// Every station dummy is left at most once (it may be skipped).
    pub fn station_connectivity(&mut self, arcs: &ArcVars) {
        let n = self.n();
        for i in 1..=self.n_dummies() {
            let mut expr = LinExpr::new();
            for j in 1..=n + 1 {
                if i != j {
                    expr.arc(1.0, arcs.at(i, j));
                }
            }
            self.constrain(expr, Relation::Leq, 1.0);
        }
    }

    /// Inflow equals outflow at every non-depot node.
    pub fn flow_conservation(&mut self, arcs: &ArcVars) {
        let n = self.n();
        for j in 1..=n {
            let mut expr = LinExpr::new();
            for i in 0..=n {
                if i != j {
                    expr.arc(1.0, arcs.at(i, j));
                }
            }
            for i in 1..=n + 1 {
                if i != j {
                    expr.arc(-1.0, arcs.at(j, i));
                }
            }
            self.constrain(expr, Relation::Eq, 0.0);
        }
    }

    /// Arrival-time propagation along used arcs, linearized with the depot
    /// due time as big-M. Station dummies spend recharge time
    /// `g * (Y_i - y_i)` instead of a fixed service time, with an extra
    /// `g * Q` big-M term so the constraint stays vacuous on unused arcs.
    pub fn time_feasibility(&mut self, arcs: &ArcVars, sched: &ScheduleVars) {
        let n = self.n();
        let due0 = self.exp.depot_due();
        let g = self.vehicle().recharge_rate;
        let q = self.vehicle().battery_capacity;

        for j in 1..=n + 1 {
            for i in 0..=n {
                if i == j {
                    continue;
                }
                let travel = self.mat.travel_time(i, j);
                let mut expr = LinExpr::new();
                expr.term(1.0, sched.arrival[i]).plus(-due0);
                if self.exp.is_station_dummy(i) {
                    expr.arc(travel + due0 + g * q, arcs.at(i, j))
                        .term(g, sched.battery_departure[i])
                        .term(-g, sched.battery_arrival[i])
                        .plus(-g * q);
                } else {
                    let service = self.exp.location(i).service_time as f64;
                    expr.arc(travel + due0 + service, arcs.at(i, j));
                }
                expr.term(-1.0, sched.arrival[j]);
                self.constrain(expr, Relation::Leq, 0.0);
            }
        }
    }

    /// Cargo depletion along used arcs, big-M = cargo capacity.
    pub fn demand_satisfaction(&mut self, arcs: &ArcVars, sched: &ScheduleVars) {
        let n = self.n();
        let c = self.vehicle().cargo_capacity;
        for i in 0..=n {
            let demand = self.exp.location(i).demand as f64;
            for j in 1..=n + 1 {
                if i == j {
                    continue;
                }
                let mut expr = LinExpr::new();
                expr.term(1.0, sched.cargo[i])
                    .arc(-(demand + c), arcs.at(i, j))
                    .plus(c)
                    .term(-1.0, sched.cargo[j]);
                self.constrain(expr, Relation::Geq, 0.0);
            }
        }
    }

    /// Battery depletion along used arcs, big-M = battery capacity. The
    /// departing level is the post-recharge one for the depot and station
    /// dummies.
    pub fn battery_consistency(&mut self, arcs: &ArcVars, sched: &ScheduleVars) {
        let n = self.n();
        let q = self.vehicle().battery_capacity;
        let h = self.vehicle().consumption_rate;
        for j in 1..=n + 1 {
            for i in 0..=n {
                if i == j {
                    continue;
                }
                let mut expr = LinExpr::new();
                expr.term(1.0, self.battery_departed(sched, i))
                    .arc(-(h * self.mat.distance(i, j) + q), arcs.at(i, j))
                    .plus(q)
                    .term(-1.0, sched.battery_arrival[j]);
                self.constrain(expr, Relation::Geq, 0.0);
            }
        }
    }

    /// Recharging never decreases charge: `y_i <= Y_i` for the depot and
    /// every station dummy.
    pub fn recharge_monotonicity(&mut self, sched: &ScheduleVars) {
        for i in 0..=self.n_dummies() {
            let mut expr = LinExpr::new();
            expr.term(1.0, sched.battery_arrival[i])
                .term(-1.0, sched.battery_departure[i]);
            self.constrain(expr, Relation::Leq, 0.0);
        }
    }

    /// Threshold bookkeeping for the BD variants.
    ///
    /// Per node i, sandwich bounds tie `zH,0,i` to the above-UB excess on
    /// the depot -> i leg and `zL,i,n+1` to the below-LB deficit on the
    /// i -> depot leg, each switched by the corresponding depot-adjacent arc
    /// (big-M = Q). Both directions of the `zL,i,n+1` sandwich subtract the
    /// battery level actually departed from i (post-recharge for dummies).
    /// Per station dummy, `zL,i` and `zH,i` bound the violation on arrival
    /// and departure.
    pub fn bd_threshold_bounds(
        &mut self,
        arcs: &ArcVars,
        sched: &ScheduleVars,
        bd_vars: &BdVars,
        bd: &BdParams,
    ) {
        let n = self.n();
        let q = self.vehicle().battery_capacity;
        let lb_q = bd.lower_fraction * q;
        let ub_q = bd.upper_fraction * q;

        for i in 1..=n {
            let d_from = self.mat.distance(0, i);
            let d_to = self.mat.distance(i, n + 1);
            let departed = self.battery_departed(sched, i);

            // zH,0,i >= y_i + d_0i - UB*Q - Q + Q*x_0i
            let mut lower = LinExpr::new();
            lower
                .term(1.0, bd_vars.from_depot[i - 1])
                .term(-1.0, sched.battery_arrival[i])
                .arc(-q, arcs.at(0, i))
                .plus(-(d_from - ub_q - q));
            self.constrain(lower, Relation::Geq, 0.0);

            // zH,0,i <= y_i + d_0i - UB*Q + Q - Q*x_0i
            let mut upper = LinExpr::new();
            upper
                .term(1.0, bd_vars.from_depot[i - 1])
                .term(-1.0, sched.battery_arrival[i])
                .arc(q, arcs.at(0, i))
                .plus(-(d_from - ub_q + q));
            self.constrain(upper, Relation::Leq, 0.0);

            // zL,i,n+1 >= LB*Q + d_i,n+1 - departed(i) - Q + Q*x_i,n+1
            let mut lower = LinExpr::new();
            lower
                .term(1.0, bd_vars.to_depot[i - 1])
                .term(1.0, departed)
                .arc(-q, arcs.at(i, n + 1))
                .plus(-(lb_q + d_to - q));
            self.constrain(lower, Relation::Geq, 0.0);

            // zL,i,n+1 <= LB*Q + d_i,n+1 - departed(i) + Q - Q*x_i,n+1
            let mut upper = LinExpr::new();
            upper
                .term(1.0, bd_vars.to_depot[i - 1])
                .term(1.0, departed)
                .arc(q, arcs.at(i, n + 1))
                .plus(-(lb_q + d_to + q));
            self.constrain(upper, Relation::Leq, 0.0);
        }

        for i in 1..=self.n_dummies() {
            // zL,i >= LB*Q - y_i
            let mut below = LinExpr::new();
            below
                .term(1.0, bd_vars.below_lb[i - 1])
                .term(1.0, sched.battery_arrival[i]);
            self.constrain(below, Relation::Geq, lb_q);

            // zH,i >= Y_i - UB*Q
            let mut above = LinExpr::new();
            above
                .term(1.0, bd_vars.above_ub[i - 1])
                .term(-1.0, sched.battery_departure[i]);
            self.constrain(above, Relation::Geq, -ub_q);
        }
    }

    // === Objective passes ===

    /// Minimize total traveled distance.
    pub fn distance_objective(&mut self, arcs: &ArcVars) {
        let n = self.n();
        let mut terms = Vec::new();
        for i in 0..=n {
            for j in 1..=n + 1 {
                if i == j {
                    continue;
                }
                if let ArcValue::Var(var) = arcs.at(i, j) {
                    terms.push((var, self.mat.distance(i, j)));
                }
            }
        }
        self.backend.set_objective(&terms, ObjectiveSense::Minimize);
    }

    /// Minimize the weighted threshold violations over all station visits
    /// and both depot-adjacent legs.
    pub fn bd_objective(&mut self, bd_vars: &BdVars, bd: &BdParams) {
        let mut terms = Vec::new();
        for (below, above) in bd_vars.below_lb.iter().zip(&bd_vars.above_ub) {
            terms.push((*below, bd.price_low));
            terms.push((*above, bd.price_high));
        }
        for (to_depot, from_depot) in bd_vars.to_depot.iter().zip(&bd_vars.from_depot) {
            terms.push((*to_depot, bd.price_low));
            terms.push((*from_depot, bd.price_high));
        }
        self.backend.set_objective(&terms, ObjectiveSense::Minimize);
    }
}

/// Variables of a fully built base model.
pub struct BaseModel {
    pub arcs: ArcVars,
    pub schedule: ScheduleVars,
}

/// Build the base EVRPTW model: routing and schedule variables, all
/// feasibility constraints, minimum-distance objective.
pub fn build_base_model<B: MilpBackend>(
    backend: &mut B,
    exp: &ExpandedInstance<'_>,
    mat: &Matrices,
) -> BaseModel {
    let mut builder = ModelBuilder::new(backend, exp, mat);
    let arcs = builder.routing_variables();
    let schedule = builder.schedule_variables();
    builder.customer_connectivity(&arcs);
    builder.station_connectivity(&arcs);
    builder.flow_conservation(&arcs);
    builder.time_feasibility(&arcs, &schedule);
    builder.demand_satisfaction(&arcs, &schedule);
    builder.battery_consistency(&arcs, &schedule);
    builder.recharge_monotonicity(&schedule);
    builder.distance_objective(&arcs);
    BaseModel { arcs, schedule }
}

/// Build the BD-extended model: every base constraint plus threshold
/// bookkeeping; the objective is the weighted BD penalty alone, so the
/// battery trajectory is reoptimized for degradation rather than distance.
pub fn build_bd_model<B: MilpBackend>(
    backend: &mut B,
    exp: &ExpandedInstance<'_>,
    mat: &Matrices,
    bd: &BdParams,
) -> EvResult<(BaseModel, BdVars)> {
    bd.validate()?;
    let base = build_base_model(backend, exp, mat);
    let mut builder = ModelBuilder::new(backend, exp, mat);
    let bd_vars = builder.bd_variables(bd);
    builder.bd_threshold_bounds(&base.arcs, &base.schedule, &bd_vars, bd);
    builder.bd_objective(&bd_vars, bd);
    Ok((base, bd_vars))
}

/// Build the fixed-route BD-cost model: continuous sub-model only, with the
/// given arc assignment substituted as constants into every big-M term.
pub fn build_fixed_bd_model<B: MilpBackend>(
    backend: &mut B,
    exp: &ExpandedInstance<'_>,
    mat: &Matrices,
    bd: &BdParams,
    route: &ArcMatrix,
) -> EvResult<(ScheduleVars, BdVars)> {
    bd.validate()?;
    let mut builder = ModelBuilder::new(backend, exp, mat);
    let arcs = builder.fixed_routing(route)?;
    let schedule = builder.schedule_variables();
    builder.time_feasibility(&arcs, &schedule);
    builder.demand_satisfaction(&arcs, &schedule);
    builder.battery_consistency(&arcs, &schedule);
    builder.recharge_monotonicity(&schedule);
    let bd_vars = builder.bd_variables(bd);
    builder.bd_threshold_bounds(&arcs, &schedule, &bd_vars, bd);
    builder.bd_objective(&bd_vars, bd);
    Ok((schedule, bd_vars))
}
