//! Solve orchestration: instance in, [`SolveReport`] out.
//!
//! Each entry point expands the instance, builds the matrices, emits one of
//! the three model variants into a fresh [`GoodLpBackend`], runs the solver
//! and condenses the outcome. A time-limited solve that produced an
//! incumbent is a success with a caveat status; infeasibility and
//! solver-level failures surface as [`EvrptwError::Infeasible`].

use std::time::Instant;

use crate::backend::{GoodLpBackend, MilpBackend};
use crate::expand::ExpandedInstance;
use crate::formulate::{build_base_model, build_bd_model, build_fixed_bd_model, BdParams};
use crate::geometry::Matrices;
use evrptw_core::{ArcMatrix, EvResult, EvrptwError, Instance, SolveReport};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Values below this are treated as zero and dropped from reports.
const REPORT_TOLERANCE: f64 = 1e-9;

/// Solver knobs shared by all variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Wall-clock budget handed to the backend, in seconds
    pub time_limit_secs: f64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 7200.0,
        }
    }
}

/// Solve the base EVRPTW: minimize total distance over feasible routes.
pub fn solve_evrptw(instance: &Instance, config: &SolveConfig) -> EvResult<SolveReport> {
    let started = Instant::now();
    instance.vehicle.validate()?;
    let exp = ExpandedInstance::new(instance);
    let mat = Matrices::build(&exp)?;

    let mut backend = GoodLpBackend::new();
    build_base_model(&mut backend, &exp, &mat);
    info!(
        instance = %instance.name,
        nodes = exp.len(),
        variables = backend.num_variables(),
        "solving minimum-distance model"
    );
    let status = backend.optimize(config.time_limit_secs)?;
    finish(&instance.name, &backend, status, started)
}

/// Solve the battery-degradation extension: full routing freedom, objective
/// is the weighted sum of state-of-charge threshold violations.
pub fn solve_evrptw_bd(
    instance: &Instance,
    config: &SolveConfig,
    bd: &BdParams,
) -> EvResult<SolveReport> {
    let started = Instant::now();
    instance.vehicle.validate()?;
    let exp = ExpandedInstance::new(instance);
    let mat = Matrices::build(&exp)?;

    let mut backend = GoodLpBackend::new();
    build_bd_model(&mut backend, &exp, &mat, bd)?;
    info!(
        instance = %instance.name,
        nodes = exp.len(),
        variables = backend.num_variables(),
        wl = bd.price_low,
        wh = bd.price_high,
        "solving degradation-extension model"
    );
    let status = backend.optimize(config.time_limit_secs)?;
    finish(&instance.name, &backend, status, started)
}

/// Price the battery-degradation cost of an already computed route. The arc
/// matrix must match the expanded dimension of the instance; only the
/// continuous battery/time/cargo trajectory is optimized.
pub fn bd_cost_of_fixed_routes(
    instance: &Instance,
    config: &SolveConfig,
    bd: &BdParams,
    route: &ArcMatrix,
) -> EvResult<SolveReport> {
    let started = Instant::now();
    instance.vehicle.validate()?;
    let exp = ExpandedInstance::new(instance);
    let mat = Matrices::build(&exp)?;

    let mut backend = GoodLpBackend::new();
    build_fixed_bd_model(&mut backend, &exp, &mat, bd, route)?;
    info!(
        instance = %instance.name,
        nodes = exp.len(),
        "pricing degradation of fixed routes"
    );
    let status = backend.optimize(config.time_limit_secs)?;
    finish(&instance.name, &backend, status, started)
}

fn finish(
    name: &str,
    backend: &GoodLpBackend,
    status: evrptw_core::SolveStatus,
    started: Instant,
) -> EvResult<SolveReport> {
    if !status.is_usable() {
        return Err(EvrptwError::Infeasible(format!("{name}: {status}")));
    }
    let variables = backend
        .assignment()
        .filter(|(_, value)| value.abs() > REPORT_TOLERANCE)
        .map(|(name, value)| (name.to_owned(), value))
        .collect();
    let report = SolveReport {
        status,
        objective: backend.objective_value(),
        runtime_ms: started.elapsed().as_millis(),
        variables,
    };
    info!(
        instance = name,
        status = %report.status,
        objective = report.objective,
        runtime_ms = report.runtime_ms as u64,
        "solve finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{station_instance, two_customer_instance};
    use evrptw_core::SolveStatus;

    /// Arcs reported as used, parsed back out of the variable names.
    fn arcs_of(report: &SolveReport) -> Vec<(usize, usize)> {
        let mut arcs = Vec::new();
        for (name, value) in &report.variables {
            if let Some(rest) = name.strip_prefix("x,") {
                if *value > 0.5 {
                    let (i, j) = rest.split_once(',').unwrap();
                    arcs.push((i.parse().unwrap(), j.parse().unwrap()));
                }
            }
        }
        arcs.sort_unstable();
        arcs
    }

    #[test]
    fn test_two_customers_one_route() {
        // customers at (0,10) and (0,20), both fit in one vehicle:
        // 0 -> 10 -> 20 -> 0 for a total distance of 40
        let instance = two_customer_instance(10, 10, 100.0);
        let report = solve_evrptw(&instance, &SolveConfig::default()).unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert!((report.objective - 40.0).abs() < 1e-4);

        let arcs = arcs_of(&report);
        assert_eq!(arcs.len(), 3);
        // exactly one departure from the depot
        assert_eq!(arcs.iter().filter(|(i, _)| *i == 0).count(), 1);
    }

    #[test]
    fn test_cargo_capacity_splits_routes() {
        // combined demand exceeds capacity, forcing two separate tours:
        // 2*20 + 2*10 = 60
        let instance = two_customer_instance(60, 60, 100.0);
        let report = solve_evrptw(&instance, &SolveConfig::default()).unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert!((report.objective - 60.0).abs() < 1e-4);

        let arcs = arcs_of(&report);
        assert_eq!(arcs.iter().filter(|(i, _)| *i == 0).count(), 2);
        // each customer (indices 1 and 2) is entered and left exactly once
        for node in [1usize, 2] {
            assert_eq!(arcs.iter().filter(|(i, _)| *i == node).count(), 1);
            assert_eq!(arcs.iter().filter(|(_, j)| *j == node).count(), 1);
        }
    }

    #[test]
    fn test_full_band_has_zero_degradation_cost() {
        // LB = 0 and UB = 1 widen the comfortable band to the whole battery;
        // the threshold variables collapse to zero and so does the objective.
        // Q equals the round-trip distance so a full-to-empty tour exists.
        let instance = station_instance(20.0);
        let bd = BdParams {
            lower_fraction: 0.0,
            upper_fraction: 1.0,
            ..BdParams::default()
        };
        let report = solve_evrptw_bd(&instance, &SolveConfig::default(), &bd).unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert!(report.objective.abs() < 1e-6);
    }

    #[test]
    fn test_fixed_route_degradation_price() {
        // depot (0,0), station (0,5), customer (0,10), Q = 30, direct tour.
        // With LB = 0.25 and UB = 0.85 the depot-leg sandwiches pin
        //   zH,0,c = y_c - 15.5   and   zL,c,3 = 17.5 - y_c
        // and minimizing 0.2*zH + 0.1*zL lands on y_c = 15.5, cost 0.2.
        let instance = station_instance(30.0);
        let mut route = ArcMatrix::new(4);
        route.set(0, 2);
        route.set(2, 3);

        let report = bd_cost_of_fixed_routes(
            &instance,
            &SolveConfig::default(),
            &BdParams::default(),
            &route,
        )
        .unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert!((report.objective - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_base_then_fixed_round_trip() {
        // price whatever routes the base solve picked; the continuous
        // sub-model must stay feasible for them
        let instance = station_instance(30.0);
        let base = solve_evrptw(&instance, &SolveConfig::default()).unwrap();

        let mut route = ArcMatrix::new(4);
        for (i, j) in arcs_of(&base) {
            route.set(i, j);
        }
        let priced = bd_cost_of_fixed_routes(
            &instance,
            &SolveConfig::default(),
            &BdParams::default(),
            &route,
        )
        .unwrap();
        assert!(priced.status.is_usable());
        assert!(priced.objective >= -1e-9);
    }

    #[test]
    fn test_infeasible_surfaces_as_error() {
        // demand exceeding cargo capacity outright
        let instance = two_customer_instance(200, 10, 100.0);
        let err = solve_evrptw(&instance, &SolveConfig::default());
        assert!(matches!(err, Err(EvrptwError::Infeasible(_))));
    }
}
