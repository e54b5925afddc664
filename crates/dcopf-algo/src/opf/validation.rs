//! Post-solve checks on an extracted solution.
//!
//! These recompute the model equations from the output tables, which is what
//! a reader of the CSV files would see, and report the largest residuals.

use super::types::DcopfSolution;
use chrono::NaiveDateTime;
use dcopf_core::{BusId, Topology};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest absolute residual of each equation family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualReport {
    pub max_balance_residual: f64,
    pub max_flow_law_residual: f64,
    pub max_storage_residual: f64,
    pub max_slack_angle: f64,
}

impl ResidualReport {
    pub fn within(&self, tolerance: f64) -> bool {
        self.max_balance_residual <= tolerance
            && self.max_flow_law_residual <= tolerance
            && self.max_storage_residual <= tolerance
            && self.max_slack_angle <= tolerance
    }
}

/// Branch flow beyond its thermal limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLimitViolation {
    #[serde(with = "dcopf_core::time::timestamp")]
    pub time: NaiveDateTime,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub flow: f64,
    pub limit: f64,
}

pub fn residuals(topology: &Topology, solution: &DcopfSolution) -> ResidualReport {
    let mut report = ResidualReport::default();

    let mut net: HashMap<(BusId, NaiveDateTime), f64> = HashMap::new();
    for record in &solution.generation {
        *net.entry((record.node, record.time)).or_default() += record.gen;
    }
    for record in &solution.flows {
        *net.entry((record.to_bus, record.time)).or_default() += record.flow;
        *net.entry((record.from_bus, record.time)).or_default() -= record.flow;
    }
    for (t, step) in topology.time().steps().iter().enumerate() {
        for bus in topology.buses() {
            let injected = net.get(&(*bus, *step)).copied().unwrap_or(0.0);
            let residual = (injected - topology.demand(*bus, t)).abs();
            report.max_balance_residual = report.max_balance_residual.max(residual);
        }
    }

    let angles: HashMap<(BusId, NaiveDateTime), f64> = solution
        .angles
        .iter()
        .map(|r| ((r.bus, r.time), r.theta))
        .collect();
    for record in &solution.flows {
        let Some(branch) = topology
            .branches()
            .iter()
            .find(|b| b.from_bus == record.from_bus && b.to_bus == record.to_bus)
        else {
            continue;
        };
        let theta_from = angles.get(&(record.from_bus, record.time)).copied().unwrap_or(0.0);
        let theta_to = angles.get(&(record.to_bus, record.time)).copied().unwrap_or(0.0);
        let residual = (record.flow - branch.susceptance * (theta_from - theta_to)).abs();
        report.max_flow_law_residual = report.max_flow_law_residual.max(residual);
    }

    for record in solution.angles.iter().filter(|r| r.bus == topology.slack_bus()) {
        report.max_slack_angle = report.max_slack_angle.max(record.theta.abs());
    }

    let dt = solution.delta_t_hours;
    let extended = topology.time().extended();
    for unit in topology.storage_units() {
        for (t, step) in topology.time().steps().iter().enumerate() {
            let (Some(now), Some(next)) = (
                solution.energy_of(unit.id, *step),
                solution.energy_of(unit.id, extended[t + 1]),
            ) else {
                continue;
            };
            let Some(dispatch) = solution
                .storage_dispatch
                .iter()
                .find(|r| r.id == unit.id && r.time == *step)
            else {
                continue;
            };
            let expected = now + unit.efficiency * dt * dispatch.charge
                - dt / unit.efficiency * dispatch.discharge;
            report.max_storage_residual = report.max_storage_residual.max((next - expected).abs());
        }
    }

    report
}

/// Flows whose magnitude exceeds `ratea + tolerance`.
pub fn flows_exceeding(
    topology: &Topology,
    solution: &DcopfSolution,
    tolerance: f64,
) -> Vec<FlowLimitViolation> {
    let limits: HashMap<(BusId, BusId), f64> = topology
        .branches()
        .iter()
        .map(|b| (b.key(), b.rate_a))
        .collect();
    solution
        .flows
        .iter()
        .filter_map(|record| {
            let limit = *limits.get(&(record.from_bus, record.to_bus))?;
            (record.flow.abs() > limit + tolerance).then(|| FlowLimitViolation {
                time: record.time,
                from_bus: record.from_bus,
                to_bus: record.to_bus,
                flow: record.flow,
                limit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::types::{FlowRecord, SolveStatus};
    use chrono::NaiveDate;
    use dcopf_core::{Branch, Bus, DemandRecord, GenId, GeneratorRow, TopologyOptions};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn reports_flows_over_limit() {
        let buses = vec![Bus::new(BusId::new(1)), Bus::new(BusId::new(2))];
        let branches = vec![Branch::new(BusId::new(1), BusId::new(2), 10.0, 5.0)];
        let gens = vec![GeneratorRow::dispatchable(
            GenId::new(1),
            at(0),
            BusId::new(1),
            0.0,
            10.0,
            5.0,
        )];
        let demand = vec![DemandRecord::new(BusId::new(2), at(0), 6.0)];
        let topo =
            Topology::build(&buses, &branches, &gens, &demand, &TopologyOptions::default()).unwrap();

        let solution = DcopfSolution {
            status: SolveStatus::Optimal,
            solve_time_ms: 0,
            delta_t_hours: 1.0,
            cost: 0.0,
            generation: Vec::new(),
            angles: Vec::new(),
            flows: vec![FlowRecord {
                time: at(0),
                from_bus: BusId::new(1),
                to_bus: BusId::new(2),
                flow: -6.0,
            }],
            storage_dispatch: Vec::new(),
            storage_levels: Vec::new(),
        };

        let violations = flows_exceeding(&topo, &solution, 1e-6);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].limit, 5.0);
        assert!(flows_exceeding(&topo, &solution, 2.0).is_empty());
    }
}
