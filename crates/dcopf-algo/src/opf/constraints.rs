//! Network constraints: DC flow law, slack angle, flow limits and nodal
//! power balance.
//!
//! The DC approximation assumes flat voltage magnitudes and small angle
//! differences, so the active power on branch i→j is
//! `P_ij = b_ij (θ_i − θ_j)` with `b_ij = 1/x_ij`.

use super::variables::VariableRegistry;
use dcopf_core::Topology;
use good_lp::{constraint, Constraint, Expression};

/// `FLOW[i,j,t] = b_ij (THETA[i,t] − THETA[j,t])` for every branch and step.
pub fn flow_law(topology: &Topology, registry: &VariableRegistry) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    for t in 0..topology.time().len() {
        for (idx, branch) in topology.branches().iter().enumerate() {
            let (Some(&flow), Some(&theta_from), Some(&theta_to)) = (
                registry.flow(idx, t),
                registry.theta(branch.from_bus, t),
                registry.theta(branch.to_bus, t),
            ) else {
                continue;
            };
            constraints.push(constraint!(
                flow == branch.susceptance * (theta_from - theta_to)
            ));
        }
    }
    constraints
}

/// Reference angle: `THETA[slack,t] = 0` for every step.
pub fn slack_angle(topology: &Topology, registry: &VariableRegistry) -> Vec<Constraint> {
    (0..topology.time().len())
        .filter_map(|t| registry.theta(topology.slack_bus(), t))
        .map(|&theta| constraint!(theta == 0.0))
        .collect()
}

/// Symmetric thermal limit `−ratea ≤ FLOW ≤ ratea`.
pub fn flow_limits(topology: &Topology, registry: &VariableRegistry) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    for t in 0..topology.time().len() {
        for (idx, branch) in topology.branches().iter().enumerate() {
            if let Some(&flow) = registry.flow(idx, t) {
                constraints.push(constraint!(flow <= branch.rate_a));
                constraints.push(constraint!(flow >= -branch.rate_a));
            }
        }
    }
    constraints
}

/// Nodal balance for every bus and step:
///
/// `Σ GEN + Σ (DISCHARGE − CHARGE) + Σ FLOW_in − Σ FLOW_out = demand`
///
/// A bus with nothing attached and zero demand would only yield `0 = 0`,
/// so that row is omitted.
pub fn power_balance(topology: &Topology, registry: &VariableRegistry) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    for t in 0..topology.time().len() {
        for &bus in topology.buses() {
            let mut injection = Expression::from(0.0);
            let mut terms = 0usize;

            for gen in topology.generators_at(bus, t) {
                if let Some(&var) = registry.gen(*gen, t) {
                    injection += var;
                    terms += 1;
                }
            }

            for unit in topology.storage_at(bus) {
                if let (Some(&charge), Some(&discharge)) =
                    (registry.charge(unit.id, t), registry.discharge(unit.id, t))
                {
                    injection += discharge;
                    injection -= charge;
                    terms += 1;
                }
            }

            for (idx, _) in topology.branches_to(bus) {
                if let Some(&flow) = registry.flow(idx, t) {
                    injection += flow;
                    terms += 1;
                }
            }
            for (idx, _) in topology.branches_from(bus) {
                if let Some(&flow) = registry.flow(idx, t) {
                    injection -= flow;
                    terms += 1;
                }
            }

            let demand = topology.demand(bus, t);
            if terms == 0 && demand == 0.0 {
                continue;
            }
            constraints.push(constraint!(injection == demand));
        }
    }
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dcopf_core::{Branch, Bus, BusId, DemandRecord, GenId, GeneratorRow, TopologyOptions};
    use good_lp::variables;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn three_bus() -> Topology {
        // Bus 3 is isolated and carries no demand.
        let buses = vec![
            Bus::new(BusId::new(1)),
            Bus::new(BusId::new(2)),
            Bus::new(BusId::new(3)),
        ];
        let branches = vec![Branch::new(BusId::new(1), BusId::new(2), 10.0, 100.0)];
        let gens = vec![GeneratorRow::dispatchable(
            GenId::new(1),
            at(0),
            BusId::new(1),
            0.0,
            10.0,
            5.0,
        )];
        let demand = vec![DemandRecord::new(BusId::new(2), at(0), 3.0)];
        Topology::build(&buses, &branches, &gens, &demand, &TopologyOptions::default()).unwrap()
    }

    #[test]
    fn counts_network_rows() {
        let topo = three_bus();
        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);

        assert_eq!(flow_law(&topo, &registry).len(), 1);
        assert_eq!(slack_angle(&topo, &registry).len(), 1);
        assert_eq!(flow_limits(&topo, &registry).len(), 2);
        assert_eq!(power_balance(&topo, &registry).len(), 2);
    }
}
