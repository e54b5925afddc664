//! Storage state-of-charge dynamics.
//!
//! For each unit `s` with efficiency `eta` and step length `Δt`:
//!
//! ```text
//! E[s,0]    = einitial
//! E[s,t+1]  = E[s,t] + eta·Δt·CH[s,t] − (Δt/eta)·DIS[s,t]
//! ```
//!
//! plus the terminal condition selected by [`TerminalStorage`]. The energy
//! bounds `[0, emax]` are variable bounds and live in the registry.

use super::types::TerminalStorage;
use super::variables::VariableRegistry;
use dcopf_core::Topology;
use good_lp::{constraint, Constraint};

pub fn storage_dynamics(
    topology: &Topology,
    registry: &VariableRegistry,
    terminal: TerminalStorage,
) -> Vec<Constraint> {
    let steps = topology.time().len();
    let dt = topology.time().delta_t_hours();
    let mut constraints = Vec::new();

    for unit in topology.storage_units() {
        if let Some(&first) = registry.energy(unit.id, 0) {
            constraints.push(constraint!(first == unit.initial));
        }

        let charge_gain = unit.efficiency * dt;
        let discharge_loss = dt / unit.efficiency;
        for t in 0..steps {
            let (Some(&now), Some(&next), Some(&charge), Some(&discharge)) = (
                registry.energy(unit.id, t),
                registry.energy(unit.id, t + 1),
                registry.charge(unit.id, t),
                registry.discharge(unit.id, t),
            ) else {
                continue;
            };
            constraints.push(constraint!(
                next == now + charge_gain * charge - discharge_loss * discharge
            ));
        }

        if let Some(&last) = registry.energy(unit.id, steps) {
            match terminal {
                TerminalStorage::Pinned => constraints.push(constraint!(last == unit.initial)),
                TerminalStorage::AtLeastInitial => {
                    constraints.push(constraint!(last >= unit.initial))
                }
                TerminalStorage::Free => {}
            }
        }
    }

    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dcopf_core::{Bus, BusId, DemandRecord, GenId, GeneratorRow, TopologyOptions};
    use good_lp::variables;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn single_storage() -> Topology {
        let buses = vec![Bus::new(BusId::new(1))];
        let gens = vec![GeneratorRow::storage(
            GenId::new(7),
            at(0),
            BusId::new(1),
            2.0,
            10.0,
            5.0,
            0.9,
        )];
        let demand = vec![
            DemandRecord::new(BusId::new(1), at(0), 0.0),
            DemandRecord::new(BusId::new(1), at(1), 0.0),
            DemandRecord::new(BusId::new(1), at(2), 0.0),
        ];
        Topology::build(&buses, &[], &gens, &demand, &TopologyOptions::default()).unwrap()
    }

    #[test]
    fn terminal_policy_controls_row_count() {
        let topo = single_storage();
        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);

        // initial pin + one recurrence per step (+ terminal row)
        assert_eq!(storage_dynamics(&topo, &registry, TerminalStorage::Pinned).len(), 5);
        assert_eq!(storage_dynamics(&topo, &registry, TerminalStorage::AtLeastInitial).len(), 5);
        assert_eq!(storage_dynamics(&topo, &registry, TerminalStorage::Free).len(), 4);
    }
}
