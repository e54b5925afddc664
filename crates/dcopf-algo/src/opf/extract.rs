use super::objective::evaluate_cost;
use super::types::{
    AngleRecord, DcopfSolution, FlowRecord, GenerationRecord, SolveStatus, StorageDispatchRecord,
    StorageLevelRecord, UnitKind,
};
use super::variables::SolvedValues;
use dcopf_core::Topology;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn value_of(value: Option<&f64>) -> f64 {
    value.copied().unwrap_or(0.0)
}

/// Turn solved variable values into the output tables.
///
/// Non-finite values are replaced by 0. The reported cost is recomputed from the
/// extracted dispatch rather than taken from the backend.
pub fn extract_solution(
    topology: &Topology,
    raw: &SolvedValues,
    solve_time_ms: u128,
) -> DcopfSolution {
    let values = raw.map(|v| finite_or_zero(*v));
    let time = topology.time();

    let mut generation = Vec::new();
    let mut angles = Vec::new();
    let mut flows = Vec::new();
    let mut storage_dispatch = Vec::new();

    for (t, step) in time.steps().iter().enumerate() {
        for gen in topology.generators() {
            let Some(offer) = topology.offer(*gen, t) else {
                continue;
            };
            generation.push(GenerationRecord {
                time: *step,
                id: *gen,
                node: offer.bus,
                gen: value_of(values.gen(*gen, t)),
                kind: UnitKind::Dispatchable,
            });
        }

        for unit in topology.storage_units() {
            let charge = value_of(values.charge(unit.id, t));
            let discharge = value_of(values.discharge(unit.id, t));
            generation.push(GenerationRecord {
                time: *step,
                id: unit.id,
                node: unit.bus,
                gen: discharge - charge,
                kind: UnitKind::Storage,
            });
            storage_dispatch.push(StorageDispatchRecord {
                time: *step,
                id: unit.id,
                charge,
                discharge,
            });
        }

        for bus in topology.buses() {
            angles.push(AngleRecord {
                time: *step,
                bus: *bus,
                theta: value_of(values.theta(*bus, t)),
            });
        }

        for (idx, branch) in topology.branches().iter().enumerate() {
            flows.push(FlowRecord {
                time: *step,
                from_bus: branch.from_bus,
                to_bus: branch.to_bus,
                flow: value_of(values.flow(idx, t)),
            });
        }
    }

    let mut storage_levels = Vec::new();
    for (t, step) in time.extended().iter().enumerate() {
        for unit in topology.storage_units() {
            storage_levels.push(StorageLevelRecord {
                time: *step,
                id: unit.id,
                energy: value_of(values.energy(unit.id, t)),
            });
        }
    }

    DcopfSolution {
        status: SolveStatus::Optimal,
        solve_time_ms,
        delta_t_hours: time.delta_t_hours(),
        cost: evaluate_cost(topology, &values),
        generation,
        angles,
        flows,
        storage_dispatch,
        storage_levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::variables::VariableRegistry;
    use chrono::{NaiveDate, NaiveDateTime};
    use dcopf_core::{Branch, Bus, BusId, DemandRecord, GenId, GeneratorRow, TopologyOptions};
    use good_lp::variables;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn nan_values_become_zero() {
        let buses = vec![Bus::new(BusId::new(1)), Bus::new(BusId::new(2))];
        let branches = vec![Branch::new(BusId::new(1), BusId::new(2), 10.0, 100.0)];
        let gens = vec![
            GeneratorRow::dispatchable(GenId::new(1), at(0), BusId::new(1), 0.0, 10.0, 5.0),
            GeneratorRow::storage(GenId::new(2), at(0), BusId::new(2), 1.0, 4.0, 2.0, 1.0),
        ];
        let demand = vec![DemandRecord::new(BusId::new(2), at(0), 3.0)];
        let topo =
            Topology::build(&buses, &branches, &gens, &demand, &TopologyOptions::default()).unwrap();

        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);
        let solution = extract_solution(&topo, &registry.read(|_| f64::NAN), 0);

        assert_eq!(solution.cost, 0.0);
        assert!(solution.generation.iter().all(|r| r.gen == 0.0));
        assert!(solution.angles.iter().all(|r| r.theta == 0.0));
        assert_eq!(solution.generation.len(), 2);
        assert_eq!(solution.storage_levels.len(), 2);
        assert_eq!(solution.flows.len(), 1);
    }

    #[test]
    fn infinite_values_become_zero() {
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(-2.5), -2.5);

        let buses = vec![Bus::new(BusId::new(1))];
        let gens = vec![GeneratorRow::dispatchable(
            GenId::new(1),
            at(0),
            BusId::new(1),
            0.0,
            10.0,
            5.0,
        )];
        let demand = vec![DemandRecord::new(BusId::new(1), at(0), 3.0)];
        let topo = Topology::build(&buses, &[], &gens, &demand, &TopologyOptions::default()).unwrap();

        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);
        let solution = extract_solution(&topo, &registry.read(|_| f64::INFINITY), 0);
        assert!(solution.cost.is_finite());
        assert!(solution.generation.iter().all(|r| r.gen == 0.0));
    }
}
