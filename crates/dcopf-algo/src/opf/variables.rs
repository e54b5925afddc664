//! Decision variables of the time-coupled DC-OPF.
//!
//! | Family | Key | Bounds |
//! |--------|-----|--------|
//! | `gen` | (generator, t) | [pmin(g,t), pmax(g,t)] |
//! | `theta` | (bus, t) | free |
//! | `flow` | (branch index, t) | free |
//! | `charge`, `discharge` | (storage, t) | [0, \|pmax\|] |
//! | `energy` | (storage, extended t) | [0, emax] |
//!
//! The same keyed layout is reused for solved values: a
//! [`VariableRegistry`] is a `VariableSet<Variable>` and the numbers read back
//! from the solver are a [`SolvedValues`] (`VariableSet<f64>`).

use dcopf_core::{BusId, GenId, Topology};
use good_lp::{variable, ProblemVariables, Variable};
use std::collections::HashMap;

/// One value per modeled (entity, time) pair.
#[derive(Debug, Clone)]
pub struct VariableSet<T> {
    gen: HashMap<(GenId, usize), T>,
    theta: HashMap<(BusId, usize), T>,
    flow: HashMap<(usize, usize), T>,
    charge: HashMap<(GenId, usize), T>,
    discharge: HashMap<(GenId, usize), T>,
    energy: HashMap<(GenId, usize), T>,
}

// No `T: Default` bound: `good_lp::Variable` has no default value.
impl<T> Default for VariableSet<T> {
    fn default() -> Self {
        Self {
            gen: HashMap::new(),
            theta: HashMap::new(),
            flow: HashMap::new(),
            charge: HashMap::new(),
            discharge: HashMap::new(),
            energy: HashMap::new(),
        }
    }
}

pub type VariableRegistry = VariableSet<Variable>;
pub type SolvedValues = VariableSet<f64>;

impl VariableRegistry {
    /// Register every variable of the model for `topology` on `vars`.
    pub fn allocate(vars: &mut ProblemVariables, topology: &Topology) -> Self {
        let steps = topology.time().len();
        let mut registry = Self::default();

        for gen in topology.generators() {
            for t in 0..steps {
                // Topology guarantees an offer for every (dispatchable, t).
                if let Some(offer) = topology.offer(*gen, t) {
                    let var = vars.add(variable().min(offer.pmin).max(offer.pmax));
                    registry.gen.insert((*gen, t), var);
                }
            }
        }

        for bus in topology.buses() {
            for t in 0..steps {
                registry.theta.insert((*bus, t), vars.add(variable()));
            }
        }

        for idx in 0..topology.branches().len() {
            for t in 0..steps {
                registry.flow.insert((idx, t), vars.add(variable()));
            }
        }

        for unit in topology.storage_units() {
            for t in 0..steps {
                let charge = vars.add(variable().min(0.0).max(unit.power_limit));
                let discharge = vars.add(variable().min(0.0).max(unit.power_limit));
                registry.charge.insert((unit.id, t), charge);
                registry.discharge.insert((unit.id, t), discharge);
            }
            for t in 0..topology.time().extended().len() {
                let energy = vars.add(variable().min(0.0).max(unit.capacity));
                registry.energy.insert((unit.id, t), energy);
            }
        }

        registry
    }
}

impl<T> VariableSet<T> {
    pub fn gen(&self, id: GenId, t: usize) -> Option<&T> {
        self.gen.get(&(id, t))
    }

    pub fn theta(&self, bus: BusId, t: usize) -> Option<&T> {
        self.theta.get(&(bus, t))
    }

    /// Flow on the branch at `branch_idx` in [`Topology::branches`].
    pub fn flow(&self, branch_idx: usize, t: usize) -> Option<&T> {
        self.flow.get(&(branch_idx, t))
    }

    pub fn charge(&self, id: GenId, t: usize) -> Option<&T> {
        self.charge.get(&(id, t))
    }

    pub fn discharge(&self, id: GenId, t: usize) -> Option<&T> {
        self.discharge.get(&(id, t))
    }

    /// Energy level at extended step `t`.
    pub fn energy(&self, id: GenId, t: usize) -> Option<&T> {
        self.energy.get(&(id, t))
    }

    /// Total number of entries over all families.
    pub fn len(&self) -> usize {
        self.gen.len()
            + self.theta.len()
            + self.flow.len()
            + self.charge.len()
            + self.discharge.len()
            + self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to every entry, keeping the keys.
    pub fn map<U, F>(&self, f: F) -> VariableSet<U>
    where
        F: Fn(&T) -> U,
    {
        fn remap<K: Copy + Eq + std::hash::Hash, T, U>(
            source: &HashMap<K, T>,
            f: &impl Fn(&T) -> U,
        ) -> HashMap<K, U> {
            source.iter().map(|(key, value)| (*key, f(value))).collect()
        }

        VariableSet {
            gen: remap(&self.gen, &f),
            theta: remap(&self.theta, &f),
            flow: remap(&self.flow, &f),
            charge: remap(&self.charge, &f),
            discharge: remap(&self.discharge, &f),
            energy: remap(&self.energy, &f),
        }
    }
}

impl VariableRegistry {
    /// Read every variable through `value` (typically `Solution::value`).
    pub fn read<F>(&self, value: F) -> SolvedValues
    where
        F: Fn(Variable) -> f64,
    {
        self.map(|var| value(*var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dcopf_core::{Branch, Bus, DemandRecord, GeneratorRow, TopologyOptions};
    use good_lp::variables;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn topology() -> Topology {
        let buses = vec![Bus::new(BusId::new(1)), Bus::new(BusId::new(2))];
        let branches = vec![Branch::new(BusId::new(1), BusId::new(2), 10.0, 100.0)];
        let gens = vec![
            GeneratorRow::dispatchable(GenId::new(1), at(0), BusId::new(1), 0.0, 10.0, 5.0),
            GeneratorRow::dispatchable(GenId::new(1), at(1), BusId::new(1), 0.0, 10.0, 5.0),
            GeneratorRow::storage(GenId::new(2), at(0), BusId::new(2), 2.0, 8.0, 4.0, 1.0),
        ];
        let demand = vec![
            DemandRecord::new(BusId::new(2), at(0), 3.0),
            DemandRecord::new(BusId::new(2), at(1), 3.0),
        ];
        Topology::build(&buses, &branches, &gens, &demand, &TopologyOptions::default()).unwrap()
    }

    #[test]
    fn allocates_one_variable_per_entity_and_step() {
        let topo = topology();
        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);

        // 2 gen + 4 theta + 2 flow + 2 charge + 2 discharge + 3 energy
        assert_eq!(registry.len(), 15);
        assert!(registry.gen(GenId::new(1), 1).is_some());
        assert!(registry.energy(GenId::new(2), 2).is_some());
        assert!(registry.energy(GenId::new(2), 3).is_none());
        assert!(registry.charge(GenId::new(2), 2).is_none());
    }

    #[test]
    fn empty_registry_needs_no_default_variable() {
        let registry = VariableRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.gen(GenId::new(1), 0).is_none());
    }

    #[test]
    fn read_keeps_keys() {
        let topo = topology();
        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, &topo);
        let values = registry.read(|_| 1.5);
        assert_eq!(values.len(), registry.len());
        assert_eq!(values.theta(BusId::new(2), 0), Some(&1.5));
    }
}
