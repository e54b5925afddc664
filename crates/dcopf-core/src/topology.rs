//! Topology & time index builder.
//!
//! Turns season-filtered tables into index sets and membership lookups:
//!
//! - bus ids (table order, duplicates dropped)
//! - ordered time steps and the extended sequence for storage bookkeeping
//! - the generator id partition into dispatchable (`emax == 0`) and storage
//!   (`emax > 0`) units
//! - per-(bus, step) generator membership, per-bus storage membership and
//!   per-bus incident branches
//!
//! Every dispatchable generator must have a row for every time step of the
//! index; a gap is reported as [`GridError::MissingData`] instead of silently
//! defaulting the bounds.

use crate::error::{GridError, GridResult};
use crate::graph_utils::count_islands;
use crate::records::{Branch, Bus, DemandRecord, GeneratorRow, Offer, StorageUnit};
use crate::time::TimeIndex;
use crate::{BusId, GenId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Options controlling index construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyOptions {
    /// Reference bus whose angle is fixed at zero.
    pub slack_bus: BusId,
    /// Length of one time step in hours.
    pub delta_t_hours: f64,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            slack_bus: BusId::new(1),
            delta_t_hours: 1.0,
        }
    }
}

/// Normalized network and time-series view of one (scenario, season) run.
#[derive(Debug, Clone)]
pub struct Topology {
    buses: Vec<BusId>,
    branches: Vec<Branch>,
    generators: Vec<GenId>,
    storage: Vec<StorageUnit>,
    time: TimeIndex,
    slack_bus: BusId,
    offers: HashMap<(GenId, usize), Offer>,
    demand: HashMap<(BusId, usize), f64>,
    gens_at: HashMap<(BusId, usize), Vec<GenId>>,
    storage_at: HashMap<BusId, Vec<usize>>,
    branches_from: HashMap<BusId, Vec<usize>>,
    branches_to: HashMap<BusId, Vec<usize>>,
}

impl Topology {
    /// Build the index sets from season-filtered tables.
    pub fn build(
        buses: &[Bus],
        branches: &[Branch],
        generators: &[GeneratorRow],
        demand: &[DemandRecord],
        options: &TopologyOptions,
    ) -> GridResult<Self> {
        let mut seen_buses = HashSet::with_capacity(buses.len());
        let bus_ids: Vec<BusId> = buses
            .iter()
            .map(|bus| bus.id)
            .filter(|id| seen_buses.insert(*id))
            .collect();
        if bus_ids.is_empty() {
            return Err(GridError::Validation("bus table is empty".into()));
        }
        if !seen_buses.contains(&options.slack_bus) {
            return Err(GridError::UnknownSlackBus(options.slack_bus));
        }

        let time = TimeIndex::from_times(demand.iter().map(|d| d.time), options.delta_t_hours)?;

        let mut branches_from: HashMap<BusId, Vec<usize>> = HashMap::new();
        let mut branches_to: HashMap<BusId, Vec<usize>> = HashMap::new();
        let mut pairs = HashSet::with_capacity(branches.len());
        for (idx, branch) in branches.iter().enumerate() {
            if !branch.susceptance.is_finite() {
                return Err(GridError::Validation(format!(
                    "branch {}-{} has zero reactance",
                    branch.from_bus, branch.to_bus
                )));
            }
            for end in [branch.from_bus, branch.to_bus] {
                if !seen_buses.contains(&end) {
                    return Err(GridError::Validation(format!(
                        "branch {}-{} references unknown bus {}",
                        branch.from_bus, branch.to_bus, end
                    )));
                }
            }
            if !pairs.insert(branch.key()) {
                return Err(GridError::Validation(format!(
                    "branch {}-{} is declared more than once",
                    branch.from_bus, branch.to_bus
                )));
            }
            branches_from.entry(branch.from_bus).or_default().push(idx);
            branches_to.entry(branch.to_bus).or_default().push(idx);
        }

        let (gen_ids, storage) = partition_generators(generators)?;

        // First row wins for repeated (id, time) pairs.
        let mut offers: HashMap<(GenId, usize), Offer> = HashMap::new();
        let dispatchable: HashSet<GenId> = gen_ids.iter().copied().collect();
        for row in generators.iter().filter(|row| dispatchable.contains(&row.id)) {
            if let Some(t) = time.position(&row.time) {
                offers.entry((row.id, t)).or_insert_with(|| row.offer());
            }
        }
        for gen in &gen_ids {
            for (t, step) in time.steps().iter().enumerate() {
                if !offers.contains_key(&(*gen, t)) {
                    return Err(GridError::MissingData {
                        generator: *gen,
                        time: *step,
                    });
                }
            }
        }

        let mut gens_at: HashMap<(BusId, usize), Vec<GenId>> = HashMap::new();
        for gen in &gen_ids {
            for t in 0..time.len() {
                let offer = &offers[&(*gen, t)];
                if !seen_buses.contains(&offer.bus) {
                    warn!(generator = %gen, bus = %offer.bus, "generator sits on a bus missing from the bus table");
                }
                gens_at.entry((offer.bus, t)).or_default().push(*gen);
            }
        }

        let mut storage_at: HashMap<BusId, Vec<usize>> = HashMap::new();
        for (idx, unit) in storage.iter().enumerate() {
            if !seen_buses.contains(&unit.bus) {
                warn!(storage = %unit.id, bus = %unit.bus, "storage unit sits on a bus missing from the bus table");
            }
            storage_at.entry(unit.bus).or_default().push(idx);
        }

        let mut demand_map: HashMap<(BusId, usize), f64> = HashMap::new();
        for record in demand {
            if !seen_buses.contains(&record.bus) {
                warn!(bus = %record.bus, time = %record.time, "ignoring demand at unknown bus");
                continue;
            }
            if let Some(t) = time.position(&record.time) {
                demand_map.entry((record.bus, t)).or_insert(record.pd);
            }
        }

        let network_buses: Vec<Bus> = bus_ids.iter().map(|id| Bus::new(*id)).collect();
        let islands = count_islands(&network_buses, branches);
        if islands.len() > 1 {
            warn!(
                islands = islands.len(),
                "network is split into several islands; buses outside the slack island have free angles"
            );
        }

        debug!(
            buses = bus_ids.len(),
            branches = branches.len(),
            generators = gen_ids.len(),
            storage = storage.len(),
            steps = time.len(),
            "built topology"
        );

        Ok(Self {
            buses: bus_ids,
            branches: branches.to_vec(),
            generators: gen_ids,
            storage,
            time,
            slack_bus: options.slack_bus,
            offers,
            demand: demand_map,
            gens_at,
            storage_at,
            branches_from,
            branches_to,
        })
    }

    pub fn buses(&self) -> &[BusId] {
        &self.buses
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Dispatchable generator ids in order of first appearance.
    pub fn generators(&self) -> &[GenId] {
        &self.generators
    }

    /// Storage units in order of first appearance.
    pub fn storage_units(&self) -> &[StorageUnit] {
        &self.storage
    }

    pub fn time(&self) -> &TimeIndex {
        &self.time
    }

    pub fn slack_bus(&self) -> BusId {
        self.slack_bus
    }

    /// Bounds and cost of `gen` at step `t`.
    pub fn offer(&self, gen: GenId, t: usize) -> Option<&Offer> {
        self.offers.get(&(gen, t))
    }

    /// Demand at `bus` for step `t`; zero when no row exists.
    pub fn demand(&self, bus: BusId, t: usize) -> f64 {
        self.demand.get(&(bus, t)).copied().unwrap_or(0.0)
    }

    /// Dispatchable generators connected to `bus` at step `t`.
    pub fn generators_at(&self, bus: BusId, t: usize) -> &[GenId] {
        self.gens_at.get(&(bus, t)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Storage units connected to `bus`.
    pub fn storage_at(&self, bus: BusId) -> impl Iterator<Item = &StorageUnit> + '_ {
        self.storage_at
            .get(&bus)
            .into_iter()
            .flatten()
            .map(move |idx| &self.storage[*idx])
    }

    /// Branches leaving `bus`, with their position in [`Topology::branches`].
    pub fn branches_from(&self, bus: BusId) -> impl Iterator<Item = (usize, &Branch)> + '_ {
        self.branches_from
            .get(&bus)
            .into_iter()
            .flatten()
            .map(move |idx| (*idx, &self.branches[*idx]))
    }

    /// Branches entering `bus`, with their position in [`Topology::branches`].
    pub fn branches_to(&self, bus: BusId) -> impl Iterator<Item = (usize, &Branch)> + '_ {
        self.branches_to
            .get(&bus)
            .into_iter()
            .flatten()
            .map(move |idx| (*idx, &self.branches[*idx]))
    }
}

/// Split ids into dispatchable generators and storage units, keeping the
/// order of first appearance.
fn partition_generators(rows: &[GeneratorRow]) -> GridResult<(Vec<GenId>, Vec<StorageUnit>)> {
    let mut kinds: HashMap<GenId, bool> = HashMap::new();
    let mut generators = Vec::new();
    let mut storage = Vec::new();
    for row in rows {
        match kinds.get(&row.id) {
            Some(&is_storage) if is_storage != row.is_storage() => {
                return Err(GridError::Validation(format!(
                    "generator {} mixes storage and non-storage rows",
                    row.id
                )));
            }
            Some(_) => {}
            None => {
                kinds.insert(row.id, row.is_storage());
                if row.is_storage() {
                    if !(row.eta.is_finite() && row.eta > 0.0) {
                        return Err(GridError::Validation(format!(
                            "storage unit {} has non-positive efficiency {}",
                            row.id, row.eta
                        )));
                    }
                    storage.push(StorageUnit::from_row(row));
                } else {
                    generators.push(row.id);
                }
            }
        }
    }
    Ok((generators, storage))
}
