use crate::readers::{load_branches, load_buses, load_master_gen, load_master_load};
use crate::tables::{MasterGenRow, MasterLoadRow};
use anyhow::{bail, Result};
use dcopf_core::{Branch, Bus, GenId};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

pub const BUS_FILE: &str = "bus.csv";
pub const BRANCH_FILE: &str = "branch.csv";
pub const MASTER_GEN_FILE: &str = "master_gen.csv";
pub const MASTER_LOAD_FILE: &str = "master_load.csv";

/// The four master tables shared by every scenario of a batch.
#[derive(Debug, Clone, Default)]
pub struct GridDataset {
    pub buses: Vec<Bus>,
    pub branches: Vec<Branch>,
    pub master_gen: Vec<MasterGenRow>,
    pub master_load: Vec<MasterLoadRow>,
}

/// Counts reported by `dcopf validate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub buses: usize,
    pub branches: usize,
    pub generators: usize,
    pub storage_units: usize,
    pub gen_rows: usize,
    pub load_rows: usize,
    pub seasons: Vec<String>,
    pub asset_types: Vec<String>,
}

impl GridDataset {
    /// Load `bus.csv`, `branch.csv`, `master_gen.csv` and `master_load.csv`
    /// from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let dataset = Self {
            buses: load_buses(&dir.join(BUS_FILE))?,
            branches: load_branches(&dir.join(BRANCH_FILE))?,
            master_gen: load_master_gen(&dir.join(MASTER_GEN_FILE))?,
            master_load: load_master_load(&dir.join(MASTER_LOAD_FILE))?,
        };
        if dataset.buses.is_empty() {
            bail!("bus table in {} is empty", dir.display());
        }
        let summary = dataset.summary();
        info!(
            buses = summary.buses,
            branches = summary.branches,
            generators = summary.generators,
            storage = summary.storage_units,
            seasons = ?summary.seasons,
            "loaded grid data"
        );
        Ok(dataset)
    }

    /// Distinct season labels found in either time-series table.
    pub fn seasons(&self) -> BTreeSet<String> {
        self.master_gen
            .iter()
            .map(|row| row.season.clone())
            .chain(self.master_load.iter().map(|row| row.season.clone()))
            .collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut generators: HashSet<GenId> = HashSet::new();
        let mut storage: HashSet<GenId> = HashSet::new();
        let mut types: BTreeSet<String> = BTreeSet::new();
        for row in &self.master_gen {
            if row.is_storage() {
                storage.insert(row.id);
            } else {
                generators.insert(row.id);
            }
            types.insert(row.asset_type.clone());
        }
        DatasetSummary {
            buses: self.buses.len(),
            branches: self.branches.len(),
            generators: generators.len(),
            storage_units: storage.len(),
            gen_rows: self.master_gen.len(),
            load_rows: self.master_load.len(),
            seasons: self.seasons().into_iter().collect(),
            asset_types: types.into_iter().collect(),
        }
    }
}
