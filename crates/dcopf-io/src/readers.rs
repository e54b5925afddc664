use crate::tables::{BranchRow, MasterGenRow, MasterLoadRow};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use dcopf_core::{Branch, Bus};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

fn read_rows<T: DeserializeOwned>(path: &Path, table: &str) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {} CSV {}", table, path.display()))?;
    let mut out = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        // +2: header line and 1-based numbering
        let record: T = result
            .with_context(|| format!("parsing {} record at line {}", table, idx + 2))?;
        out.push(record);
    }
    debug!(table, rows = out.len(), path = %path.display(), "loaded table");
    Ok(out)
}

/// Read `bus.csv`; only `bus_i` is used.
pub fn load_buses(path: &Path) -> Result<Vec<Bus>> {
    read_rows(path, "bus")
}

/// Read `branch.csv` (`fbus`, `tbus`, `x`, `ratea`/`rateA`).
pub fn load_branches(path: &Path) -> Result<Vec<Branch>> {
    let rows: Vec<BranchRow> = read_rows(path, "branch")?;
    Ok(rows.into_iter().map(BranchRow::into_branch).collect())
}

pub fn load_master_gen(path: &Path) -> Result<Vec<MasterGenRow>> {
    read_rows(path, "master_gen")
}

pub fn load_master_load(path: &Path) -> Result<Vec<MasterLoadRow>> {
    read_rows(path, "master_load")
}
