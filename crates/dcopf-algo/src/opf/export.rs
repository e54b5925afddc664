//! CSV and JSON export of DC-OPF results.

use super::types::DcopfSolution;
use super::validation::FlowLimitViolation;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `rows` to `path` with a header taken from the record fields.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV writer for {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("writing CSV record to {}", path.display()))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

impl DcopfSolution {
    /// Export to JSON format
    pub fn to_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("serializing DcopfSolution to JSON")?;
        fs::write(path, json).with_context(|| format!("writing JSON to {}", path.display()))?;
        Ok(())
    }

    /// Write the per-horizon tables into `dir` as `<table>_<suffix>.csv`.
    ///
    /// `flows_exceeding_<suffix>.csv` is only written when `violations` is
    /// non-empty. Returns the files written, in order.
    pub fn write_tables(
        &self,
        dir: &Path,
        suffix: &str,
        violations: &[FlowLimitViolation],
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;

        let path = |table: &str| dir.join(format!("{}_{}.csv", table, suffix));
        let mut written = vec![
            path("generation"),
            path("angles"),
            path("flows"),
            path("storage"),
            path("storage_dispatch"),
        ];
        write_csv(&written[0], &self.generation)?;
        write_csv(&written[1], &self.angles)?;
        write_csv(&written[2], &self.flows)?;
        write_csv(&written[3], &self.storage_levels)?;
        write_csv(&written[4], &self.storage_dispatch)?;
        if !violations.is_empty() {
            let exceeding = path("flows_exceeding");
            write_csv(&exceeding, violations)?;
            written.push(exceeding);
        }

        Ok(written)
    }
}
