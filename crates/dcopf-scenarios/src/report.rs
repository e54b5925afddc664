//! Batch outputs: the wide `scenario_results.csv` table and a JSON manifest.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;

use crate::orchestrator::{AssetSummary, ScenarioRecord, ScenarioStatus};
use crate::season::SeasonWeight;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioManifest {
    pub created_at: DateTime<Utc>,
    pub seasons: Vec<SeasonWeight>,
    pub num_scenarios: usize,
    pub summary: RunSummary,
    pub scenarios: Vec<ScenarioRecord>,
}

impl ScenarioManifest {
    pub fn new(seasons: &[SeasonWeight], scenarios: Vec<ScenarioRecord>) -> Self {
        Self {
            created_at: Utc::now(),
            seasons: seasons.to_vec(),
            num_scenarios: scenarios.len(),
            summary: RunSummary::from_records(&scenarios),
            scenarios,
        }
    }
}

/// Scenario counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub completed: usize,
    pub not_optimal: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_records(records: &[ScenarioRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                ScenarioStatus::Completed => summary.completed += 1,
                ScenarioStatus::NotOptimal => summary.not_optimal += 1,
                ScenarioStatus::Failed => summary.failed += 1,
                ScenarioStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.completed + self.not_optimal + self.failed + self.skipped
    }
}

/// File-system safe directory name for a scenario.
pub fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "scenario".to_string();
    }
    trimmed.replace(['/', '\\'], "_")
}

/// Write one row per scenario.
///
/// Columns: `scenario_name`, `annual_cost`, `status`, then `gen_<asset>`,
/// `gen_cost_<asset>`, `avail_gen_<asset>`, `remaining_<asset>` and
/// `capacity_factor_<asset>` over every asset seen in the batch. Cells are
/// empty where a value is undefined.
pub fn write_scenario_results_csv(path: &Path, records: &[ScenarioRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating results directory '{}'", parent.display()))?;
    }
    let assets: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.assets.keys().map(String::as_str))
        .collect();

    let mut header = vec![
        "scenario_name".to_string(),
        "annual_cost".to_string(),
        "status".to_string(),
    ];
    for prefix in ["gen", "gen_cost", "avail_gen", "remaining", "capacity_factor"] {
        header.extend(assets.iter().map(|asset| format!("{}_{}", prefix, asset)));
    }

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating scenario results '{}'", path.display()))?;
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.scenario_name.clone(),
            record
                .annual_cost
                .map(|cost| format!("{:.1}", cost))
                .unwrap_or_default(),
            record.status.as_str().to_string(),
        ];
        let cell = |asset: &str, value: fn(&AssetSummary) -> f64, digits: usize| {
            record
                .assets
                .get(asset)
                .map(|summary| format!("{:.*}", digits, value(summary)))
                .unwrap_or_default()
        };
        row.extend(assets.iter().map(|&a| cell(a, |s| s.metrics.generation, 1)));
        row.extend(assets.iter().map(|&a| cell(a, |s| s.metrics.generation_cost, 1)));
        row.extend(assets.iter().map(|&a| cell(a, |s| s.metrics.available, 1)));
        row.extend(assets.iter().map(|&a| cell(a, |s| s.metrics.remaining, 1)));
        row.extend(assets.iter().map(|&a| cell(a, |s| s.capacity_factor, 2)));
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing scenario results '{}'", path.display()))?;
    Ok(())
}

pub fn write_scenario_manifest(path: &Path, manifest: &ScenarioManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(manifest).context("serializing scenario manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing scenario manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_scenario_manifest(path: &Path) -> Result<ScenarioManifest> {
    let file = File::open(path)
        .with_context(|| format!("opening scenario manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing scenario manifest '{}'", path.display()))
}
