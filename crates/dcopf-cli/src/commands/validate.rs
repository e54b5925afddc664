use crate::config::RunConfig;
use anyhow::{bail, Context, Result};
use dcopf_core::count_islands;
use dcopf_io::{DatasetSummary, GridDataset};
use dcopf_scenarios::{load_scenarios, AssetCatalog};
use tracing::{info, warn};

/// Load the master tables, print their summary as JSON and resolve the
/// scenario file against the asset catalog.
///
/// The scenario file is only required when one was configured explicitly;
/// otherwise the default `scenarios_parameters.csv` is checked if present.
pub fn handle(config: &RunConfig) -> Result<DatasetSummary> {
    let dataset = GridDataset::load_dir(&config.data_dir)
        .with_context(|| format!("loading grid data from '{}'", config.data_dir.display()))?;
    let summary = dataset.summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing dataset summary")?
    );

    let islands = count_islands(&dataset.buses, &dataset.branches);
    if islands.len() > 1 {
        warn!(islands = islands.len(), "network is not connected");
    }

    let path = config.scenarios_path();
    if config.scenarios.is_none() && !path.exists() {
        info!(file = %path.display(), "no scenario file to check");
        return Ok(summary);
    }
    let scenarios = load_scenarios(&path)?;
    let catalog = AssetCatalog::from_master(&dataset.master_gen);
    let problems: Vec<String> = scenarios
        .iter()
        .filter_map(|scenario| catalog.resolve(scenario).err())
        .map(|err| err.to_string())
        .collect();
    if !problems.is_empty() {
        bail!(
            "{} of {} scenarios reference unknown assets:\n  {}",
            problems.len(),
            scenarios.len(),
            problems.join("\n  ")
        );
    }
    println!("{} scenarios resolve against the asset catalog", scenarios.len());
    Ok(summary)
}
