use crate::config::RunConfig;
use anyhow::{Context, Result};
use dcopf_io::GridDataset;
use dcopf_scenarios::{
    load_scenarios, write_scenario_manifest, write_scenario_results_csv, RunSummary,
    ScenarioManifest, ScenarioOrchestrator,
};
use std::time::Instant;
use tracing::info;

pub const RESULTS_CSV: &str = "scenario_results.csv";
pub const RESULTS_JSON: &str = "scenario_results.json";

/// Run every scenario and write `scenario_results.csv` and
/// `scenario_results.json` into the results directory.
pub fn handle(config: &RunConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let dataset = GridDataset::load_dir(&config.data_dir)
        .with_context(|| format!("loading grid data from '{}'", config.data_dir.display()))?;
    let scenarios_path = config.scenarios_path();
    let scenarios = load_scenarios(&scenarios_path)?;
    info!(
        scenarios = scenarios.len(),
        file = %scenarios_path.display(),
        "loaded scenarios"
    );

    let orchestrator = ScenarioOrchestrator::new(&dataset, config.orchestrator_config()?);
    let records = orchestrator.run(&scenarios)?;

    let csv_path = config.results_dir.join(RESULTS_CSV);
    write_scenario_results_csv(&csv_path, &records)?;
    let manifest = ScenarioManifest::new(config.seasons.seasons(), records);
    write_scenario_manifest(&config.results_dir.join(RESULTS_JSON), &manifest)?;

    for record in &manifest.scenarios {
        let cost = record
            .annual_cost
            .map(|cost| format!("{:.1}", cost))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<32} {:>16} {}", record.scenario_name, cost, record.status.as_str());
    }

    let summary = manifest.summary;
    info!(
        completed = summary.completed,
        not_optimal = summary.not_optimal,
        failed = summary.failed,
        skipped = summary.skipped,
        results = %csv_path.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scenario batch finished"
    );
    Ok(summary)
}
