//! Seasonal scenario orchestration.
//!
//! **Algorithm (per scenario):**
//! 1. Resolve asset types to generator ids; an unknown type skips the scenario.
//! 2. For each season of the schedule, slice the master tables, build the
//!    topology and solve the DC-OPF.
//! 3. On an optimal season, compute per-asset metrics and fold cost and
//!    metrics into the annual accumulator with the season weight.
//! 4. On a non-optimal season or a data error, stop: the scenario's annual
//!    cost is undefined and the batch moves on.
//!
//! Scenarios are independent; with `threads != 1` they run on a dedicated
//! rayon pool while seasons inside a scenario stay sequential.

use crate::catalog::AssetCatalog;
use crate::metrics::{season_metrics, AnnualAccumulator, AssetMetrics};
use crate::report::sanitize_name;
use crate::season::{
    build_demand_time_series, build_gen_time_series, ids_in, SeasonSchedule, SeasonWeight,
};
use crate::spec::Scenario;
use anyhow::{Context, Result};
use dcopf_algo::{
    flows_exceeding, DcopfOutcome, DcopfSolution, DcopfSolver, FlowLimitViolation, SolveStatus,
};
use dcopf_core::Topology;
use dcopf_io::GridDataset;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything an orchestration run needs besides the data.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub seasons: SeasonSchedule,
    pub solver: DcopfSolver,
    /// Worker threads for scenarios; 1 runs sequentially, 0 uses every core.
    pub threads: usize,
    /// Per-scenario result tables are written below this directory when set.
    pub output_dir: Option<PathBuf>,
    /// Slack allowed before a flow counts as exceeding its limit.
    pub flow_tolerance: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            seasons: SeasonSchedule::default(),
            solver: DcopfSolver::new(),
            threads: 1,
            output_dir: None,
            flow_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every season solved to optimality.
    Completed,
    /// A season came back infeasible, unbounded or unsolved.
    NotOptimal,
    /// A season's inputs were invalid (e.g. missing generator rows).
    Failed,
    /// The scenario could not be resolved against the asset catalog.
    Skipped,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Completed => "completed",
            ScenarioStatus::NotOptimal => "not_optimal",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: String,
    pub weight: f64,
    /// `None` when the season failed before reaching the solver.
    pub status: Option<SolveStatus>,
    pub cost: Option<f64>,
    pub solve_time_ms: Option<u128>,
    #[serde(default)]
    pub flows_exceeding: usize,
}

impl SeasonReport {
    fn unsolved(season: &SeasonWeight, status: Option<SolveStatus>) -> Self {
        Self {
            season: season.name.clone(),
            weight: season.weight,
            status,
            cost: None,
            solve_time_ms: None,
            flows_exceeding: 0,
        }
    }
}

/// Annual figures of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    #[serde(flatten)]
    pub metrics: AssetMetrics,
    pub capacity_factor: f64,
}

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario_name: String,
    pub status: ScenarioStatus,
    /// Σ season cost × weight; undefined unless every season was optimal.
    pub annual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub seasons: Vec<SeasonReport>,
    #[serde(default)]
    pub assets: BTreeMap<String, AssetSummary>,
}

impl ScenarioRecord {
    fn completed(name: &str, annual: AnnualAccumulator, seasons: Vec<SeasonReport>) -> Self {
        let assets = annual
            .assets
            .iter()
            .map(|(asset, metrics)| {
                (
                    asset.clone(),
                    AssetSummary {
                        metrics: *metrics,
                        capacity_factor: metrics.capacity_factor(),
                    },
                )
            })
            .collect();
        Self {
            scenario_name: name.to_string(),
            status: ScenarioStatus::Completed,
            annual_cost: Some(annual.annual_cost),
            message: None,
            seasons,
            assets,
        }
    }

    fn aborted(
        name: &str,
        status: ScenarioStatus,
        seasons: Vec<SeasonReport>,
        message: String,
    ) -> Self {
        Self {
            scenario_name: name.to_string(),
            status,
            annual_cost: None,
            message: Some(message),
            seasons,
            assets: BTreeMap::new(),
        }
    }
}

/// Runs scenarios against one set of master tables.
pub struct ScenarioOrchestrator<'a> {
    dataset: &'a GridDataset,
    catalog: AssetCatalog,
    config: OrchestratorConfig,
}

impl<'a> ScenarioOrchestrator<'a> {
    pub fn new(dataset: &'a GridDataset, config: OrchestratorConfig) -> Self {
        Self {
            catalog: AssetCatalog::from_master(&dataset.master_gen),
            dataset,
            config,
        }
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run every scenario; records come back in input order.
    ///
    /// Only I/O failures while writing result tables abort the batch.
    pub fn run(&self, scenarios: &[Scenario]) -> Result<Vec<ScenarioRecord>> {
        if self.config.threads == 1 {
            return scenarios.iter().map(|s| self.run_scenario(s)).collect();
        }

        let thread_count = if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .context("building Rayon thread pool for scenario runs")?;
        debug!(threads = thread_count, scenarios = scenarios.len(), "running scenarios in parallel");
        pool.install(|| {
            scenarios
                .par_iter()
                .map(|s| self.run_scenario(s))
                .collect()
        })
    }

    pub fn run_scenario(&self, scenario: &Scenario) -> Result<ScenarioRecord> {
        let name = scenario.name.as_str();
        let placement = match self.catalog.resolve(scenario) {
            Ok(placement) => placement,
            Err(err) => {
                warn!(scenario = name, error = %err, "skipping scenario");
                return Ok(ScenarioRecord::aborted(
                    name,
                    ScenarioStatus::Skipped,
                    Vec::new(),
                    err.to_string(),
                ));
            }
        };
        placement.warn_duplicates(name);
        info!(
            scenario = name,
            assets = placement.entries().len(),
            load_factor = scenario.load_factor,
            "processing scenario"
        );

        let scenario_dir = self
            .config
            .output_dir
            .as_ref()
            .map(|root| root.join(sanitize_name(name)));
        let mut annual = AnnualAccumulator::new();
        let mut seasons = Vec::with_capacity(self.config.seasons.seasons().len());

        for season in self.config.seasons.seasons() {
            let gen_rows = build_gen_time_series(&self.dataset.master_gen, &placement, &season.name);
            let demand = build_demand_time_series(
                &self.dataset.master_load,
                scenario.load_factor,
                &season.name,
            );
            debug!(
                scenario = name,
                season = %season.name,
                generators = ids_in(&gen_rows).len(),
                demand_rows = demand.len(),
                "built season slice"
            );

            let topology = match Topology::build(
                &self.dataset.buses,
                &self.dataset.branches,
                &gen_rows,
                &demand,
                self.config.solver.topology_options(),
            ) {
                Ok(topology) => topology,
                Err(err) => {
                    warn!(scenario = name, season = %season.name, error = %err, "season failed");
                    seasons.push(SeasonReport::unsolved(season, None));
                    return Ok(ScenarioRecord::aborted(
                        name,
                        ScenarioStatus::Failed,
                        seasons,
                        format!("season '{}': {}", season.name, err),
                    ));
                }
            };

            let solution = match self.config.solver.solve_topology(&topology) {
                DcopfOutcome::Solved(solution) => solution,
                DcopfOutcome::NotOptimal(status) => {
                    warn!(scenario = name, season = %season.name, %status, "season not optimal");
                    seasons.push(SeasonReport::unsolved(season, Some(status)));
                    return Ok(ScenarioRecord::aborted(
                        name,
                        ScenarioStatus::NotOptimal,
                        seasons,
                        format!("season '{}' ended {}", season.name, status),
                    ));
                }
            };

            let violations = flows_exceeding(&topology, &solution, self.config.flow_tolerance);
            if !violations.is_empty() {
                warn!(
                    scenario = name,
                    season = %season.name,
                    count = violations.len(),
                    "flows exceed branch limits"
                );
            }
            if let Some(dir) = &scenario_dir {
                write_season_outputs(dir, &season.name, &solution, &violations)?;
            }

            let metrics = season_metrics(&solution, &gen_rows, &self.catalog);
            annual.add_season(season.weight, solution.cost, &metrics);
            info!(scenario = name, season = %season.name, cost = solution.cost, "season optimal");

            seasons.push(SeasonReport {
                season: season.name.clone(),
                weight: season.weight,
                status: Some(solution.status),
                cost: Some(solution.cost),
                solve_time_ms: Some(solution.solve_time_ms),
                flows_exceeding: violations.len(),
            });
        }

        info!(scenario = name, annual_cost = annual.annual_cost, "scenario completed");
        Ok(ScenarioRecord::completed(name, annual, seasons))
    }
}

fn write_season_outputs(
    dir: &Path,
    season: &str,
    solution: &DcopfSolution,
    violations: &[FlowLimitViolation],
) -> Result<()> {
    let written = solution
        .write_tables(dir, season, violations)
        .with_context(|| format!("writing {} tables to '{}'", season, dir.display()))?;
    debug!(season, files = written.len(), dir = %dir.display(), "wrote season tables");
    Ok(())
}
