//! # dcopf-scenarios: Seasonal Scenario Orchestration
//!
//! Turns scenario definitions (asset types placed on buses plus a demand
//! scale) into seasonal DC-OPF runs and weights the seasonal results into
//! annual figures.
//!
//! ## Pipeline
//!
//! ```text
//! scenarios file ──► Scenario ──► Placement (asset type → generator id)
//!                                   │
//!             master tables ──► season slices ──► DcopfSolver
//!                                                   │
//!                    AnnualAccumulator ◄── season metrics
//!                                   │
//!                 scenario_results.csv + manifest.json
//! ```
//!
//! ## Modules
//!
//! - [`spec`] - Scenario files (parameter CSV, YAML, JSON)
//! - [`catalog`] - Asset type ↔ generator id lookups
//! - [`season`] - Season schedule and per-season slices
//! - [`metrics`] - Per-asset metrics and annual weighting
//! - [`orchestrator`] - Scenario runner
//! - [`report`] - Result tables and manifest

pub mod catalog;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod season;
pub mod spec;

pub use catalog::{AssetCatalog, Placement};
pub use error::ScenarioError;
pub use metrics::{season_metrics, AnnualAccumulator, AssetMetrics};
pub use orchestrator::{
    AssetSummary, OrchestratorConfig, ScenarioOrchestrator, ScenarioRecord, ScenarioStatus,
    SeasonReport,
};
pub use report::{
    load_scenario_manifest, sanitize_name, write_scenario_manifest, write_scenario_results_csv,
    RunSummary, ScenarioManifest,
};
pub use season::{build_demand_time_series, build_gen_time_series, SeasonSchedule, SeasonWeight};
pub use spec::{load_scenarios, resolve_scenarios, Positions, Scenario, ScenarioSet, ScenarioSpec};
