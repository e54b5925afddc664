//! TOML run configuration.
//!
//! ```toml
//! data_dir = "data"
//! results_dir = "results"
//! scenarios = "data/scenarios_parameters.csv"
//! threads = 4
//!
//! [engine]
//! lp_solver = "clarabel"
//! terminal_storage = "pinned"
//! slack_bus = 1
//! delta_t_hours = 1.0
//!
//! [[seasons]]
//! name = "winter"
//! weight = 13.0
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use crate::cli::{DataArgs, EngineArgs};
use anyhow::{bail, Context, Result};
use dcopf_algo::{DcopfSolver, LpSolverKind, TerminalStorage};
use dcopf_core::BusId;
use dcopf_scenarios::{OrchestratorConfig, SeasonSchedule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario table looked up in the data directory when none is configured.
pub const DEFAULT_SCENARIO_FILE: &str = "scenarios_parameters.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Defaults to `<data_dir>/scenarios_parameters.csv`.
    #[serde(default)]
    pub scenarios: Option<PathBuf>,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_flow_tolerance")]
    pub flow_tolerance: f64,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub seasons: SeasonSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_lp_solver")]
    pub lp_solver: String,
    #[serde(default = "default_terminal_storage")]
    pub terminal_storage: String,
    #[serde(default = "default_slack_bus")]
    pub slack_bus: usize,
    #[serde(default = "default_delta_t")]
    pub delta_t_hours: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            scenarios: None,
            threads: default_threads(),
            flow_tolerance: default_flow_tolerance(),
            engine: EngineConfig::default(),
            seasons: SeasonSchedule::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lp_solver: default_lp_solver(),
            terminal_storage: default_terminal_storage(),
            slack_bus: default_slack_bus(),
            delta_t_hours: default_delta_t(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_threads() -> usize {
    1
}

fn default_flow_tolerance() -> f64 {
    1e-6
}

fn default_lp_solver() -> String {
    LpSolverKind::default().as_str().to_string()
}

fn default_terminal_storage() -> String {
    "pinned".to_string()
}

fn default_slack_bus() -> usize {
    1
}

fn default_delta_t() -> f64 {
    1.0
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading run configuration '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing run configuration '{}'", path.display()))
    }

    /// The file at `path`, or defaults when no file was given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_data_args(&mut self, args: &DataArgs) {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(out) = &args.out {
            self.results_dir = out.clone();
        }
    }

    pub fn apply_engine_args(&mut self, args: &EngineArgs) {
        if let Some(lp_solver) = &args.lp_solver {
            self.engine.lp_solver = lp_solver.clone();
        }
        if let Some(terminal) = &args.terminal_storage {
            self.engine.terminal_storage = terminal.clone();
        }
        if let Some(slack_bus) = args.slack_bus {
            self.engine.slack_bus = slack_bus;
        }
        if let Some(delta_t) = args.delta_t {
            self.engine.delta_t_hours = delta_t;
        }
    }

    pub fn scenarios_path(&self) -> PathBuf {
        self.scenarios
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_SCENARIO_FILE))
    }

    pub fn solver(&self) -> Result<DcopfSolver> {
        let lp_solver: LpSolverKind = self.engine.lp_solver.parse()?;
        let terminal: TerminalStorage = self
            .engine
            .terminal_storage
            .parse()
            .map_err(anyhow::Error::msg)?;
        let delta_t = self.engine.delta_t_hours;
        if !(delta_t.is_finite() && delta_t > 0.0) {
            bail!("delta_t_hours must be a positive number, got {}", delta_t);
        }
        Ok(DcopfSolver::new()
            .with_lp_solver(lp_solver)
            .with_terminal_storage(terminal)
            .with_slack_bus(BusId::new(self.engine.slack_bus))
            .with_delta_t(delta_t))
    }

    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig> {
        if self.seasons.is_empty() {
            bail!("season schedule is empty");
        }
        Ok(OrchestratorConfig {
            seasons: self.seasons.clone(),
            solver: self.solver()?,
            threads: self.threads,
            output_dir: Some(self.results_dir.clone()),
            flow_tolerance: self.flow_tolerance,
        })
    }
}
