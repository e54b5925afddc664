//! Time-coupled DC optimal power flow with storage.
//!
//! One call builds a fresh LP from season-filtered tables, hands it to the
//! configured backend and turns the solved values into output tables:
//!
//! ```text
//! Topology → VariableRegistry → constraints + objective → backend → extract
//! ```

mod backend;
mod constraints;
mod export;
mod extract;
mod model;
mod objective;
mod storage;
mod types;
mod validation;
mod variables;

pub use backend::{status_from_error, LpSolverKind, SolverReport};
pub use export::write_csv;
pub use model::DcopfModel;
pub use types::{
    AngleRecord, DcopfOutcome, DcopfSolution, FlowRecord, GenerationRecord, SolveStatus,
    StorageDispatchRecord, StorageLevelRecord, TerminalStorage, UnitKind,
};
pub use validation::{flows_exceeding, residuals, FlowLimitViolation, ResidualReport};
pub use variables::{SolvedValues, VariableRegistry, VariableSet};

use crate::OpfError;
use dcopf_core::{Branch, Bus, BusId, DemandRecord, GeneratorRow, Topology, TopologyOptions};
use tracing::{debug, info, warn};

/// Borrowed input tables of one engine call.
#[derive(Debug, Clone, Copy)]
pub struct DcopfInputs<'a> {
    pub buses: &'a [Bus],
    pub branches: &'a [Branch],
    pub generators: &'a [GeneratorRow],
    pub demand: &'a [DemandRecord],
}

/// DC-OPF engine configuration.
#[derive(Debug, Clone, Default)]
pub struct DcopfSolver {
    lp_solver: LpSolverKind,
    terminal: TerminalStorage,
    topology: TopologyOptions,
}

impl DcopfSolver {
    /// Clarabel, pinned terminal storage, slack bus 1, Δt = 1 h.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lp_solver(mut self, lp_solver: LpSolverKind) -> Self {
        self.lp_solver = lp_solver;
        self
    }

    pub fn with_terminal_storage(mut self, terminal: TerminalStorage) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_slack_bus(mut self, slack_bus: BusId) -> Self {
        self.topology.slack_bus = slack_bus;
        self
    }

    /// Set the time step length in hours
    pub fn with_delta_t(mut self, delta_t_hours: f64) -> Self {
        self.topology.delta_t_hours = delta_t_hours;
        self
    }

    pub fn with_topology_options(mut self, options: TopologyOptions) -> Self {
        self.topology = options;
        self
    }

    pub fn lp_solver(&self) -> LpSolverKind {
        self.lp_solver
    }

    pub fn terminal_storage(&self) -> TerminalStorage {
        self.terminal
    }

    pub fn topology_options(&self) -> &TopologyOptions {
        &self.topology
    }

    /// Build the index sets for `inputs` and solve.
    ///
    /// Errors only on invalid data (including
    /// [`GridError::MissingData`](dcopf_core::GridError::MissingData)); a
    /// non-optimal solve is returned as [`DcopfOutcome::NotOptimal`].
    pub fn solve(&self, inputs: &DcopfInputs<'_>) -> Result<DcopfOutcome, OpfError> {
        let topology = Topology::build(
            inputs.buses,
            inputs.branches,
            inputs.generators,
            inputs.demand,
            &self.topology,
        )?;
        Ok(self.solve_topology(&topology))
    }

    /// Solve on an already built topology.
    pub fn solve_topology(&self, topology: &Topology) -> DcopfOutcome {
        let model = DcopfModel::build(topology, self.terminal);
        debug!(
            solver = self.lp_solver.as_str(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "submitting DC-OPF"
        );

        let report = backend::solve_model(model, self.lp_solver);
        match report.values {
            Some(values) if report.status.is_optimal() => {
                let solution = extract::extract_solution(topology, &values, report.solve_time_ms);
                info!(
                    cost = solution.cost,
                    steps = topology.time().len(),
                    solve_time_ms = report.solve_time_ms,
                    "DC-OPF solved"
                );
                DcopfOutcome::Solved(solution)
            }
            _ => {
                warn!(status = %report.status, "DC-OPF did not reach an optimal solution");
                DcopfOutcome::NotOptimal(report.status)
            }
        }
    }
}
