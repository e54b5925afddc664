//! # dcopf-algo: Multi-period DC-OPF Engine
//!
//! Builds and solves a time-coupled DC optimal power flow over a horizon of
//! equally spaced steps:
//!
//! | Family | Content |
//! |--------|---------|
//! | Variables | dispatch, bus angles, branch flows, storage charge/discharge/energy |
//! | Constraints | DC flow law, slack angle, thermal limits, storage dynamics, nodal balance |
//! | Objective | Σ marginal cost × dispatch |
//!
//! The LP is handed to a `good_lp` backend (Clarabel by default, HiGHS with
//! the `solver-highs` feature).
//!
//! ## Example
//!
//! ```ignore
//! use dcopf_algo::{DcopfInputs, DcopfSolver, TerminalStorage};
//!
//! let solver = DcopfSolver::new().with_terminal_storage(TerminalStorage::Pinned);
//! let outcome = solver.solve(&DcopfInputs {
//!     buses: &buses,
//!     branches: &branches,
//!     generators: &gens,
//!     demand: &demand,
//! })?;
//! if let Some(solution) = outcome.solution() {
//!     println!("Cost: {:.2}", solution.cost);
//! }
//! ```

pub mod error;
pub mod opf;

pub use error::OpfError;
pub use opf::{
    flows_exceeding, residuals, DcopfInputs, DcopfOutcome, DcopfSolution, DcopfSolver,
    FlowLimitViolation, GenerationRecord, LpSolverKind, ResidualReport, SolveStatus,
    TerminalStorage, UnitKind,
};
