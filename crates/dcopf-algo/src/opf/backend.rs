//! LP backend selection and invocation.
//!
//! The solver is consumed through `good_lp`. Clarabel (pure Rust, interior
//! point) is always compiled in; HiGHS is available behind the
//! `solver-highs` feature.

use super::model::DcopfModel;
use super::types::SolveStatus;
use super::variables::{SolvedValues, VariableRegistry};
use crate::OpfError;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{Constraint, ResolutionError, Solution, SolverModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

/// LP backend driven through `good_lp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpSolverKind {
    #[default]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl LpSolverKind {
    /// Backends compiled into this build, default first.
    pub const COMPILED: &'static [LpSolverKind] = &[
        LpSolverKind::Clarabel,
        #[cfg(feature = "solver-highs")]
        LpSolverKind::Highs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }
}

impl fmt::Display for LpSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LpSolverKind {
    type Err = OpfError;

    /// Case-insensitive lookup among [`LpSolverKind::COMPILED`]; a backend
    /// left out of the build is reported as unsupported.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim().to_ascii_lowercase();
        Self::COMPILED
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| OpfError::UnsupportedSolver {
                name,
                supported: Self::COMPILED
                    .iter()
                    .map(LpSolverKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// What came back from one backend call.
#[derive(Debug, Clone)]
pub struct SolverReport {
    pub status: SolveStatus,
    /// Raw variable values; present only when `status` is optimal.
    pub values: Option<SolvedValues>,
    pub solve_time_ms: u128,
}

/// Map a `good_lp` failure onto the closed status set.
pub fn status_from_error(err: &ResolutionError) -> SolveStatus {
    match err {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        other => {
            warn!(error = %other, "LP backend stopped without a solution");
            SolveStatus::NotSolved
        }
    }
}

/// Submit `model` as one minimization problem to `kind`.
///
/// Never fails: a non-optimal outcome is carried in the report's status.
pub fn solve_model(model: DcopfModel, kind: LpSolverKind) -> SolverReport {
    let start = Instant::now();
    let (vars, registry, constraints, objective) = model.into_parts();

    let outcome = match kind {
        LpSolverKind::Clarabel => {
            let problem = vars.minimise(objective).using(clarabel);
            run(problem, constraints, &registry)
        }
        #[cfg(feature = "solver-highs")]
        LpSolverKind::Highs => {
            let problem = vars.minimise(objective).using(good_lp::solvers::highs::highs);
            run(problem, constraints, &registry)
        }
    };

    let solve_time_ms = start.elapsed().as_millis();
    match outcome {
        Ok(values) => {
            debug!(solver = kind.as_str(), solve_time_ms, "LP solved to optimality");
            SolverReport {
                status: SolveStatus::Optimal,
                values: Some(values),
                solve_time_ms,
            }
        }
        Err(err) => SolverReport {
            status: status_from_error(&err),
            values: None,
            solve_time_ms,
        },
    }
}

fn run<M>(
    problem: M,
    constraints: Vec<Constraint>,
    registry: &VariableRegistry,
) -> Result<SolvedValues, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    let problem = constraints
        .into_iter()
        .fold(problem, |problem, constraint| problem.with(constraint));
    let solution = problem.solve()?;
    Ok(registry.read(|var| solution.value(var)))
}
