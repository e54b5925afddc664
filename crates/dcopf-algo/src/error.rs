use dcopf_core::GridError;
use thiserror::Error;

/// DC-OPF errors.
///
/// A non-optimal solve is not an error: it is reported through
/// [`SolveStatus`](crate::SolveStatus) so callers can keep going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpfError {
    /// Input tables could not be turned into a model
    #[error("DC-OPF data validation: {0}")]
    Data(#[from] GridError),

    /// Solver name not known or not compiled in
    #[error("unknown lp solver '{name}'; supported values: {supported}")]
    UnsupportedSolver { name: String, supported: String },
}

impl OpfError {
    /// A generator row was missing for some (id, time) pair.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, OpfError::Data(err) if err.is_missing_data())
    }
}
