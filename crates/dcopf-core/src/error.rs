//! Error types for grid and time-series validation
//!
//! [`GridError`] covers everything that can go wrong while turning raw tables
//! into a [`Topology`](crate::Topology). The DC-OPF engine wraps it, and the
//! scenario orchestrator inspects it to tell a missing generator row (a season
//! failure) apart from other data problems.

use crate::{BusId, GenId};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised while building typed records and index sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A declared generator has no row for a time step of the index.
    #[error("missing generator data for gen={generator}, time={time}")]
    MissingData {
        generator: GenId,
        time: NaiveDateTime,
    },

    /// The configured slack bus is not part of the bus table.
    #[error("slack bus {0} not found in bus table")]
    UnknownSlackBus(BusId),

    /// Structural problems with the input tables.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Values that could not be parsed (timestamps, literals).
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GridError {
    /// True for the one error kind the orchestrator treats as a season failure
    /// rather than a malformed table.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, GridError::MissingData { .. })
    }
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;
