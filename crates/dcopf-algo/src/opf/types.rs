use std::fmt;

use chrono::NaiveDateTime;
use dcopf_core::time::timestamp;
use dcopf_core::{BusId, GenId};
use serde::{Deserialize, Serialize};

/// Outcome reported by the LP backend.
///
/// Only [`SolveStatus::Optimal`] counts as success; every other value means
/// the run produced no usable dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend stopped without a certificate (iteration limit, numerical trouble).
    NotSolved,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::NotSolved => "not_solved",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint applied to each storage unit's energy level at the end of the
/// horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStorage {
    /// Final level equals the initial level; each horizon is a closed cycle.
    #[default]
    Pinned,
    /// Final level may end above, never below, the initial level.
    AtLeastInitial,
    /// Only the [0, capacity] bound applies.
    Free,
}

impl std::str::FromStr for TerminalStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pinned" | "pin" => Ok(TerminalStorage::Pinned),
            "at_least_initial" | "bounded" => Ok(TerminalStorage::AtLeastInitial),
            "free" => Ok(TerminalStorage::Free),
            other => Err(format!("Unknown terminal storage policy: {}", other)),
        }
    }
}

/// Which kind of unit produced a generation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Dispatchable,
    Storage,
}

/// Output of one unit at one time step. For storage units `gen` is the net
/// output, discharge minus charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub id: GenId,
    pub node: BusId,
    pub gen: f64,
    pub kind: UnitKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleRecord {
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub bus: BusId,
    pub theta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub flow: f64,
}

/// Charge and discharge power of a storage unit during one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDispatchRecord {
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub id: GenId,
    pub charge: f64,
    pub discharge: f64,
}

/// Energy level of a storage unit at the start of an extended time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLevelRecord {
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub id: GenId,
    pub energy: f64,
}

/// Result bundle of one optimal DC-OPF run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcopfSolution {
    // === Status ===
    pub status: SolveStatus,
    pub solve_time_ms: u128,
    pub delta_t_hours: f64,

    // === Objective ===
    pub cost: f64,

    // === Tables ===
    pub generation: Vec<GenerationRecord>,
    pub angles: Vec<AngleRecord>,
    pub flows: Vec<FlowRecord>,
    pub storage_dispatch: Vec<StorageDispatchRecord>,
    pub storage_levels: Vec<StorageLevelRecord>,
}

impl DcopfSolution {
    /// Output of `id` at `time`, if the unit appears in the generation table.
    pub fn generation_of(&self, id: GenId, time: NaiveDateTime) -> Option<f64> {
        self.generation
            .iter()
            .find(|r| r.id == id && r.time == time)
            .map(|r| r.gen)
    }

    pub fn angle_of(&self, bus: BusId, time: NaiveDateTime) -> Option<f64> {
        self.angles
            .iter()
            .find(|r| r.bus == bus && r.time == time)
            .map(|r| r.theta)
    }

    pub fn flow_of(&self, from_bus: BusId, to_bus: BusId, time: NaiveDateTime) -> Option<f64> {
        self.flows
            .iter()
            .find(|r| r.from_bus == from_bus && r.to_bus == to_bus && r.time == time)
            .map(|r| r.flow)
    }

    pub fn energy_of(&self, id: GenId, time: NaiveDateTime) -> Option<f64> {
        self.storage_levels
            .iter()
            .find(|r| r.id == id && r.time == time)
            .map(|r| r.energy)
    }
}

/// Result of one engine invocation: either a full solution or the
/// non-optimal status the backend reported.
#[derive(Debug, Clone)]
pub enum DcopfOutcome {
    Solved(DcopfSolution),
    NotOptimal(SolveStatus),
}

impl DcopfOutcome {
    pub fn status(&self) -> SolveStatus {
        match self {
            DcopfOutcome::Solved(solution) => solution.status,
            DcopfOutcome::NotOptimal(status) => *status,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status().is_optimal()
    }

    pub fn solution(&self) -> Option<&DcopfSolution> {
        match self {
            DcopfOutcome::Solved(solution) => Some(solution),
            DcopfOutcome::NotOptimal(_) => None,
        }
    }

    pub fn into_solution(self) -> Option<DcopfSolution> {
        match self {
            DcopfOutcome::Solved(solution) => Some(solution),
            DcopfOutcome::NotOptimal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimal_counts_as_success() {
        assert!(SolveStatus::Optimal.is_optimal());
        assert!(!SolveStatus::Infeasible.is_optimal());
        assert!(!SolveStatus::Unbounded.is_optimal());
        assert!(!SolveStatus::NotSolved.is_optimal());
        assert!(!DcopfOutcome::NotOptimal(SolveStatus::Infeasible).is_optimal());
    }

    #[test]
    fn status_serializes_in_snake_case() {
        let json = serde_json::to_string(&SolveStatus::NotSolved).unwrap();
        assert_eq!(json, "\"not_solved\"");
        assert_eq!(SolveStatus::Infeasible.to_string(), "infeasible");
    }

    #[test]
    fn terminal_storage_parses_aliases() {
        assert_eq!("pinned".parse::<TerminalStorage>().unwrap(), TerminalStorage::Pinned);
        assert_eq!(
            "at-least-initial".parse::<TerminalStorage>().unwrap(),
            TerminalStorage::AtLeastInitial
        );
        assert_eq!("Free".parse::<TerminalStorage>().unwrap(), TerminalStorage::Free);
        assert!("loose".parse::<TerminalStorage>().is_err());
        assert_eq!(TerminalStorage::default(), TerminalStorage::Pinned);
    }
}
