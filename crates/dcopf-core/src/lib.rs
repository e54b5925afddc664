//! # dcopf-core: Grid and Time-Series Model Core
//!
//! Typed records and index sets shared by the DC-OPF engine and the scenario
//! orchestrator.
//!
//! ## Design Philosophy
//!
//! Raw tables (bus, branch, generator time series, demand time series) are
//! normalized exactly once into a [`Topology`]. Everything downstream works on
//! typed records and precomputed membership lookups instead of filtering the
//! raw tables over and over during model assembly.
//!
//! ```rust,no_run
//! use dcopf_core::*;
//!
//! let buses = vec![Bus::new(BusId::new(1)), Bus::new(BusId::new(2))];
//! let branches = vec![Branch::from_reactance(BusId::new(1), BusId::new(2), 0.1, 100.0)];
//! let gens: Vec<GeneratorRow> = Vec::new();
//! let demand: Vec<DemandRecord> = Vec::new();
//!
//! let topology = Topology::build(&buses, &branches, &gens, &demand, &TopologyOptions::default());
//! ```
//!
//! ## ID System
//!
//! Bus and generator identifiers are newtype wrappers around `usize` so a bus
//! id can never be passed where a generator id is expected. Both serialize
//! transparently as plain integers, matching the CSV schemas.
//!
//! ## Modules
//!
//! - [`records`] - Bus, branch, generator, storage and demand records
//! - [`time`] - Time index and timestamp parsing
//! - [`topology`] - Index builder and per-bus membership lookups
//! - [`graph_utils`] - Island detection for diagnostics
//! - [`error`] - [`GridError`]

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod graph_utils;
pub mod records;
pub mod time;
pub mod topology;

pub use error::{GridError, GridResult};
pub use graph_utils::{count_islands, IslandSummary};
pub use records::{Branch, Bus, DemandRecord, GeneratorRow, Offer, StorageUnit};
pub use time::{parse_timestamp, TimeIndex};
pub use topology::{Topology, TopologyOptions};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl GenId {
    #[inline]
    pub fn new(value: usize) -> Self {
        GenId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
