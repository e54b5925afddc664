//! # dcopf-io: Grid Table Readers
//!
//! Reads the master CSV tables a seasonal DC-OPF batch runs on:
//!
//! | File | Columns |
//! |------|---------|
//! | `bus.csv` | `bus_i` |
//! | `branch.csv` | `fbus`, `tbus`, `x`, `ratea` (or `rateA`) |
//! | `master_gen.csv` | `id`, `time`, `bus`, `pmin`, `pmax`, `gencost`, `emax`, `einitial`, `eta`, `season`, `type` |
//! | `master_load.csv` | `bus`, `time`, `pd`, `season` |
//!
//! Extra columns are ignored. Malformed rows fail the whole load with the
//! table name and line number in the error chain.

pub mod dataset;
pub mod readers;
pub mod tables;

pub use dataset::{DatasetSummary, GridDataset};
pub use readers::{load_branches, load_buses, load_master_gen, load_master_load};
pub use tables::{BranchRow, MasterGenRow, MasterLoadRow};
