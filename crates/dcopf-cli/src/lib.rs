//! Command-line front end for the seasonal DC-OPF scenario runner.
//!
//! - `dcopf run` runs every scenario over the season schedule
//! - `dcopf solve` solves a single season of the master tables
//! - `dcopf validate` checks the master tables and the scenario file

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, DataArgs, EngineArgs};
pub use config::{EngineConfig, RunConfig};
