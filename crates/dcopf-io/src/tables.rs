//! Row layouts of the input CSV tables.

use chrono::NaiveDateTime;
use dcopf_core::time::timestamp;
use dcopf_core::{Branch, BusId, DemandRecord, GenId, GeneratorRow};
use serde::{Deserialize, Serialize};

/// `branch.csv` row. Reactance is converted to susceptance on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRow {
    pub fbus: BusId,
    pub tbus: BusId,
    pub x: f64,
    #[serde(alias = "rateA")]
    pub ratea: f64,
}

impl BranchRow {
    pub fn into_branch(self) -> Branch {
        Branch::from_reactance(self.fbus, self.tbus, self.x, self.ratea)
    }
}

/// `master_gen.csv` row: a generator time series for every season and
/// candidate asset, labelled with its season and asset type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterGenRow {
    pub id: GenId,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub bus: BusId,
    pub pmin: f64,
    pub pmax: f64,
    pub gencost: f64,
    // Storage columns are blank for plain generators in some exports.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub emax: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub einitial: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub eta: Option<f64>,
    pub season: String,
    #[serde(rename = "type")]
    pub asset_type: String,
}

impl MasterGenRow {
    /// Engine row for this record, homed at `bus`.
    pub fn to_generator(&self, bus: BusId) -> GeneratorRow {
        GeneratorRow {
            id: self.id,
            time: self.time,
            bus,
            pmin: self.pmin,
            pmax: self.pmax,
            gencost: self.gencost,
            emax: self.emax.unwrap_or(0.0),
            einitial: self.einitial.unwrap_or(0.0),
            eta: self.eta.unwrap_or(1.0),
        }
    }

    pub fn is_storage(&self) -> bool {
        self.emax.unwrap_or(0.0) > 0.0
    }
}

/// `master_load.csv` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterLoadRow {
    pub bus: BusId,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub pd: f64,
    pub season: String,
}

impl MasterLoadRow {
    /// Demand record with `pd` multiplied by `load_factor`.
    pub fn scaled(&self, load_factor: f64) -> DemandRecord {
        DemandRecord::new(self.bus, self.time, self.pd * load_factor)
    }
}
