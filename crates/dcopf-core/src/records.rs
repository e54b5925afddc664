//! Typed per-entity records.
//!
//! Column names follow the CSV schemas (`bus_i`, `fbus`, `tbus`, `pmin`, ...)
//! through serde renames so the same structs serve both the readers in
//! `dcopf-io` and the in-memory model.

use crate::time::timestamp;
use crate::{BusId, GenId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    #[serde(rename = "bus_i")]
    pub id: BusId,
}

impl Bus {
    pub fn new(id: BusId) -> Self {
        Self { id }
    }
}

/// Transmission branch between two buses.
///
/// Direction matters: a branch is declared once per ordered pair and its flow
/// is positive from `from_bus` to `to_bus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// b = 1/x (per unit)
    pub susceptance: f64,
    /// Symmetric flow limit.
    pub rate_a: f64,
}

impl Branch {
    pub fn new(from_bus: BusId, to_bus: BusId, susceptance: f64, rate_a: f64) -> Self {
        Self {
            from_bus,
            to_bus,
            susceptance,
            rate_a,
        }
    }

    /// Build a branch from its series reactance. A zero reactance yields a
    /// non-finite susceptance, which the topology builder rejects.
    pub fn from_reactance(from_bus: BusId, to_bus: BusId, reactance: f64, rate_a: f64) -> Self {
        Self::new(from_bus, to_bus, 1.0 / reactance, rate_a)
    }

    pub fn key(&self) -> (BusId, BusId) {
        (self.from_bus, self.to_bus)
    }
}

fn default_eta() -> f64 {
    1.0
}

/// One row of a generator time series.
///
/// Rows with `emax > 0` describe storage units; all others are dispatchable
/// generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorRow {
    pub id: GenId,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub bus: BusId,
    pub pmin: f64,
    pub pmax: f64,
    pub gencost: f64,
    #[serde(default)]
    pub emax: f64,
    #[serde(default)]
    pub einitial: f64,
    #[serde(default = "default_eta")]
    pub eta: f64,
}

impl GeneratorRow {
    /// Row for a dispatchable (non-storage) generator.
    pub fn dispatchable(
        id: GenId,
        time: NaiveDateTime,
        bus: BusId,
        pmin: f64,
        pmax: f64,
        gencost: f64,
    ) -> Self {
        Self {
            id,
            time,
            bus,
            pmin,
            pmax,
            gencost,
            emax: 0.0,
            einitial: 0.0,
            eta: 1.0,
        }
    }

    /// Row for a storage unit; `pmax` is the charge/discharge power bound.
    pub fn storage(
        id: GenId,
        time: NaiveDateTime,
        bus: BusId,
        pmax: f64,
        emax: f64,
        einitial: f64,
        eta: f64,
    ) -> Self {
        Self {
            id,
            time,
            bus,
            pmin: -pmax.abs(),
            pmax,
            gencost: 0.0,
            emax,
            einitial,
            eta,
        }
    }

    pub fn is_storage(&self) -> bool {
        self.emax > 0.0
    }

    pub fn offer(&self) -> Offer {
        Offer {
            bus: self.bus,
            pmin: self.pmin,
            pmax: self.pmax,
            cost: self.gencost,
        }
    }
}

/// Per-time-step bounds and marginal cost of a dispatchable generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub bus: BusId,
    pub pmin: f64,
    pub pmax: f64,
    pub cost: f64,
}

/// Energy storage unit, parameterized from its first time-series row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageUnit {
    pub id: GenId,
    pub bus: BusId,
    /// Maximum energy content (MWh).
    pub capacity: f64,
    /// Energy content at the first time step (MWh).
    pub initial: f64,
    /// Round-trip efficiency, applied as eta on charge and 1/eta on discharge.
    pub efficiency: f64,
    /// Charge and discharge power bound (MW).
    pub power_limit: f64,
}

impl StorageUnit {
    pub fn from_row(row: &GeneratorRow) -> Self {
        Self {
            id: row.id,
            bus: row.bus,
            capacity: row.emax,
            initial: row.einitial,
            efficiency: row.eta,
            power_limit: row.pmax.abs(),
        }
    }
}

/// Active power demand at a bus for one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub bus: BusId,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
    pub pd: f64,
}

impl DemandRecord {
    pub fn new(bus: BusId, time: NaiveDateTime, pd: f64) -> Self {
        Self { bus, time, pd }
    }
}
