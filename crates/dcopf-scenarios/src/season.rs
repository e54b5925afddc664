//! Season schedule and per-season input slices.

use crate::catalog::Placement;
use dcopf_core::{BusId, DemandRecord, GenId, GeneratorRow};
use dcopf_io::{MasterGenRow, MasterLoadRow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A representative season and the number of weeks it stands in for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonWeight {
    pub name: String,
    pub weight: f64,
}

impl SeasonWeight {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Ordered seasons of one annual estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonSchedule(Vec<SeasonWeight>);

impl Default for SeasonSchedule {
    /// winter ×13, summer ×13, autumn_spring ×26 (52 weeks)
    fn default() -> Self {
        Self(vec![
            SeasonWeight::new("winter", 13.0),
            SeasonWeight::new("summer", 13.0),
            SeasonWeight::new("autumn_spring", 26.0),
        ])
    }
}

impl SeasonSchedule {
    pub fn new(seasons: Vec<SeasonWeight>) -> Self {
        Self(seasons)
    }

    pub fn seasons(&self) -> &[SeasonWeight] {
        &self.0
    }

    pub fn total_weight(&self) -> f64 {
        self.0.iter().map(|s| s.weight).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Season generator rows for a scenario.
///
/// Keeps master rows of `season` whose id is placed by the scenario, moves
/// each to its placement bus, drops repeated (time, id) pairs (first wins)
/// and sorts by (time, id).
pub fn build_gen_time_series(
    master_gen: &[MasterGenRow],
    placement: &Placement,
    season: &str,
) -> Vec<GeneratorRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<GeneratorRow> = master_gen
        .iter()
        .filter(|row| row.season == season)
        .filter_map(|row| {
            let bus = placement.bus_of(row.id)?;
            seen.insert((row.time, row.id)).then(|| row.to_generator(bus))
        })
        .collect();
    rows.sort_by_key(|row| (row.time, row.id));
    rows
}

/// Season demand rows with `pd` scaled by `load_factor`, de-duplicated on
/// (time, bus) and sorted.
pub fn build_demand_time_series(
    master_load: &[MasterLoadRow],
    load_factor: f64,
    season: &str,
) -> Vec<DemandRecord> {
    let mut seen: HashSet<(chrono::NaiveDateTime, BusId)> = HashSet::new();
    let mut rows: Vec<DemandRecord> = master_load
        .iter()
        .filter(|row| row.season == season)
        .filter(|row| seen.insert((row.time, row.bus)))
        .map(|row| row.scaled(load_factor))
        .collect();
    rows.sort_by_key(|row| (row.time, row.bus));
    rows
}

/// Ids present in a season slice, in order of first appearance.
pub fn ids_in(rows: &[GeneratorRow]) -> Vec<GenId> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| row.id)
        .filter(|id| seen.insert(*id))
        .collect()
}
