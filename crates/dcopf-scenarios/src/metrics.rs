//! Per-asset season metrics and their weighted annual totals.
//!
//! For an asset `a` over the steps of one season:
//!
//! | Metric | Definition |
//! |--------|------------|
//! | generation | Σ gen(t) · Δt |
//! | generation_cost | Σ gencost(t) · gen(t) |
//! | available | Σ pmax(t) · Δt |
//! | remaining | max(available − generation, 0) |
//!
//! Storage units report their net output (discharge − charge) and carry no
//! cost. Annual totals weight each season by its number of weeks; the
//! capacity factor is annual generation over annual available energy.

use crate::catalog::AssetCatalog;
use chrono::NaiveDateTime;
use dcopf_algo::DcopfSolution;
use dcopf_core::{GenId, GeneratorRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub generation: f64,
    pub generation_cost: f64,
    pub available: f64,
    pub remaining: f64,
}

impl AssetMetrics {
    /// Generation over available energy; 0 when nothing was available.
    pub fn capacity_factor(&self) -> f64 {
        if self.available > 0.0 {
            self.generation / self.available
        } else {
            0.0
        }
    }

    fn add_weighted(&mut self, other: &AssetMetrics, weight: f64) {
        self.generation += other.generation * weight;
        self.generation_cost += other.generation_cost * weight;
        self.available += other.available * weight;
        self.remaining += other.remaining * weight;
    }
}

/// Metrics of one solved season, keyed by asset label.
pub fn season_metrics(
    solution: &DcopfSolution,
    season_rows: &[GeneratorRow],
    catalog: &AssetCatalog,
) -> BTreeMap<String, AssetMetrics> {
    let dt = solution.delta_t_hours;
    let rows: HashMap<(GenId, NaiveDateTime), &GeneratorRow> = season_rows
        .iter()
        .map(|row| ((row.id, row.time), row))
        .collect();

    let mut metrics: BTreeMap<String, AssetMetrics> = BTreeMap::new();
    for record in &solution.generation {
        let entry = metrics.entry(catalog.label(record.id)).or_default();
        entry.generation += record.gen * dt;
        if let Some(row) = rows.get(&(record.id, record.time)) {
            entry.generation_cost += row.gencost * record.gen;
            entry.available += row.pmax.abs() * dt;
        }
    }
    for entry in metrics.values_mut() {
        entry.remaining = (entry.available - entry.generation).max(0.0);
    }
    metrics
}

/// Season-weighted running totals of one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualAccumulator {
    pub annual_cost: f64,
    pub assets: BTreeMap<String, AssetMetrics>,
}

impl AnnualAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_season(
        &mut self,
        weight: f64,
        cost: f64,
        metrics: &BTreeMap<String, AssetMetrics>,
    ) {
        self.annual_cost += cost * weight;
        for (asset, season) in metrics {
            self.assets
                .entry(asset.clone())
                .or_default()
                .add_weighted(season, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dcopf_algo::{GenerationRecord, SolveStatus, UnitKind};
    use dcopf_core::BusId;
    use dcopf_io::MasterGenRow;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(id: usize, hour: u32, gen: f64) -> GenerationRecord {
        GenerationRecord {
            time: at(hour),
            id: GenId::new(id),
            node: BusId::new(1),
            gen,
            kind: UnitKind::Dispatchable,
        }
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::from_master(&[MasterGenRow {
            id: GenId::new(1),
            time: at(0),
            bus: BusId::new(1),
            pmin: 0.0,
            pmax: 10.0,
            gencost: 5.0,
            emax: None,
            einitial: None,
            eta: None,
            season: "winter".into(),
            asset_type: "nuclear".into(),
        }])
    }

    fn solution(generation: Vec<GenerationRecord>) -> DcopfSolution {
        DcopfSolution {
            status: SolveStatus::Optimal,
            solve_time_ms: 0,
            delta_t_hours: 1.0,
            cost: 50.0,
            generation,
            angles: Vec::new(),
            flows: Vec::new(),
            storage_dispatch: Vec::new(),
            storage_levels: Vec::new(),
        }
    }

    #[test]
    fn season_metrics_follow_definitions() {
        let rows = vec![
            GeneratorRow::dispatchable(GenId::new(1), at(0), BusId::new(1), 0.0, 10.0, 5.0),
            GeneratorRow::dispatchable(GenId::new(1), at(1), BusId::new(1), 0.0, 10.0, 5.0),
        ];
        let metrics = season_metrics(
            &solution(vec![record(1, 0, 4.0), record(1, 1, 6.0)]),
            &rows,
            &catalog(),
        );
        let nuclear = metrics["nuclear"];
        assert_eq!(nuclear.generation, 10.0);
        assert_eq!(nuclear.generation_cost, 50.0);
        assert_eq!(nuclear.available, 20.0);
        assert_eq!(nuclear.remaining, 10.0);
        assert_eq!(nuclear.capacity_factor(), 0.5);
    }

    #[test]
    fn accumulator_weights_seasons() {
        let mut season = BTreeMap::new();
        season.insert(
            "nuclear".to_string(),
            AssetMetrics {
                generation: 10.0,
                generation_cost: 50.0,
                available: 20.0,
                remaining: 10.0,
            },
        );
        let mut annual = AnnualAccumulator::new();
        annual.add_season(13.0, 50.0, &season);
        annual.add_season(26.0, 50.0, &season);
        assert_eq!(annual.annual_cost, 50.0 * 39.0);
        assert_eq!(annual.assets["nuclear"].generation, 390.0);
        assert_eq!(annual.assets["nuclear"].capacity_factor(), 0.5);
    }

    #[test]
    fn zero_availability_gives_zero_capacity_factor() {
        assert_eq!(AssetMetrics::default().capacity_factor(), 0.0);
    }
}
