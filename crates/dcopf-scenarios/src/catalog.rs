use crate::error::ScenarioError;
use crate::spec::Scenario;
use dcopf_core::{BusId, GenId};
use dcopf_io::MasterGenRow;
use std::collections::HashMap;
use tracing::warn;

/// Asset type ↔ generator id lookups taken from the master generator table.
///
/// Each type resolves to the first id that carries it; each id keeps the
/// type of its first row.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    type_of: HashMap<GenId, String>,
    id_of: HashMap<String, GenId>,
}

/// Generator ids a scenario places, keyed by their new bus.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    entries: Vec<(BusId, GenId)>,
}

impl AssetCatalog {
    pub fn from_master(rows: &[MasterGenRow]) -> Self {
        let mut catalog = Self::default();
        for row in rows {
            catalog
                .type_of
                .entry(row.id)
                .or_insert_with(|| row.asset_type.clone());
            catalog.id_of.entry(row.asset_type.clone()).or_insert(row.id);
        }
        catalog
    }

    pub fn type_of(&self, id: GenId) -> Option<&str> {
        self.type_of.get(&id).map(String::as_str)
    }

    pub fn id_of(&self, asset_type: &str) -> Option<GenId> {
        self.id_of.get(asset_type).copied()
    }

    /// Label used in metric columns: the asset type, or the id when the
    /// catalog has no entry.
    pub fn label(&self, id: GenId) -> String {
        self.type_of(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Map the scenario's type labels to generator ids.
    ///
    /// Storage placements override generator placements on the same bus.
    pub fn resolve(&self, scenario: &Scenario) -> Result<Placement, ScenarioError> {
        let lookup = |asset_type: &String| {
            self.id_of(asset_type)
                .ok_or_else(|| ScenarioError::UnknownAssetType {
                    scenario: scenario.name.clone(),
                    asset_type: asset_type.clone(),
                })
        };

        let mut by_bus: Vec<(BusId, GenId)> = Vec::new();
        for (bus, asset_type) in &scenario.gen_positions {
            by_bus.push((*bus, lookup(asset_type)?));
        }
        for (bus, asset_type) in &scenario.storage_positions {
            let id = lookup(asset_type)?;
            match by_bus.iter_mut().find(|(b, _)| b == bus) {
                Some(entry) => entry.1 = id,
                None => by_bus.push((*bus, id)),
            }
        }
        Ok(Placement { entries: by_bus })
    }
}

impl Placement {
    pub fn entries(&self) -> &[(BusId, GenId)] {
        &self.entries
    }

    pub fn contains(&self, id: GenId) -> bool {
        self.entries.iter().any(|(_, g)| *g == id)
    }

    /// Bus the generator is moved to. When an id is placed more than once
    /// the last placement wins.
    pub fn bus_of(&self, id: GenId) -> Option<BusId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, g)| *g == id)
            .map(|(bus, _)| *bus)
    }

    /// Log ids that were placed on more than one bus.
    pub fn warn_duplicates(&self, scenario: &str) {
        let mut counts: HashMap<GenId, usize> = HashMap::new();
        for (_, id) in &self.entries {
            *counts.entry(*id).or_default() += 1;
        }
        for (id, count) in counts.into_iter().filter(|(_, c)| *c > 1) {
            warn!(
                scenario,
                generator = %id,
                placements = count,
                "asset placed on several buses; only the last placement is modeled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Positions;
    use chrono::NaiveDate;

    fn row(id: usize, asset_type: &str) -> MasterGenRow {
        MasterGenRow {
            id: GenId::new(id),
            time: NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            bus: BusId::new(1),
            pmin: 0.0,
            pmax: 10.0,
            gencost: 5.0,
            emax: None,
            einitial: None,
            eta: None,
            season: "winter".into(),
            asset_type: asset_type.into(),
        }
    }

    fn scenario(gens: &[(usize, &str)], storage: &[(usize, &str)]) -> Scenario {
        let to_positions = |items: &[(usize, &str)]| -> Positions {
            items
                .iter()
                .map(|(bus, t)| (BusId::new(*bus), t.to_string()))
                .collect()
        };
        Scenario {
            name: "s".into(),
            gen_positions: to_positions(gens),
            storage_positions: to_positions(storage),
            load_factor: 1.0,
        }
    }

    #[test]
    fn first_id_per_type_wins() {
        let catalog = AssetCatalog::from_master(&[row(3, "solar"), row(5, "solar"), row(3, "wind")]);
        assert_eq!(catalog.id_of("solar"), Some(GenId::new(3)));
        assert_eq!(catalog.type_of(GenId::new(3)), Some("solar"));
        assert_eq!(catalog.label(GenId::new(9)), "9");
    }

    #[test]
    fn unknown_type_is_reported() {
        let catalog = AssetCatalog::from_master(&[row(1, "nuclear")]);
        let err = catalog.resolve(&scenario(&[(1, "fusion")], &[])).unwrap_err();
        assert_eq!(
            err,
            ScenarioError::UnknownAssetType {
                scenario: "s".into(),
                asset_type: "fusion".into()
            }
        );
    }

    #[test]
    fn storage_overrides_generator_on_same_bus() {
        let catalog = AssetCatalog::from_master(&[row(1, "nuclear"), row(7, "battery1")]);
        let placement = catalog
            .resolve(&scenario(&[(1, "nuclear"), (2, "nuclear")], &[(2, "battery1")]))
            .unwrap();
        assert_eq!(placement.entries().len(), 2);
        assert_eq!(placement.bus_of(GenId::new(7)), Some(BusId::new(2)));
        assert_eq!(placement.bus_of(GenId::new(1)), Some(BusId::new(1)));
        assert!(placement.contains(GenId::new(1)));
    }
}
