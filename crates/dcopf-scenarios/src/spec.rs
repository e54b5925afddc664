//! Scenario definitions.
//!
//! A scenario places asset types on buses and scales demand. Three file
//! layouts are accepted:
//!
//! - `scenarios_parameters.csv` with dict-literal position columns
//!   (`{1: 'nuclear', 4: 'solar'}`)
//! - YAML or JSON scenario sets with `defaults` and `scenarios` sections

use crate::error::ScenarioError;
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim};
use dcopf_core::BusId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Bus → asset type label.
pub type Positions = BTreeMap<BusId, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    #[serde(default)]
    pub defaults: ScenarioDefaults,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    #[serde(default = "default_load_factor")]
    pub load_factor: f64,
}

fn default_load_factor() -> f64 {
    1.0
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            load_factor: default_load_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_name: String,
    #[serde(default)]
    pub gen_positions: Positions,
    #[serde(default)]
    pub storage_units: Positions,
    pub load_factor: Option<f64>,
}

/// Scenario with defaults applied and basic checks passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub gen_positions: Positions,
    pub storage_positions: Positions,
    pub load_factor: f64,
}

/// `scenarios_parameters.csv` row.
#[derive(Debug, Deserialize)]
struct ParameterRow {
    scenario_name: String,
    #[serde(default)]
    gen_positions: String,
    #[serde(default)]
    storage_units: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    load_factor: Option<f64>,
}

/// Load scenarios from a CSV parameter table or a YAML/JSON scenario set.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let set = if is_csv {
        load_parameter_table(path)?
    } else {
        load_spec_from_path(path)?
    };
    resolve_scenarios(&set)
        .with_context(|| format!("resolving scenarios from '{}'", path.display()))
}

pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario spec"),
    }
}

/// Read `scenarios_parameters.csv` into a scenario set.
pub fn load_parameter_table(path: &Path) -> Result<ScenarioSet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening scenario parameters '{}'", path.display()))?;
    let mut scenarios = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let row: ParameterRow = result
            .with_context(|| format!("parsing scenario parameters at line {}", idx + 2))?;
        let gen_positions = parse_positions(&row.gen_positions)
            .with_context(|| format!("gen_positions of scenario '{}'", row.scenario_name))?;
        let storage_units = parse_positions(&row.storage_units)
            .with_context(|| format!("storage_units of scenario '{}'", row.scenario_name))?;
        scenarios.push(ScenarioSpec {
            scenario_name: row.scenario_name,
            gen_positions,
            storage_units,
            load_factor: row.load_factor,
        });
    }
    Ok(ScenarioSet {
        version: None,
        defaults: ScenarioDefaults::default(),
        scenarios,
    })
}

pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<Scenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for spec in &set.scenarios {
        let name = spec.scenario_name.trim();
        if name.is_empty() {
            return Err(anyhow!("scenario_name cannot be empty"));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("duplicate scenario_name '{}' in scenario set", name));
        }
        let load_factor = spec.load_factor.unwrap_or(set.defaults.load_factor);
        if !(load_factor.is_finite() && load_factor >= 0.0) {
            return Err(ScenarioError::Invalid {
                scenario: name.to_string(),
                reason: format!("load_factor must be a non-negative number, got {}", load_factor),
            }
            .into());
        }
        resolved.push(Scenario {
            name: name.to_string(),
            gen_positions: spec.gen_positions.clone(),
            storage_positions: spec.storage_units.clone(),
            load_factor,
        });
    }
    Ok(resolved)
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

/// Parse a dict literal such as `{1: 'nuclear', 4: "solar"}`.
///
/// Blank input and `{}` yield an empty map. Keys must be bus numbers;
/// values may be single- or double-quoted or bare words.
pub fn parse_positions(value: &str) -> Result<Positions, ScenarioError> {
    let invalid = |reason: &str| ScenarioError::InvalidPositions {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Positions::new());
    }
    let body = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| invalid("expected a {bus: 'type', ...} mapping"))?;

    let mut positions = Positions::new();
    for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, label) = entry
            .split_once(':')
            .ok_or_else(|| invalid(&format!("entry '{}' has no ':'", entry)))?;
        let bus: usize = key
            .trim()
            .trim_matches(|c| c == '\'' || c == '"')
            .parse()
            .map_err(|_| invalid(&format!("bus '{}' is not an integer", key.trim())))?;
        let label = label.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        if label.is_empty() {
            return Err(invalid(&format!("bus {} has an empty asset type", bus)));
        }
        positions.insert(BusId::new(bus), label.to_string());
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_dict_literals() {
        let positions = parse_positions("{1: 'nuclear', 4: \"solar\"}").unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[&BusId::new(1)], "nuclear");
        assert_eq!(positions[&BusId::new(4)], "solar");

        assert!(parse_positions("{}").unwrap().is_empty());
        assert!(parse_positions("  ").unwrap().is_empty());
        assert!(parse_positions("{a: 'x'}").is_err());
        assert!(parse_positions("[1, 2]").is_err());
    }

    #[test]
    fn resolve_applies_default_load_factor() {
        let set = ScenarioSet {
            version: Some(1),
            defaults: ScenarioDefaults { load_factor: 1.2 },
            scenarios: vec![ScenarioSpec {
                scenario_name: "base".into(),
                gen_positions: Positions::new(),
                storage_units: Positions::new(),
                load_factor: None,
            }],
        };
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved[0].load_factor, 1.2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let spec = ScenarioSpec {
            scenario_name: "a".into(),
            gen_positions: Positions::new(),
            storage_units: Positions::new(),
            load_factor: Some(1.0),
        };
        let set = ScenarioSet {
            version: None,
            defaults: ScenarioDefaults::default(),
            scenarios: vec![spec.clone(), spec],
        };
        assert!(validate(&set).is_err());
        assert!(validate(&ScenarioSet::default()).is_err());
    }

    #[test]
    fn loads_yaml_scenario_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenarios.yaml");
        fs::write(
            &path,
            "defaults:\n  load_factor: 0.9\nscenarios:\n  - scenario_name: s1\n    gen_positions:\n      1: nuclear\n    storage_units:\n      2: battery1\n",
        )
        .unwrap();
        let scenarios = load_scenarios(&path).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].load_factor, 0.9);
        assert_eq!(scenarios[0].storage_positions[&BusId::new(2)], "battery1");
    }

    #[test]
    fn loads_parameter_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenarios_parameters.csv");
        fs::write(
            &path,
            "scenario_name,gen_positions,storage_units,load_factor\n\
             scenario_1,\"{1: 'nuclear', 2: 'solar'}\",{2: 'battery1'},1.1\n\
             scenario_2,{1: 'gas'},{},\n",
        )
        .unwrap();
        let scenarios = load_scenarios(&path).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].gen_positions.len(), 2);
        assert_eq!(scenarios[0].load_factor, 1.1);
        assert!(scenarios[1].storage_positions.is_empty());
        assert_eq!(scenarios[1].load_factor, 1.0);
    }
}
