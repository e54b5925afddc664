use crate::config::RunConfig;
use anyhow::{bail, Context, Result};
use dcopf_algo::{flows_exceeding, DcopfOutcome, DcopfSolution};
use dcopf_core::{GeneratorRow, Topology};
use dcopf_io::GridDataset;
use dcopf_scenarios::build_demand_time_series;
use std::collections::HashSet;
use tracing::{info, warn};

/// Sub-directory of the results directory used by single-season solves.
pub const SOLVE_DIR: &str = "solve";

/// Solve one season with every master unit at its own bus and write the
/// season tables plus `solution_<season>.json` into `<results_dir>/solve`.
pub fn handle(config: &RunConfig, season: &str, load_factor: f64) -> Result<DcopfSolution> {
    let dataset = GridDataset::load_dir(&config.data_dir)
        .with_context(|| format!("loading grid data from '{}'", config.data_dir.display()))?;

    let generators = master_season_rows(&dataset, season);
    let demand = build_demand_time_series(&dataset.master_load, load_factor, season);
    if generators.is_empty() && demand.is_empty() {
        bail!(
            "season '{}' not found; available: {}",
            season,
            dataset.seasons().into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    let solver = config.solver()?;
    let topology = Topology::build(
        &dataset.buses,
        &dataset.branches,
        &generators,
        &demand,
        solver.topology_options(),
    )
    .with_context(|| format!("building season '{}'", season))?;

    let solution = match solver.solve_topology(&topology) {
        DcopfOutcome::Solved(solution) => solution,
        DcopfOutcome::NotOptimal(status) => bail!("season '{}' ended {}", season, status),
    };

    let violations = flows_exceeding(&topology, &solution, config.flow_tolerance);
    if !violations.is_empty() {
        warn!(count = violations.len(), "flows exceed branch limits");
    }
    let dir = config.results_dir.join(SOLVE_DIR);
    let mut written = solution.write_tables(&dir, season, &violations)?;
    let json_path = dir.join(format!("solution_{}.json", season));
    solution.to_json(&json_path)?;
    written.push(json_path);
    info!(season, files = written.len(), dir = %dir.display(), "wrote season tables");
    println!("season {} cost {:.1}", season, solution.cost);
    Ok(solution)
}

/// Master rows of `season` at their own buses, first (time, id) row wins.
fn master_season_rows(dataset: &GridDataset, season: &str) -> Vec<GeneratorRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<GeneratorRow> = dataset
        .master_gen
        .iter()
        .filter(|row| row.season == season && seen.insert((row.time, row.id)))
        .map(|row| row.to_generator(row.bus))
        .collect();
    rows.sort_by_key(|row| (row.time, row.id));
    rows
}
