use dcopf_cli::commands::{run, solve, validate};
use dcopf_cli::RunConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Two buses, nuclear (id 1) and solar (id 2) candidates, demand 4 then 6
/// at bus 2 in every season.
fn write_dataset(dir: &Path) {
    fs::write(dir.join("bus.csv"), "bus_i,type\n1,3\n2,1\n").unwrap();
    fs::write(dir.join("branch.csv"), "fbus,tbus,x,rateA\n1,2,0.1,100\n").unwrap();
    let mut gen = String::from("id,time,bus,pmin,pmax,gencost,emax,einitial,eta,season,type\n");
    let mut load = String::from("bus,time,pd,season\n");
    for (season, date) in [
        ("winter", "2023-01-01"),
        ("summer", "2023-07-01"),
        ("autumn_spring", "2023-04-01"),
    ] {
        for (hour, pd) in [(0, 4.0), (1, 6.0)] {
            let time = format!("{}T{:02}:00:00", date, hour);
            gen.push_str(&format!("1,{},1,0,10,5,0,0,1,{},nuclear\n", time, season));
            gen.push_str(&format!("2,{},2,0,2,0,0,0,1,{},solar\n", time, season));
            load.push_str(&format!("2,{},{},{}\n", time, pd, season));
        }
    }
    fs::write(dir.join("master_gen.csv"), gen).unwrap();
    fs::write(dir.join("master_load.csv"), load).unwrap();
    fs::write(
        dir.join("scenarios_parameters.csv"),
        "scenario_name,gen_positions,storage_units,load_factor\n\
         nuclear_only,{1: 'nuclear'},{},1.0\n\
         with_solar,\"{1: 'nuclear', 2: 'solar'}\",{},1.0\n",
    )
    .unwrap();
}

fn config(root: &Path) -> RunConfig {
    RunConfig {
        data_dir: root.join("data"),
        results_dir: root.join("results"),
        ..RunConfig::default()
    }
}

#[test]
fn run_writes_results_tables() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir_all(&data).unwrap();
    write_dataset(&data);

    let config = config(root.path());
    let summary = run::handle(&config).expect("batch should run");
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.total(), 2);

    let results = root.path().join("results");
    let csv = fs::read_to_string(results.join(run::RESULTS_CSV)).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("nuclear_only,2600.0,completed"));
    // Free solar covers 2 MW each hour: (4 - 2 + 6 - 2) * 5 * 52 = 1560.
    assert!(rows[2].starts_with("with_solar,1560.0,completed"), "row was {}", rows[2]);

    let manifest = dcopf_scenarios::load_scenario_manifest(&results.join(run::RESULTS_JSON)).unwrap();
    assert_eq!(manifest.num_scenarios, 2);
    assert!(results.join("with_solar").join("flows_winter.csv").exists());
}

#[test]
fn solve_writes_single_season_tables() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir_all(&data).unwrap();
    write_dataset(&data);

    let config = config(root.path());
    let solution = solve::handle(&config, "summer", 1.0).expect("season should solve");
    assert!((solution.cost - 30.0).abs() < 1e-3, "cost was {}", solution.cost);
    let dir = root.path().join("results").join(solve::SOLVE_DIR);
    assert!(dir.join("generation_summer.csv").exists());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("solution_summer.json")).unwrap())
            .unwrap();
    assert!((json["cost"].as_f64().unwrap() - 30.0).abs() < 1e-3);

    assert!(solve::handle(&config, "monsoon", 1.0).is_err());
}

#[test]
fn validate_reports_unknown_assets() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir_all(&data).unwrap();
    write_dataset(&data);

    let config = config(root.path());
    let summary = validate::handle(&config).unwrap();
    assert_eq!(summary.generators, 2);
    assert_eq!(summary.asset_types, vec!["nuclear".to_string(), "solar".to_string()]);

    fs::write(
        data.join("scenarios_parameters.csv"),
        "scenario_name,gen_positions,storage_units,load_factor\nbad,{1: 'fusion'},{},1.0\n",
    )
    .unwrap();
    let err = validate::handle(&config).unwrap_err();
    assert!(err.to_string().contains("fusion"), "error was {}", err);
}
