use dcopf_core::{BusId, GenId};
use dcopf_io::{load_branches, load_master_gen, load_master_load, GridDataset};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

fn write_dataset(dir: &Path) {
    write(dir, "bus.csv", "bus_i,type,baseKV\n1,3,230\n2,1,230\n");
    write(dir, "branch.csv", "fbus,tbus,r,x,rateA\n1,2,0.01,0.1,100\n");
    write(
        dir,
        "master_gen.csv",
        "id,time,bus,pmin,pmax,gencost,emax,einitial,eta,season,type\n\
         1,2023-01-01 00:00:00,1,0,10,5,0,0,1,winter,nuclear\n\
         1,2023-01-01 01:00:00,1,0,10,5,0,0,1,winter,nuclear\n\
         7,2023-01-01 00:00:00,2,-3,3,0,10,5,0.9,winter,battery1\n\
         1,2023-06-01T00:00:00,1,0,8,5,,,,summer,nuclear\n",
    );
    write(
        dir,
        "master_load.csv",
        "bus,time,pd,season\n2,2023-01-01 00:00:00,4,winter\n2,2023-01-01 01:00:00,6,winter\n",
    );
}

#[test]
fn loads_full_dataset() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());

    let dataset = GridDataset::load_dir(dir.path()).expect("dataset should load");
    let summary = dataset.summary();
    assert_eq!(summary.buses, 2);
    assert_eq!(summary.branches, 1);
    assert_eq!(summary.generators, 1);
    assert_eq!(summary.storage_units, 1);
    assert_eq!(summary.gen_rows, 4);
    assert_eq!(summary.seasons, vec!["summer".to_string(), "winter".to_string()]);
    assert_eq!(summary.asset_types, vec!["battery1".to_string(), "nuclear".to_string()]);
}

#[test]
fn branch_reactance_becomes_susceptance() {
    let dir = tempdir().unwrap();
    write(dir.path(), "branch.csv", "fbus,tbus,x,ratea\n1,2,0.2,50\n");
    let branches = load_branches(&dir.path().join("branch.csv")).unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].from_bus, BusId::new(1));
    assert!((branches[0].susceptance - 5.0).abs() < 1e-12);
    assert_eq!(branches[0].rate_a, 50.0);
}

#[test]
fn blank_storage_columns_default_to_plain_generator() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let rows = load_master_gen(&dir.path().join("master_gen.csv")).unwrap();
    let summer = rows.iter().find(|r| r.season == "summer").unwrap();
    assert!(!summer.is_storage());

    let engine_row = summer.to_generator(BusId::new(4));
    assert_eq!(engine_row.bus, BusId::new(4));
    assert_eq!(engine_row.emax, 0.0);
    assert_eq!(engine_row.eta, 1.0);

    let battery = rows.iter().find(|r| r.id == GenId::new(7)).unwrap();
    assert!(battery.is_storage());
    assert_eq!(battery.to_generator(battery.bus).einitial, 5.0);
}

#[test]
fn load_rows_scale_by_factor() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let rows = load_master_load(&dir.path().join("master_load.csv")).unwrap();
    let scaled = rows[1].scaled(1.5);
    assert_eq!(scaled.pd, 9.0);
    assert_eq!(scaled.bus, BusId::new(2));
}

#[test]
fn malformed_row_reports_table_and_line() {
    let dir = tempdir().unwrap();
    write(dir.path(), "branch.csv", "fbus,tbus,x,ratea\n1,2,0.1,100\n1,3,abc,100\n");
    let err = load_branches(&dir.path().join("branch.csv")).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("branch record at line 3"), "unexpected error: {}", chain);
}

#[test]
fn missing_table_is_an_error() {
    let dir = tempdir().unwrap();
    let err = GridDataset::load_dir(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("bus.csv"));
}
