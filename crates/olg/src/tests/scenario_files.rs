//! Scenario files on disk

use std::fs;

use olg_core::config::{self, PRESET_NAMES};

use crate::scenario::{ScenarioSource, from_yaml, load_scenario, save_scenario, to_yaml};

const EXCHANGE_YAML: &str = r#"
growth_rate: 0.02
agents:
  - name: saver
    share: 0.5
    endowment_young: 10.0
    endowment_old: 3.0
    borrowing: natural_limit
    utility:
      kind: log
      beta: 0.96
  - name: borrower
    share: 0.5
    endowment_young: 3.0
    endowment_old: 10.0
    borrowing: natural_limit
    utility:
      kind: log
      beta: 0.96
"#;

#[test]
fn every_preset_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    for scenario in config::all_presets() {
        let path = save_scenario(dir.path(), &scenario).unwrap();
        assert_eq!(path.file_name().unwrap(), format!("{}.yaml", scenario.name).as_str());

        let loaded = load_scenario(&path).unwrap();
        assert_eq!(loaded, scenario, "preset {}", scenario.name);
    }

    let written = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(written, PRESET_NAMES.len());
}

#[test]
fn hand_written_exchange_scenario_solves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_types.yaml");
    fs::write(&path, EXCHANGE_YAML).unwrap();

    let scenario = ScenarioSource::File(path).load().unwrap();
    assert_eq!(scenario.name, "two_types");
    assert!(scenario.firm.is_none());

    // Log utility with equal beta clears the exchange market at R = 1/beta
    let outcome = scenario.solve().unwrap();
    assert!((outcome.equilibrium.rate - 1.0 / 0.96).abs() < 1e-6);
    assert!(outcome.allocation.excess_demand.abs() < 1e-8);
}

#[test]
fn explicit_name_is_not_replaced_by_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file_stem.yaml");
    fs::write(&path, format!("name: explicit\n{EXCHANGE_YAML}")).unwrap();

    assert_eq!(load_scenario(&path).unwrap().name, "explicit");
}

#[test]
fn government_rule_is_read_from_yaml() {
    let yaml = format!(
        "{EXCHANGE_YAML}government:\n  residual: tax_rate\n  transfer_payment: 0.5\n  spending_per_old: 0.0\n"
    );
    let scenario = from_yaml(&yaml).unwrap();
    let rule = scenario.government.unwrap();
    assert_eq!(rule.residual_instrument().to_string(), "tax_rate_young");

    let back = from_yaml(&to_yaml(&scenario).unwrap()).unwrap();
    assert_eq!(back, scenario);
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = from_yaml("agents: [1, 2").unwrap_err();
    assert!(err.to_string().starts_with("Parse error"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_scenario(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().starts_with("IO error"));
}

#[test]
fn preset_source_loads_builtin() {
    let scenario = ScenarioSource::Preset("production".into()).load().unwrap();
    assert_eq!(scenario.name, "production");
    assert!(scenario.firm.is_some());
}
