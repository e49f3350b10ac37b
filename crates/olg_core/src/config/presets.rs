//! Built-in scenarios
//!
//! The same two household types appear throughout: a "saver" rich when young
//! and a "borrower" rich when old, both with log utility and `beta = 0.96`.

use super::{AgentConfig, EconomyBuilder, ScenarioConfig};
use crate::analysis::{SweepConfig, SweepParameter, SweepTarget};
use crate::government::FiscalRule;
use crate::solver::SolverConfig;

pub const PRESET_NAMES: [&str; 6] = [
    "basic",
    "production",
    "full_system",
    "patience",
    "crra_flexible",
    "crra_rigid",
];

const BETA: f64 = 0.96;
const GROWTH: f64 = 0.02;

fn households(saver: AgentConfig, borrower: AgentConfig) -> EconomyBuilder {
    EconomyBuilder::new()
        .growth_rate(GROWTH)
        .agent(saver.share(0.5).natural_limit())
        .agent(borrower.share(0.5).natural_limit())
}

fn log_households() -> EconomyBuilder {
    households(
        AgentConfig::log("saver", BETA, 10.0, 3.0),
        AgentConfig::log("borrower", BETA, 3.0, 10.0),
    )
}

fn sweep(parameters: Vec<SweepParameter>) -> Option<SweepConfig> {
    Some(SweepConfig { parameters })
}

/// Pure exchange between savers and borrowers; sweeps the saver share
fn basic() -> ScenarioConfig {
    let mut config = log_households().name("basic").into_config();
    config.sweep = sweep(vec![SweepParameter::new(
        SweepTarget::Share { agent: 0 },
        0.1,
        0.9,
        20,
    )]);
    config
}

/// Adds a Cobb-Douglas firm as a sink for savings
fn production() -> ScenarioConfig {
    let mut config = log_households()
        .name("production")
        .firm(1.0, 0.33, 0.05)
        .bracket(1.01, 2.0)
        .into_config();
    config.sweep = sweep(vec![SweepParameter::new(
        SweepTarget::GrowthRate,
        0.0,
        0.05,
        20,
    )]);
    config
}

/// Production economy with a PAYG pension; sweeps the tax on the young
fn full_system() -> ScenarioConfig {
    let mut config = log_households()
        .name("full_system")
        .firm(1.0, 0.33, 0.05)
        .payg_pension(0.2)
        .bracket(1.01, 2.0)
        .into_config();
    config.sweep = sweep(vec![SweepParameter::new(
        SweepTarget::TaxRateYoung,
        0.0,
        0.4,
        15,
    )]);
    config
}

/// Production economy with a neutral government; sweeps the discount factor
fn patience() -> ScenarioConfig {
    let mut config = log_households()
        .name("patience")
        .firm(1.0, 0.33, 0.05)
        .government(FiscalRule::Transfer {
            tax_rate_young: 0.0,
            spending_per_old: 0.0,
        })
        .bracket(1.01, 2.0)
        .into_config();
    config.sweep = sweep(vec![SweepParameter::new(SweepTarget::Beta, 0.90, 0.99, 15)]);
    config
}

fn crra(name: &str, sigma: f64) -> ScenarioConfig {
    let mut config = households(
        AgentConfig::crra("saver", BETA, sigma, 10.0, 3.0),
        AgentConfig::crra("borrower", BETA, sigma, 3.0, 10.0),
    )
    .name(name)
    .firm(1.0, 0.33, 0.05)
    .payg_pension(0.0)
    .solver(SolverConfig {
        bracket: (1.01, 2.0),
        ..SolverConfig::default()
    })
    .into_config();
    config.sweep = sweep(vec![SweepParameter::new(
        SweepTarget::TaxRateYoung,
        0.0,
        0.4,
        15,
    )]);
    config
}

/// Look up a preset by name
pub fn preset(name: &str) -> Option<ScenarioConfig> {
    Some(match name {
        "basic" => basic(),
        "production" => production(),
        "full_system" => full_system(),
        "patience" => patience(),
        // High intertemporal elasticity of substitution
        "crra_flexible" => crra("crra_flexible", 0.5),
        "crra_rigid" => crra("crra_rigid", 4.0),
        _ => return None,
    })
}

pub fn all_presets() -> Vec<ScenarioConfig> {
    PRESET_NAMES.iter().filter_map(|name| preset(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in PRESET_NAMES {
            let config = preset(name).unwrap();
            assert_eq!(config.name, name);
            assert!(config.build().is_ok(), "{name} failed to build");
            assert!(config.sweep.is_some());
        }
        assert!(preset("nope").is_none());
        assert_eq!(all_presets().len(), PRESET_NAMES.len());
    }
}
