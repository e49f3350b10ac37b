//! Command line front end for the OLG steady-state solver
//!
//! Loads scenarios from YAML files or built-in presets, solves them or sweeps
//! their parameters with [`olg_core`], and prints plain-text or JSON reports.

pub mod logging;
pub mod report;
pub mod scenario;

#[cfg(test)]
mod tests;

pub use logging::init_logging;
pub use report::{format_outcome, format_sweep};
pub use scenario::{ScenarioError, ScenarioSource, load_scenario, save_scenario};
