//! Steady-state equilibrium of a two-period overlapping generations economy
//!
//! Households live two periods, save when young at gross interest rate `R`
//! and consume the proceeds when old. Given preferences, endowments, an
//! optional Cobb-Douglas firm and an optional balanced-budget government,
//! the crate finds the `R*` at which aggregate savings of the young equal the
//! assets the economy absorbs:
//! - pure exchange: net savings across household types are zero
//! - production: savings finance next period's capital stock
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use olg_core::{Agent, BorrowingPolicy, Economy, LogUtility, Market, Solver};
//!
//! let u = Arc::new(LogUtility { beta: 0.96 });
//! let saver = Agent::new("saver", u.clone(), 10.0, 3.0)?.with_borrowing(BorrowingPolicy::NaturalLimit);
//! let borrower = Agent::new("borrower", u, 3.0, 10.0)?.with_borrowing(BorrowingPolicy::NaturalLimit);
//! let economy = Economy::new(vec![(saver, 0.5), (borrower, 0.5)], 0.02, Market::Exchange, None)?;
//!
//! let mut solver = Solver::new(&economy);
//! let rate = solver.find_equilibrium_r()?;
//! let allocation = solver.allocation();
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod agent;
pub mod economy;
pub mod error;
pub mod firm;
pub mod government;
pub mod optimization;
pub mod solver;
pub mod utility;

// ============================================================================
// Drivers
// ============================================================================

pub mod analysis;
pub mod config;

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use agent::{Agent, AgentDecision, BorrowingPolicy, UtilityProblem};
pub use config::{AgentConfig, EconomyBuilder, FirmConfig, ScenarioConfig, ScenarioOutcome};
pub use economy::{Allocation, Economy, Market};
pub use error::{ParameterError, SolveError, SweepError};
pub use firm::{Firm, ProductionOutcome};
pub use government::{FiscalPolicy, FiscalRule, Government, Instrument};
pub use solver::{EquilibriumSolution, Solver, SolverConfig, SolverState};
pub use utility::{CrraUtility, LogUtility, Utility, UtilitySpec};
