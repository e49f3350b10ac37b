//! Comparative statics over scenario parameters.
//!
//! A sweep moves one or more scenario parameters over evenly spaced values
//! and solves the steady state at every point of the resulting grid:
//!
//! ```ignore
//! use olg_core::analysis::{SweepConfig, SweepParameter, SweepTarget, sweep_equilibrium};
//!
//! let sweep = SweepConfig {
//!     parameters: vec![
//!         SweepParameter::new(SweepTarget::Beta, 0.90, 0.99, 15),
//!         SweepParameter::new(SweepTarget::TaxRateYoung, 0.0, 0.4, 5),
//!     ],
//! };
//! let results = sweep_equilibrium(&scenario, &sweep, None)?;
//! let rates = results.rate_grid();
//! ```
//!
//! A failed solve at one point does not stop the sweep; it is recorded as
//! [`PointOutcome::Failed`].

mod config;
mod evaluator;

pub use config::{GridIndices, SweepConfig, SweepGrid, SweepParameter, SweepTarget};
pub use evaluator::{PointOutcome, SweepPoint, SweepProgress, SweepResults, sweep_equilibrium};
