//! Scalar numerical routines used by the equilibrium solve
//!
//! Two problems show up in the core:
//! - maximizing an agent's lifetime utility over a bounded savings interval
//!   ([`maximize_scalar`], a scan followed by golden-section refinement)
//! - finding the interest rate that zeros aggregate excess demand
//!   ([`brent_root`], a bracketed inverse-quadratic/secant/bisection hybrid)
//!
//! Both are pure functions over an explicit search state, so they are safe to
//! call from parallel sweeps and easy to test in isolation.
//!
//! # Example
//!
//! ```ignore
//! use olg_core::optimization::{RootOptions, RootSearch, brent_root};
//!
//! let f = |x: f64| Ok::<_, SolveError>(x * x - 2.0);
//! let search = RootSearch::new(&f, 0.0, 2.0)?;
//! let root = brent_root(&f, search, &RootOptions::default())?;
//! assert!((root.rate - 2f64.sqrt()).abs() < 1e-9);
//! ```

mod brent;
mod golden_section;
mod result;

pub use brent::{RootOptions, RootSearch, brent_root};
pub use golden_section::{ScalarMaximum, ScalarSearchOptions, maximize_scalar};
pub use result::{ConvergenceHistory, EvaluationRecord, RootResult, TerminationReason};
