//! Integration tests for the equilibrium solver
//!
//! Tests are organized by topic:
//! - `exchange` - pure exchange economies and bracket handling
//! - `production` - economies with a firm
//! - `fiscal` - government budget balancing at equilibrium
//! - `sweeps` - comparative statics over scenario parameters
//! - `properties` - seeded randomized checks against analytical solutions

mod properties;
mod sweeps;
