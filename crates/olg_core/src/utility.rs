//! Lifetime utility functions
//!
//! Any `Fn(f64, f64) -> f64 + Send + Sync` closure is a [`Utility`], so callers
//! can hand the solver an arbitrary preference ordering. The two forms the
//! scenario files can name are provided as [`LogUtility`] and [`CrraUtility`],
//! and [`UtilitySpec`] is their serializable description.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// Lifetime utility over (young-age consumption, old-age consumption).
///
/// Implementations must be pure and finite on the open positive quadrant.
pub trait Utility: Send + Sync {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64;
}

impl<F> Utility for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        self(c_young, c_old)
    }
}

/// `ln(c_y) + beta * ln(c_o)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogUtility {
    pub beta: f64,
}

impl Utility for LogUtility {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        c_young.ln() + self.beta * c_old.ln()
    }
}

/// Constant relative risk aversion with coefficient `sigma`.
///
/// `sigma == 1` is the log limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrraUtility {
    pub beta: f64,
    pub sigma: f64,
}

impl CrraUtility {
    fn period(&self, c: f64) -> f64 {
        if (self.sigma - 1.0).abs() < f64::EPSILON {
            c.ln()
        } else {
            c.powf(1.0 - self.sigma) / (1.0 - self.sigma)
        }
    }
}

impl Utility for CrraUtility {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        self.period(c_young) + self.beta * self.period(c_old)
    }
}

/// Serializable description of a built-in utility function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtilitySpec {
    Log { beta: f64 },
    Crra { beta: f64, sigma: f64 },
}

impl UtilitySpec {
    pub fn beta(&self) -> f64 {
        match self {
            UtilitySpec::Log { beta } | UtilitySpec::Crra { beta, .. } => *beta,
        }
    }

    /// Same functional form with a different discount factor
    #[must_use]
    pub fn with_beta(self, beta: f64) -> Self {
        match self {
            UtilitySpec::Log { .. } => UtilitySpec::Log { beta },
            UtilitySpec::Crra { sigma, .. } => UtilitySpec::Crra { beta, sigma },
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        let beta = self.beta();
        if !(beta.is_finite() && beta > 0.0) {
            return Err(ParameterError::new(
                "beta",
                beta,
                "discount factor must be positive and finite",
            ));
        }
        if let UtilitySpec::Crra { sigma, .. } = self
            && !(sigma.is_finite() && *sigma > 0.0)
        {
            return Err(ParameterError::new(
                "sigma",
                *sigma,
                "relative risk aversion must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Build the described utility function
    pub fn build(&self) -> Result<Arc<dyn Utility>, ParameterError> {
        self.validate()?;
        Ok(match *self {
            UtilitySpec::Log { beta } => Arc::new(LogUtility { beta }),
            UtilitySpec::Crra { beta, sigma } => Arc::new(CrraUtility { beta, sigma }),
        })
    }
}
