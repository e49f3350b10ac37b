//! Cobb-Douglas production

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result, SolveError};

/// Competitive firm with technology `Y = A K^alpha L^(1 - alpha)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    tfp: f64,
    alpha: f64,
    delta: f64,
}

/// Factor quantities and prices when the firm operates at a given rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionOutcome {
    pub capital: f64,
    pub labor: f64,
    pub output: f64,
    pub wage: f64,
    /// Marginal product of capital, `R - 1 + delta` at the optimum
    pub rental_rate: f64,
    /// Zero under constant returns up to rounding
    pub profit: f64,
}

impl Firm {
    pub fn new(tfp: f64, alpha: f64, delta: f64) -> std::result::Result<Self, ParameterError> {
        if !(tfp.is_finite() && tfp > 0.0) {
            return Err(ParameterError::new(
                "tfp",
                tfp,
                "total factor productivity must be positive and finite",
            ));
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ParameterError::new(
                "alpha",
                alpha,
                "capital share must lie in (0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&delta) {
            return Err(ParameterError::new(
                "delta",
                delta,
                "depreciation must lie in [0, 1]",
            ));
        }
        Ok(Self { tfp, alpha, delta })
    }

    pub fn tfp(&self) -> f64 {
        self.tfp
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Gross rate at or below which capital demand is unbounded
    pub fn rate_floor(&self) -> f64 {
        1.0 - self.delta
    }

    fn check_inputs(capital: f64, labor: f64) -> std::result::Result<(), ParameterError> {
        if !(capital.is_finite() && capital > 0.0) {
            return Err(ParameterError::new(
                "capital",
                capital,
                "must be positive and finite",
            ));
        }
        if !(labor.is_finite() && labor > 0.0) {
            return Err(ParameterError::new(
                "labor",
                labor,
                "must be positive and finite",
            ));
        }
        Ok(())
    }

    pub fn output(&self, capital: f64, labor: f64) -> Result<f64> {
        Self::check_inputs(capital, labor)?;
        Ok(self.tfp * capital.powf(self.alpha) * labor.powf(1.0 - self.alpha))
    }

    pub fn marginal_product_of_capital(&self, capital: f64, labor: f64) -> Result<f64> {
        Self::check_inputs(capital, labor)?;
        Ok(self.alpha * self.tfp * (capital / labor).powf(self.alpha - 1.0))
    }

    /// The competitive wage
    pub fn marginal_product_of_labor(&self, capital: f64, labor: f64) -> Result<f64> {
        Self::check_inputs(capital, labor)?;
        Ok((1.0 - self.alpha) * self.tfp * (capital / labor).powf(self.alpha))
    }

    /// Capital that equates the marginal product of capital to `rate - 1 + delta`
    pub fn capital_demand(&self, rate: f64, labor: f64) -> Result<f64> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SolveError::InvalidRate { rate });
        }
        if !(labor.is_finite() && labor > 0.0) {
            return Err(ParameterError::new("labor", labor, "must be positive and finite").into());
        }
        let rental = rate - 1.0 + self.delta;
        if rental <= 0.0 {
            return Err(SolveError::NoCapitalDemand { rate });
        }
        let capital = labor * (self.alpha * self.tfp / rental).powf(1.0 / (1.0 - self.alpha));
        if !(capital.is_finite() && capital > 0.0) {
            return Err(SolveError::NoCapitalDemand { rate });
        }
        Ok(capital)
    }

    pub fn production_at(&self, rate: f64, labor: f64) -> Result<ProductionOutcome> {
        let capital = self.capital_demand(rate, labor)?;
        let output = self.output(capital, labor)?;
        let wage = self.marginal_product_of_labor(capital, labor)?;
        let rental_rate = self.marginal_product_of_capital(capital, labor)?;
        Ok(ProductionOutcome {
            capital,
            labor,
            output,
            wage,
            rental_rate,
            profit: output - wage * labor - rental_rate * capital,
        })
    }
}
