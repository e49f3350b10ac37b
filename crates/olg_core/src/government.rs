//! Balanced-budget fiscal policy
//!
//! Each period the government taxes the young, pays a lump-sum transfer to
//! every old agent and spends a fixed amount per old agent. Two of the three
//! instruments are fixed by the [`FiscalRule`]; the third is solved for so
//! that revenue equals outlays. Young mass is normalized to one, so the old
//! cohort has mass `1 / (1 + g)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result, SolveError};

/// Residual budgets smaller than this count as balanced
pub const BUDGET_TOLERANCE: f64 = 1e-9;

/// A fiscal instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    TaxRate,
    Transfer,
    Spending,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Instrument::TaxRate => "tax_rate_young",
            Instrument::Transfer => "transfer_payment",
            Instrument::Spending => "spending_per_old",
        };
        f.write_str(name)
    }
}

/// Which instrument adjusts, and the fixed values of the other two
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "residual", rename_all = "snake_case")]
pub enum FiscalRule {
    TaxRate {
        transfer_payment: f64,
        spending_per_old: f64,
    },
    Transfer {
        tax_rate_young: f64,
        spending_per_old: f64,
    },
    Spending {
        tax_rate_young: f64,
        transfer_payment: f64,
    },
}

impl FiscalRule {
    pub fn residual_instrument(&self) -> Instrument {
        match self {
            FiscalRule::TaxRate { .. } => Instrument::TaxRate,
            FiscalRule::Transfer { .. } => Instrument::Transfer,
            FiscalRule::Spending { .. } => Instrument::Spending,
        }
    }

    /// The fixed value of `instrument`, if it is not the residual one
    pub fn fixed(&self, instrument: Instrument) -> Option<f64> {
        match (self, instrument) {
            (FiscalRule::Transfer { tax_rate_young, .. }, Instrument::TaxRate)
            | (FiscalRule::Spending { tax_rate_young, .. }, Instrument::TaxRate) => {
                Some(*tax_rate_young)
            }
            (FiscalRule::TaxRate { transfer_payment, .. }, Instrument::Transfer)
            | (FiscalRule::Spending { transfer_payment, .. }, Instrument::Transfer) => {
                Some(*transfer_payment)
            }
            (FiscalRule::TaxRate { spending_per_old, .. }, Instrument::Spending)
            | (FiscalRule::Transfer { spending_per_old, .. }, Instrument::Spending) => {
                Some(*spending_per_old)
            }
            _ => None,
        }
    }

    /// Replace the fixed value of `instrument`. Returns `false` when
    /// `instrument` is the residual one and nothing was changed.
    pub fn set_fixed(&mut self, instrument: Instrument, value: f64) -> bool {
        let slot = match (self, instrument) {
            (FiscalRule::Transfer { tax_rate_young, .. }, Instrument::TaxRate)
            | (FiscalRule::Spending { tax_rate_young, .. }, Instrument::TaxRate) => tax_rate_young,
            (FiscalRule::TaxRate { transfer_payment, .. }, Instrument::Transfer)
            | (FiscalRule::Spending { transfer_payment, .. }, Instrument::Transfer) => {
                transfer_payment
            }
            (FiscalRule::TaxRate { spending_per_old, .. }, Instrument::Spending)
            | (FiscalRule::Transfer { spending_per_old, .. }, Instrument::Spending) => {
                spending_per_old
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        for instrument in [Instrument::TaxRate, Instrument::Transfer, Instrument::Spending] {
            let Some(value) = self.fixed(instrument) else {
                continue;
            };
            let (name, ok, reason) = match instrument {
                Instrument::TaxRate => (
                    "tax_rate_young",
                    (0.0..1.0).contains(&value),
                    "tax rate must lie in [0, 1)",
                ),
                Instrument::Transfer => (
                    "transfer_payment",
                    value.is_finite() && value >= 0.0,
                    "transfer must be non-negative and finite",
                ),
                Instrument::Spending => (
                    "spending_per_old",
                    value.is_finite() && value >= 0.0,
                    "spending must be non-negative and finite",
                ),
            };
            if !ok {
                return Err(ParameterError::new(name, value, reason));
            }
        }
        Ok(())
    }
}

/// Fully determined policy for one steady state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiscalPolicy {
    pub tax_rate_young: f64,
    pub transfer_payment: f64,
    pub spending_per_old: f64,
    pub revenue: f64,
    pub outlays: f64,
}

impl FiscalPolicy {
    /// Revenue minus outlays
    pub fn budget_residual(&self) -> f64 {
        self.revenue - self.outlays
    }

    /// No government: all instruments zero
    pub fn none() -> Self {
        Self {
            tax_rate_young: 0.0,
            transfer_payment: 0.0,
            spending_per_old: 0.0,
            revenue: 0.0,
            outlays: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Government {
    rule: FiscalRule,
}

impl Government {
    pub fn new(rule: FiscalRule) -> std::result::Result<Self, ParameterError> {
        rule.validate()?;
        Ok(Self { rule })
    }

    pub fn rule(&self) -> &FiscalRule {
        &self.rule
    }

    /// Solve the residual instrument so that
    /// `tax_rate_young * tax_base == (transfer_payment + spending_per_old) * population_old`.
    ///
    /// `tax_base` is the population-share-weighted young endowment of the whole cohort.
    pub fn balance(&self, tax_base: f64, population_old: f64) -> Result<FiscalPolicy> {
        if !(tax_base.is_finite() && tax_base >= 0.0) {
            return Err(ParameterError::new(
                "tax_base",
                tax_base,
                "aggregate tax base must be non-negative and finite",
            )
            .into());
        }
        if !(population_old.is_finite() && population_old > 0.0) {
            return Err(ParameterError::new(
                "population_old",
                population_old,
                "old cohort mass must be positive and finite",
            )
            .into());
        }

        let (tax_rate_young, transfer_payment, spending_per_old) = match self.rule {
            FiscalRule::TaxRate {
                transfer_payment,
                spending_per_old,
            } => {
                let outlays = (transfer_payment + spending_per_old) * population_old;
                let tax = if outlays == 0.0 {
                    0.0
                } else if tax_base > 0.0 {
                    outlays / tax_base
                } else {
                    return Err(SolveError::InfeasiblePolicy {
                        instrument: Instrument::TaxRate,
                        value: f64::INFINITY,
                    });
                };
                if tax >= 1.0 {
                    return Err(SolveError::InfeasiblePolicy {
                        instrument: Instrument::TaxRate,
                        value: tax,
                    });
                }
                (tax, transfer_payment, spending_per_old)
            }
            FiscalRule::Transfer {
                tax_rate_young,
                spending_per_old,
            } => {
                let transfer = tax_rate_young * tax_base / population_old - spending_per_old;
                if transfer < 0.0 {
                    return Err(SolveError::InfeasiblePolicy {
                        instrument: Instrument::Transfer,
                        value: transfer,
                    });
                }
                (tax_rate_young, transfer, spending_per_old)
            }
            FiscalRule::Spending {
                tax_rate_young,
                transfer_payment,
            } => {
                let spending = tax_rate_young * tax_base / population_old - transfer_payment;
                if spending < 0.0 {
                    return Err(SolveError::InfeasiblePolicy {
                        instrument: Instrument::Spending,
                        value: spending,
                    });
                }
                (tax_rate_young, transfer_payment, spending)
            }
        };

        Ok(FiscalPolicy {
            tax_rate_young,
            transfer_payment,
            spending_per_old,
            revenue: tax_rate_young * tax_base,
            outlays: (transfer_payment + spending_per_old) * population_old,
        })
    }
}
