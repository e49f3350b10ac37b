//! Economy Builder
//!
//! Fluent construction of a [`ScenarioConfig`], validated into an
//! [`Economy`] on [`EconomyBuilder::build`].
//!
//! ```ignore
//! use olg_core::config::{AgentConfig, EconomyBuilder};
//!
//! let economy = EconomyBuilder::new()
//!     .name("pension")
//!     .growth_rate(0.02)
//!     .agent(AgentConfig::log("saver", 0.96, 10.0, 3.0).share(0.5).natural_limit())
//!     .agent(AgentConfig::log("borrower", 0.96, 3.0, 10.0).share(0.5).natural_limit())
//!     .firm(1.0, 0.33, 0.05)
//!     .payg_pension(0.2)
//!     .build()?;
//! ```

use super::{AgentConfig, FirmConfig, ScenarioConfig};
use crate::economy::Economy;
use crate::error::ParameterError;
use crate::government::FiscalRule;
use crate::solver::SolverConfig;

/// Builder for scenarios and economies
#[derive(Debug, Clone)]
pub struct EconomyBuilder {
    config: ScenarioConfig,
}

impl Default for EconomyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ScenarioConfig {
                name: String::new(),
                growth_rate: 0.0,
                agents: Vec::new(),
                firm: None,
                government: None,
                solver: SolverConfig::default(),
                sweep: None,
            },
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use]
    pub fn growth_rate(mut self, g: f64) -> Self {
        self.config.growth_rate = g;
        self
    }

    #[must_use]
    pub fn agent(mut self, agent: AgentConfig) -> Self {
        self.config.agents.push(agent);
        self
    }

    /// Switch from pure exchange to production with a Cobb-Douglas firm
    #[must_use]
    pub fn firm(mut self, tfp: f64, alpha: f64, delta: f64) -> Self {
        self.config.firm = Some(FirmConfig { tfp, alpha, delta });
        self
    }

    #[must_use]
    pub fn government(mut self, rule: FiscalRule) -> Self {
        self.config.government = Some(rule);
        self
    }

    /// Pay-as-you-go pension: tax the young at `tax_rate`, transfer all revenue to the old
    #[must_use]
    pub fn payg_pension(self, tax_rate: f64) -> Self {
        self.government(FiscalRule::Transfer {
            tax_rate_young: tax_rate,
            spending_per_old: 0.0,
        })
    }

    #[must_use]
    pub fn bracket(mut self, low: f64, high: f64) -> Self {
        self.config.solver.bracket = (low, high);
        self
    }

    #[must_use]
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.config.solver = solver;
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    #[must_use]
    pub fn into_config(self) -> ScenarioConfig {
        self.config
    }

    pub fn build(&self) -> Result<Economy, ParameterError> {
        self.config.build()
    }
}
