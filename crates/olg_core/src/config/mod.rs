//! Scenario configuration
//!
//! A [`ScenarioConfig`] is the serializable description of a whole economy
//! plus the solver settings used to find its steady state. It is what the
//! command line reads from YAML and what comparative statics sweeps perturb.
//!
//! # Builder DSL
//!
//! ```ignore
//! use olg_core::config::{AgentConfig, EconomyBuilder};
//!
//! let economy = EconomyBuilder::new()
//!     .growth_rate(0.02)
//!     .agent(AgentConfig::log("saver", 0.96, 10.0, 3.0).share(0.5).natural_limit())
//!     .agent(AgentConfig::log("borrower", 0.96, 3.0, 10.0).share(0.5).natural_limit())
//!     .firm(1.0, 0.33, 0.05)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, BorrowingPolicy};
use crate::analysis::SweepConfig;
use crate::economy::{Allocation, Economy, Market};
use crate::error::{ParameterError, SolveError};
use crate::firm::Firm;
use crate::government::{FiscalRule, Government};
use crate::solver::{EquilibriumSolution, SolverConfig, solve_equilibrium};
use crate::utility::UtilitySpec;

pub mod builder;
pub mod presets;

pub use builder::EconomyBuilder;
pub use presets::{PRESET_NAMES, all_presets, preset};

fn default_share() -> f64 {
    1.0
}

fn default_tfp() -> f64 {
    1.0
}

/// One agent type and its population share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    #[serde(default = "default_share")]
    pub share: f64,

    pub endowment_young: f64,
    pub endowment_old: f64,

    #[serde(default)]
    pub borrowing: BorrowingPolicy,

    pub utility: UtilitySpec,
}

impl AgentConfig {
    /// Log-utility agent with the whole population share
    pub fn log(name: impl Into<String>, beta: f64, endowment_young: f64, endowment_old: f64) -> Self {
        Self {
            name: name.into(),
            share: default_share(),
            endowment_young,
            endowment_old,
            borrowing: BorrowingPolicy::default(),
            utility: UtilitySpec::Log { beta },
        }
    }

    pub fn crra(
        name: impl Into<String>,
        beta: f64,
        sigma: f64,
        endowment_young: f64,
        endowment_old: f64,
    ) -> Self {
        Self {
            utility: UtilitySpec::Crra { beta, sigma },
            ..Self::log(name, beta, endowment_young, endowment_old)
        }
    }

    #[must_use]
    pub fn share(mut self, share: f64) -> Self {
        self.share = share;
        self
    }

    #[must_use]
    pub fn natural_limit(mut self) -> Self {
        self.borrowing = BorrowingPolicy::NaturalLimit;
        self
    }

    pub fn build(&self) -> Result<Agent, ParameterError> {
        let utility = self.utility.build()?;
        Ok(Agent::new(
            self.name.clone(),
            utility,
            self.endowment_young,
            self.endowment_old,
        )?
        .with_borrowing(self.borrowing))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    #[serde(default = "default_tfp")]
    pub tfp: f64,
    pub alpha: f64,
    pub delta: f64,
}

impl FirmConfig {
    pub fn build(&self) -> Result<Firm, ParameterError> {
        Firm::new(self.tfp, self.alpha, self.delta)
    }
}

/// Complete description of one steady-state problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: String,

    /// Labor-force growth rate `g`
    #[serde(default)]
    pub growth_rate: f64,

    pub agents: Vec<AgentConfig>,

    /// Pure exchange when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm: Option<FirmConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government: Option<FiscalRule>,

    #[serde(default)]
    pub solver: SolverConfig,

    /// Comparative statics to run with `olg sweep`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepConfig>,
}

/// Solved scenario: the equilibrium and the allocation at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub equilibrium: EquilibriumSolution,
    pub allocation: Allocation,
}

impl ScenarioConfig {
    /// Validate every component and assemble the economy
    pub fn build(&self) -> Result<Economy, ParameterError> {
        let population = self
            .agents
            .iter()
            .map(|agent| -> Result<(Agent, f64), ParameterError> {
                Ok((agent.build()?, agent.share))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let market = match &self.firm {
            Some(firm) => Market::Production(firm.build()?),
            None => Market::Exchange,
        };
        let government = self.government.map(Government::new).transpose()?;
        Economy::new(population, self.growth_rate, market, government)
    }

    pub fn solve(&self) -> Result<ScenarioOutcome, SolveError> {
        let economy = self.build()?;
        let equilibrium = solve_equilibrium(&economy, &self.solver)?;
        let allocation = economy.allocation(equilibrium.rate)?;
        Ok(ScenarioOutcome {
            name: self.name.clone(),
            equilibrium,
            allocation,
        })
    }
}
