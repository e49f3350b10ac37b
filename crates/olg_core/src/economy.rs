//! Population aggregation and the excess demand function
//!
//! An [`Economy`] is an ordered list of agent types with population shares,
//! a market structure and an optional government. All quantities are per
//! member of the young cohort, whose mass is normalized to one.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentDecision};
use crate::error::{ParameterError, Result};
use crate::firm::{Firm, ProductionOutcome};
use crate::government::{FiscalPolicy, Government};

/// Population shares must sum to one within this tolerance
pub const SHARE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Market {
    /// Savings of one type are borrowing of another; bonds are in zero net supply
    Exchange,
    /// Savings of the young finance next period's capital stock
    Production(Firm),
}

impl Market {
    pub fn firm(&self) -> Option<&Firm> {
        match self {
            Market::Exchange => None,
            Market::Production(firm) => Some(firm),
        }
    }
}

/// One agent type's outcome inside an [`Allocation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub name: String,
    pub share: f64,
    #[serde(flatten)]
    pub decision: AgentDecision,
}

/// Everything the economy does at a given interest rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub rate: f64,
    pub agents: Vec<AgentOutcome>,
    pub aggregate_savings: f64,
    /// Capital the firm needs per young agent, `K(R, 1) * (1 + g)`
    pub capital_demand: Option<f64>,
    pub excess_demand: f64,
    pub production: Option<ProductionOutcome>,
    pub policy: FiscalPolicy,
    /// Share-weighted lifetime utility
    pub welfare: f64,
    pub dynamically_inefficient: bool,
}

#[derive(Debug, Clone)]
pub struct Economy {
    population: Vec<(Agent, f64)>,
    growth_rate: f64,
    market: Market,
    government: Option<Government>,
}

impl Economy {
    pub fn new(
        population: Vec<(Agent, f64)>,
        growth_rate: f64,
        market: Market,
        government: Option<Government>,
    ) -> std::result::Result<Self, ParameterError> {
        if population.is_empty() {
            return Err(ParameterError::new(
                "population",
                0.0,
                "economy needs at least one agent type",
            ));
        }
        for (_, share) in &population {
            if !(*share > 0.0 && *share <= 1.0) {
                return Err(ParameterError::new(
                    "share",
                    *share,
                    "population share must lie in (0, 1]",
                ));
            }
        }
        let total: f64 = population.iter().map(|(_, share)| share).sum();
        if (total - 1.0).abs() > SHARE_TOLERANCE {
            return Err(ParameterError::new(
                "share",
                total,
                "population shares must sum to one",
            ));
        }
        if !(growth_rate.is_finite() && growth_rate > -1.0) {
            return Err(ParameterError::new(
                "growth_rate",
                growth_rate,
                "population growth must be finite and greater than -1",
            ));
        }
        Ok(Self {
            population,
            growth_rate,
            market,
            government,
        })
    }

    pub fn population(&self) -> &[(Agent, f64)] {
        &self.population
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn government(&self) -> Option<&Government> {
        self.government.as_ref()
    }

    /// Mass of the old cohort relative to the young
    pub fn population_old(&self) -> f64 {
        1.0 / (1.0 + self.growth_rate)
    }

    /// Lowest admissible rate, if the market imposes one
    pub fn rate_floor(&self) -> Option<f64> {
        self.market.firm().map(Firm::rate_floor)
    }

    /// `R < 1 + g`
    pub fn dynamically_inefficient(&self, rate: f64) -> bool {
        rate < 1.0 + self.growth_rate
    }

    /// Young endowment of the whole cohort, the base of the tax on the young
    pub fn tax_base(&self) -> f64 {
        self.population
            .iter()
            .map(|(agent, share)| share * agent.problem().endowment_young())
            .sum()
    }

    fn fiscal_policy(&self) -> Result<FiscalPolicy> {
        match &self.government {
            Some(government) => government.balance(self.tax_base(), self.population_old()),
            None => Ok(FiscalPolicy::none()),
        }
    }

    fn decisions(&self, rate: f64, policy: &FiscalPolicy) -> Result<Vec<AgentDecision>> {
        self.population
            .iter()
            .map(|(agent, _)| agent.solve(rate, policy.tax_rate_young, policy.transfer_payment))
            .collect()
    }

    fn aggregate(&self, decisions: &[AgentDecision], field: impl Fn(&AgentDecision) -> f64) -> f64 {
        self.population
            .iter()
            .zip(decisions)
            .map(|((_, share), decision)| share * field(decision))
            .sum()
    }

    fn capital_requirement(&self, rate: f64) -> Result<Option<f64>> {
        match &self.market {
            Market::Exchange => Ok(None),
            Market::Production(firm) => {
                Ok(Some(firm.capital_demand(rate, 1.0)? * (1.0 + self.growth_rate)))
            }
        }
    }

    /// Aggregate savings minus the market's demand for assets at `rate`
    pub fn excess_demand(&self, rate: f64) -> Result<f64> {
        let policy = self.fiscal_policy()?;
        let decisions = self.decisions(rate, &policy)?;
        let savings = self.aggregate(&decisions, |d| d.savings);
        let demand = self.capital_requirement(rate)?.unwrap_or(0.0);
        Ok(savings - demand)
    }

    pub fn allocation(&self, rate: f64) -> Result<Allocation> {
        let policy = self.fiscal_policy()?;
        let decisions = self.decisions(rate, &policy)?;
        let aggregate_savings = self.aggregate(&decisions, |d| d.savings);
        let welfare = self.aggregate(&decisions, |d| d.utility);
        let capital_demand = self.capital_requirement(rate)?;
        let production = match &self.market {
            Market::Exchange => None,
            Market::Production(firm) => Some(firm.production_at(rate, 1.0)?),
        };

        let agents = self
            .population
            .iter()
            .zip(decisions)
            .map(|((agent, share), decision)| AgentOutcome {
                name: agent.name().to_string(),
                share: *share,
                decision,
            })
            .collect();

        Ok(Allocation {
            rate,
            agents,
            aggregate_savings,
            capital_demand,
            excess_demand: aggregate_savings - capital_demand.unwrap_or(0.0),
            production,
            policy,
            welfare,
            dynamically_inefficient: self.dynamically_inefficient(rate),
        })
    }
}
