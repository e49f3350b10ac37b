//! Configuration types for comparative statics sweeps.

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::error::SweepError;
use crate::government::Instrument;
use crate::utility::UtilitySpec;

/// Which scenario parameter a sweep dimension moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepTarget {
    /// Discount factor of every agent
    Beta,
    /// Relative risk aversion of every CRRA agent
    Sigma,
    /// Population share of one agent type; the others are rescaled to keep the total at one
    Share { agent: usize },
    EndowmentYoung { agent: usize },
    EndowmentOld { agent: usize },
    GrowthRate,
    TaxRateYoung,
    TransferPayment,
    SpendingPerOld,
    Tfp,
    CapitalShare,
    Depreciation,
}

/// N-dimensional grid storage with flat backing array and stride-based indexing.
///
/// Stores values in row-major order where the last dimension varies fastest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepGrid<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> SweepGrid<T> {
    /// Create a grid from row-major data
    pub fn from_data(shape: Vec<usize>, data: Vec<T>) -> Option<Self> {
        let total_size: usize = shape.iter().product();
        if data.len() != total_size {
            return None;
        }
        let strides = compute_strides(&shape);
        Some(Self {
            data,
            shape,
            strides,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert multi-dimensional indices to flat index
    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for ((&idx, &size), &stride) in indices.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= size {
                return None;
            }
            flat += idx * stride;
        }
        Some(flat)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.flat_index(indices).map(|i| &self.data[i])
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Same shape, values mapped through `f`
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> SweepGrid<U> {
        SweepGrid {
            data: self.data.iter().map(f).collect(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        }
    }

    /// Iterate over all indices in row-major order
    pub fn indices(&self) -> GridIndices {
        GridIndices::new(self.shape.clone())
    }

    /// Iterate over (indices, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &T)> {
        self.indices().zip(self.data.iter())
    }
}

/// Compute strides for row-major order
fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Iterator over all indices of a grid shape
pub struct GridIndices {
    shape: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl GridIndices {
    pub fn new(shape: Vec<usize>) -> Self {
        let done = shape.is_empty() || shape.contains(&0);
        Self {
            current: vec![0; shape.len()],
            shape,
            done,
        }
    }
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // Last dimension varies fastest
        for i in (0..self.shape.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.shape[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }

        Some(result)
    }
}

/// One dimension of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParameter {
    pub target: SweepTarget,
    pub min_value: f64,
    pub max_value: f64,
    /// Number of evenly spaced points, endpoints included
    pub step_count: usize,
}

impl SweepParameter {
    pub fn new(target: SweepTarget, min_value: f64, max_value: f64, step_count: usize) -> Self {
        Self {
            target,
            min_value,
            max_value,
            step_count,
        }
    }

    pub fn sweep_values(&self) -> Vec<f64> {
        if self.step_count <= 1 {
            return vec![self.min_value];
        }
        let step_size = (self.max_value - self.min_value) / (self.step_count - 1) as f64;
        (0..self.step_count)
            .map(|i| self.min_value + step_size * i as f64)
            .collect()
    }

    pub fn label(&self) -> String {
        match self.target {
            SweepTarget::Beta => "beta".to_string(),
            SweepTarget::Sigma => "sigma".to_string(),
            SweepTarget::Share { agent } => format!("share[{agent}]"),
            SweepTarget::EndowmentYoung { agent } => format!("endowment_young[{agent}]"),
            SweepTarget::EndowmentOld { agent } => format!("endowment_old[{agent}]"),
            SweepTarget::GrowthRate => "g".to_string(),
            SweepTarget::TaxRateYoung => Instrument::TaxRate.to_string(),
            SweepTarget::TransferPayment => Instrument::Transfer.to_string(),
            SweepTarget::SpendingPerOld => Instrument::Spending.to_string(),
            SweepTarget::Tfp => "tfp".to_string(),
            SweepTarget::CapitalShare => "alpha".to_string(),
            SweepTarget::Depreciation => "delta".to_string(),
        }
    }

    /// Copy of `config` with this parameter set to `value`.
    ///
    /// Fails when the target does not exist in the scenario. Out-of-range
    /// values are left for scenario validation to reject at solve time.
    pub fn apply(&self, config: &ScenarioConfig, value: f64) -> Result<ScenarioConfig, SweepError> {
        let mut config = config.clone();
        let agent_count = config.agents.len();
        let missing_agent = |agent: usize| {
            SweepError::Config(format!(
                "{} targets agent {agent} but the scenario has {agent_count}",
                self.label()
            ))
        };

        match self.target {
            SweepTarget::Beta => {
                for agent in &mut config.agents {
                    agent.utility = agent.utility.with_beta(value);
                }
            }
            SweepTarget::Sigma => {
                let mut found = false;
                for agent in &mut config.agents {
                    if let UtilitySpec::Crra { sigma, .. } = &mut agent.utility {
                        *sigma = value;
                        found = true;
                    }
                }
                if !found {
                    return Err(SweepError::Config(
                        "sigma sweep needs at least one CRRA agent".to_string(),
                    ));
                }
            }
            SweepTarget::Share { agent } => {
                if agent >= agent_count {
                    return Err(missing_agent(agent));
                }
                if agent_count < 2 {
                    return Err(SweepError::Config(
                        "share sweep needs at least two agent types".to_string(),
                    ));
                }
                let others: f64 = config
                    .agents
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != agent)
                    .map(|(_, a)| a.share)
                    .sum();
                for (i, a) in config.agents.iter_mut().enumerate() {
                    a.share = if i == agent {
                        value
                    } else if others > 0.0 {
                        a.share / others * (1.0 - value)
                    } else {
                        (1.0 - value) / (agent_count - 1) as f64
                    };
                }
            }
            SweepTarget::EndowmentYoung { agent } => {
                config
                    .agents
                    .get_mut(agent)
                    .ok_or_else(|| missing_agent(agent))?
                    .endowment_young = value;
            }
            SweepTarget::EndowmentOld { agent } => {
                config
                    .agents
                    .get_mut(agent)
                    .ok_or_else(|| missing_agent(agent))?
                    .endowment_old = value;
            }
            SweepTarget::GrowthRate => config.growth_rate = value,
            SweepTarget::TaxRateYoung | SweepTarget::TransferPayment | SweepTarget::SpendingPerOld => {
                let instrument = match self.target {
                    SweepTarget::TaxRateYoung => Instrument::TaxRate,
                    SweepTarget::TransferPayment => Instrument::Transfer,
                    _ => Instrument::Spending,
                };
                let rule = config.government.as_mut().ok_or_else(|| {
                    SweepError::Config(format!("{instrument} sweep needs a government"))
                })?;
                if !rule.set_fixed(instrument, value) {
                    return Err(SweepError::Config(format!(
                        "{instrument} is the residual instrument and cannot be swept"
                    )));
                }
            }
            SweepTarget::Tfp | SweepTarget::CapitalShare | SweepTarget::Depreciation => {
                let firm = config.firm.as_mut().ok_or_else(|| {
                    SweepError::Config(format!("{} sweep needs a firm", self.label()))
                })?;
                match self.target {
                    SweepTarget::Tfp => firm.tfp = value,
                    SweepTarget::CapitalShare => firm.alpha = value,
                    _ => firm.delta = value,
                }
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Parameters to sweep (supports N dimensions)
    pub parameters: Vec<SweepParameter>,
}

impl SweepConfig {
    pub fn ndim(&self) -> usize {
        self.parameters.len()
    }

    pub fn total_points(&self) -> usize {
        self.parameters.iter().map(|p| p.step_count).product()
    }

    pub fn grid_shape(&self) -> Vec<usize> {
        self.parameters.iter().map(|p| p.step_count).collect()
    }

    pub fn all_sweep_values(&self) -> Vec<Vec<f64>> {
        self.parameters.iter().map(SweepParameter::sweep_values).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.parameters.iter().map(SweepParameter::label).collect()
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.parameters.is_empty() {
            return Err(SweepError::Config(
                "at least one sweep parameter required".to_string(),
            ));
        }
        for parameter in &self.parameters {
            if parameter.step_count == 0 {
                return Err(SweepError::Config(format!(
                    "{} has zero steps",
                    parameter.label()
                )));
            }
            if !(parameter.min_value.is_finite() && parameter.max_value.is_finite()) {
                return Err(SweepError::Config(format!(
                    "{} has a non-finite range",
                    parameter.label()
                )));
            }
        }
        Ok(())
    }
}
