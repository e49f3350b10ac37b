//! Sweep evaluator - solves the steady state at every point of a parameter grid.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::config::{ScenarioConfig, ScenarioOutcome};
use crate::error::{SolveError, SweepError};

use super::{SweepConfig, SweepGrid};

/// Progress tracking for sweep analysis
#[derive(Debug, Clone)]
pub struct SweepProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SweepProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Points already running finish; no new point starts
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Summary of a solved grid point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub rate: f64,
    pub residual: f64,
    pub iterations: usize,
    pub aggregate_savings: f64,
    pub welfare: f64,
    pub capital: Option<f64>,
    pub output: Option<f64>,
    pub wage: Option<f64>,
    pub tax_rate_young: f64,
    pub transfer_payment: f64,
    pub spending_per_old: f64,
    pub dynamically_inefficient: bool,
}

impl SweepPoint {
    fn from_outcome(outcome: &ScenarioOutcome) -> Self {
        let allocation = &outcome.allocation;
        let production = allocation.production.as_ref();
        Self {
            rate: outcome.equilibrium.rate,
            residual: outcome.equilibrium.residual,
            iterations: outcome.equilibrium.iterations,
            aggregate_savings: allocation.aggregate_savings,
            welfare: allocation.welfare,
            capital: production.map(|p| p.capital),
            output: production.map(|p| p.output),
            wage: production.map(|p| p.wage),
            tax_rate_young: allocation.policy.tax_rate_young,
            transfer_payment: allocation.policy.transfer_payment,
            spending_per_old: allocation.policy.spending_per_old,
            dynamically_inefficient: allocation.dynamically_inefficient,
        }
    }
}

fn serialize_display<S: Serializer>(err: &SolveError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Result at one grid point; failures are kept, never replaced by a number
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointOutcome {
    Solved(SweepPoint),
    Failed(#[serde(serialize_with = "serialize_display")] SolveError),
}

impl PointOutcome {
    pub fn rate(&self) -> Option<f64> {
        match self {
            PointOutcome::Solved(point) => Some(point.rate),
            PointOutcome::Failed(_) => None,
        }
    }

    pub fn point(&self) -> Option<&SweepPoint> {
        match self {
            PointOutcome::Solved(point) => Some(point),
            PointOutcome::Failed(_) => None,
        }
    }
}

/// Outcomes over an N-dimensional sweep grid
#[derive(Debug, Clone, Serialize)]
pub struct SweepResults {
    pub param_values: Vec<Vec<f64>>,
    pub param_labels: Vec<String>,
    pub outcomes: SweepGrid<PointOutcome>,
}

impl SweepResults {
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.param_values.len()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.outcomes.shape()
    }

    #[must_use]
    pub fn get(&self, indices: &[usize]) -> Option<&PointOutcome> {
        self.outcomes.get(indices)
    }

    /// Parameter values at a grid position
    #[must_use]
    pub fn coordinates(&self, indices: &[usize]) -> Option<Vec<f64>> {
        indices
            .iter()
            .zip(&self.param_values)
            .map(|(&i, values)| values.get(i).copied())
            .collect()
    }

    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.outcomes
            .data()
            .iter()
            .filter(|o| matches!(o, PointOutcome::Solved(_)))
            .count()
    }

    /// Equilibrium rate at every point, `None` where the solve failed
    #[must_use]
    pub fn rate_grid(&self) -> SweepGrid<Option<f64>> {
        self.outcomes.map(PointOutcome::rate)
    }
}

fn evaluate_point(config: &ScenarioConfig, indices: &[usize]) -> PointOutcome {
    match config.solve() {
        Ok(outcome) => PointOutcome::Solved(SweepPoint::from_outcome(&outcome)),
        Err(err) => {
            tracing::warn!(?indices, error = %err, "sweep point failed");
            PointOutcome::Failed(err)
        }
    }
}

/// Solve `base` at every point of the grid described by `sweep_config`.
///
/// Points are independent; with the `parallel` feature they are solved on the
/// rayon pool. Results are always stored in row-major grid order.
pub fn sweep_equilibrium(
    base: &ScenarioConfig,
    sweep_config: &SweepConfig,
    progress: Option<&SweepProgress>,
) -> Result<SweepResults, SweepError> {
    sweep_config.validate()?;

    let param_values = sweep_config.all_sweep_values();
    let param_labels = sweep_config.labels();
    let shape = sweep_config.grid_shape();

    if let Some(p) = progress {
        p.reset(sweep_config.total_points());
    }

    // Build every scenario up front so configuration errors surface before any solve
    let points = super::GridIndices::new(shape.clone())
        .map(|indices| -> Result<(Vec<usize>, ScenarioConfig), SweepError> {
            let mut config = base.clone();
            for (dim, &idx) in indices.iter().enumerate() {
                config = sweep_config.parameters[dim].apply(&config, param_values[dim][idx])?;
            }
            Ok((indices, config))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let solve = |(indices, config): &(Vec<usize>, ScenarioConfig)| -> Option<PointOutcome> {
        if progress.is_some_and(SweepProgress::is_cancelled) {
            return None;
        }
        let outcome = evaluate_point(config, indices);
        if let Some(p) = progress {
            p.increment();
        }
        Some(outcome)
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Option<PointOutcome>> = points.par_iter().map(solve).collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Option<PointOutcome>> = points.iter().map(solve).collect();

    let outcomes: Vec<PointOutcome> = outcomes
        .into_iter()
        .collect::<Option<_>>()
        .ok_or(SweepError::Cancelled)?;
    let outcomes = SweepGrid::from_data(shape, outcomes)
        .ok_or_else(|| SweepError::Config("sweep grid size mismatch".to_string()))?;

    tracing::debug!(
        points = outcomes.len(),
        solved = outcomes
            .data()
            .iter()
            .filter(|o| matches!(o, PointOutcome::Solved(_)))
            .count(),
        "sweep complete"
    );

    Ok(SweepResults {
        param_values,
        param_labels,
        outcomes,
    })
}
