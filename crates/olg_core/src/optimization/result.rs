//! Root search result types
//!
//! Contains types for tracking root-finding progress and final results.

use serde::{Deserialize, Serialize};

/// A single evaluation of the excess demand function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Gross interest rate that was evaluated
    pub rate: f64,

    /// Excess demand at that rate
    pub residual: f64,
}

/// History of evaluations during a root search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    /// All evaluations in the order they were performed
    pub evaluations: Vec<EvaluationRecord>,

    /// Smallest absolute residual seen after each evaluation (monotonically non-increasing)
    pub best_residuals: Vec<f64>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new evaluation
    pub fn record(&mut self, rate: f64, residual: f64) {
        let current_best = self.best_residuals.last().copied().unwrap_or(f64::INFINITY);
        self.best_residuals.push(current_best.min(residual.abs()));
        self.evaluations.push(EvaluationRecord { rate, residual });
    }

    #[must_use]
    pub fn num_evaluations(&self) -> usize {
        self.evaluations.len()
    }

    /// The evaluation with the smallest absolute residual
    #[must_use]
    pub fn best_evaluation(&self) -> Option<&EvaluationRecord> {
        self.evaluations.iter().min_by(|a, b| {
            a.residual
                .abs()
                .partial_cmp(&b.residual.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Why a root search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// |excess demand| fell below the tolerance
    ResidualTolerance,

    /// The bracket around the root became narrower than the tolerance
    BracketWidth,
}

/// Outcome of a converged root search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResult {
    /// Gross interest rate at the root
    pub rate: f64,

    /// Excess demand at `rate`
    pub residual: f64,

    /// Number of iterations after the bracket endpoints were evaluated
    pub iterations: usize,

    pub termination: TerminationReason,

    /// Final bracket (low, high) containing the root
    pub bracket: (f64, f64),

    pub history: ConvergenceHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_tracks_best_residual() {
        let mut history = ConvergenceHistory::new();
        history.record(1.0, -0.5);
        history.record(1.2, 0.1);
        history.record(1.1, -0.3);

        assert_eq!(history.num_evaluations(), 3);
        assert_eq!(history.best_residuals, vec![0.5, 0.1, 0.1]);
        assert_eq!(history.best_evaluation().map(|e| e.rate), Some(1.2));
    }
}
