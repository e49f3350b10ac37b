//! Equilibrium interest rate search
//!
//! The [`Solver`] root-finds the gross rate `R*` that zeros
//! [`Economy::excess_demand`]. The search starts from a configured bracket,
//! widens it symmetrically while both ends share a sign, then hands the
//! bracket to [`brent_root`]. The outcome is cached in [`SolverState`].

use serde::{Deserialize, Serialize};

use crate::economy::{Allocation, Economy};
use crate::error::{ParameterError, Result, SolveError};
use crate::optimization::{
    ConvergenceHistory, RootOptions, RootResult, RootSearch, TerminationReason, brent_root,
};

/// Distance kept between the low end of a bracket and the firm's rate floor
const FLOOR_MARGIN: f64 = 1e-6;

fn default_bracket() -> (f64, f64) {
    (0.8, 1.5)
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> usize {
    200
}

fn default_max_bracket_expansions() -> usize {
    12
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Initial (low, high) bracket for the gross interest rate
    #[serde(default = "default_bracket")]
    pub bracket: (f64, f64),

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Number of symmetric doublings tried when the bracket has no sign change
    #[serde(default = "default_max_bracket_expansions")]
    pub max_bracket_expansions: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            bracket: default_bracket(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            max_bracket_expansions: default_max_bracket_expansions(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        let (low, high) = self.bracket;
        if !(low.is_finite() && low > 0.0) {
            return Err(ParameterError::new(
                "bracket.low",
                low,
                "lower bracket end must be positive and finite",
            ));
        }
        if !(high.is_finite() && high > low) {
            return Err(ParameterError::new(
                "bracket.high",
                high,
                "upper bracket end must be finite and above the lower end",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ParameterError::new(
                "tolerance",
                self.tolerance,
                "tolerance must be positive and finite",
            ));
        }
        if self.max_iterations == 0 {
            return Err(ParameterError::new(
                "max_iterations",
                0.0,
                "at least one iteration is required",
            ));
        }
        Ok(())
    }
}

/// A converged equilibrium and how the search got there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumSolution {
    pub rate: f64,
    pub residual: f64,
    pub iterations: usize,
    pub termination: TerminationReason,
    /// Final bracket around `rate`
    pub bracket: (f64, f64),
    /// Bracket doublings needed before a sign change was found
    pub expansions: usize,
    pub history: ConvergenceHistory,
}

impl EquilibriumSolution {
    fn from_root(root: RootResult, expansions: usize) -> Self {
        Self {
            rate: root.rate,
            residual: root.residual,
            iterations: root.iterations,
            termination: root.termination,
            bracket: root.bracket,
            expansions,
            history: root.history,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SolverState {
    #[default]
    Unsolved,
    Solving,
    Solved(EquilibriumSolution),
    Failed(SolveError),
}

#[derive(Debug)]
pub struct Solver<'a> {
    economy: &'a Economy,
    config: SolverConfig,
    state: SolverState,
}

impl<'a> Solver<'a> {
    pub fn new(economy: &'a Economy) -> Self {
        Self::with_config(economy, SolverConfig::default())
    }

    pub fn with_config(economy: &'a Economy, config: SolverConfig) -> Self {
        Self {
            economy,
            config,
            state: SolverState::Unsolved,
        }
    }

    pub fn economy(&self) -> &'a Economy {
        self.economy
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn state(&self) -> &SolverState {
        &self.state
    }

    /// Cached solution of the last successful solve
    pub fn equilibrium(&self) -> Option<&EquilibriumSolution> {
        match &self.state {
            SolverState::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// Allocation at the cached equilibrium rate, `None` before a successful solve
    pub fn allocation(&self) -> Option<Result<Allocation>> {
        self.equilibrium()
            .map(|solution| self.economy.allocation(solution.rate))
    }

    /// Solve with the stored configuration
    pub fn find_equilibrium_r(&mut self) -> Result<f64> {
        let config = self.config;
        self.run(config)
    }

    /// Solve with an explicit bracket, tolerance and iteration budget
    pub fn find_equilibrium_r_with(
        &mut self,
        bracket: (f64, f64),
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<f64> {
        let config = SolverConfig {
            bracket,
            tolerance,
            max_iterations,
            ..self.config
        };
        self.run(config)
    }

    fn run(&mut self, config: SolverConfig) -> Result<f64> {
        self.state = SolverState::Solving;
        match solve_equilibrium(self.economy, &config) {
            Ok(solution) => {
                let rate = solution.rate;
                self.state = SolverState::Solved(solution);
                Ok(rate)
            }
            Err(err) => {
                self.state = SolverState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

/// Widening stops at these; the second value is the closest allowed rate
fn lower_limit(economy: &Economy) -> (f64, f64) {
    match economy.rate_floor() {
        Some(floor) => (floor, floor + FLOOR_MARGIN),
        None => (0.0, f64::MIN_POSITIVE),
    }
}

/// Bracket errors that mean "outside the economy's domain" rather than a failure
fn is_domain_error(err: &SolveError) -> bool {
    matches!(
        err,
        SolveError::NoCapitalDemand { .. } | SolveError::InvalidRate { .. }
    )
}

/// One-shot equilibrium search, with no solver state involved
pub fn solve_equilibrium(economy: &Economy, config: &SolverConfig) -> Result<EquilibriumSolution> {
    config.validate()?;
    let f = |rate: f64| economy.excess_demand(rate);
    let (limit, closest) = lower_limit(economy);

    let (mut low, mut high) = config.bracket;
    if low <= closest {
        let width = high - low;
        low = closest;
        if high <= low {
            high = low + width;
        }
        tracing::debug!(low, high, "lifted bracket above rate floor");
    }

    let mut search = RootSearch::new(&f, low, high)?;
    let mut expansions = 0;
    while !search.has_sign_change() {
        if expansions == config.max_bracket_expansions {
            return Err(SolveError::NoBracket {
                low: search.low,
                high: search.high,
                residual_low: search.residual_low,
                residual_high: search.residual_high,
                expansions,
            });
        }
        expansions += 1;

        let center = 0.5 * (search.low + search.high);
        let half_width = search.high - search.low;
        let mut new_low = center - half_width;
        if new_low <= closest {
            // Halve the distance to the limit instead of crossing it
            new_low = limit + 0.5 * (search.low - limit);
        }
        let new_high = center + half_width;

        if new_low > closest && new_low < search.low {
            match f(new_low) {
                Ok(residual) => {
                    search.low = new_low;
                    search.residual_low = residual;
                    search.history.record(new_low, residual);
                }
                Err(err) if is_domain_error(&err) => {}
                Err(err) => return Err(err),
            }
        }
        match f(new_high) {
            Ok(residual) => {
                search.high = new_high;
                search.residual_high = residual;
                search.history.record(new_high, residual);
            }
            Err(err) if is_domain_error(&err) => {}
            Err(err) => return Err(err),
        }

        tracing::debug!(
            expansions,
            low = search.low,
            high = search.high,
            residual_low = search.residual_low,
            residual_high = search.residual_high,
            "expanded bracket"
        );
    }

    let options = RootOptions {
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
    };
    let root = brent_root(&f, search, &options).map_err(|err| match err {
        SolveError::NoBracket {
            low,
            high,
            residual_low,
            residual_high,
            ..
        } => SolveError::NoBracket {
            low,
            high,
            residual_low,
            residual_high,
            expansions,
        },
        other => other,
    })?;

    tracing::info!(
        rate = root.rate,
        residual = root.residual,
        iterations = root.iterations,
        expansions,
        "found equilibrium"
    );
    Ok(EquilibriumSolution::from_root(root, expansions))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agent::{Agent, BorrowingPolicy};
    use crate::economy::Market;
    use crate::firm::Firm;
    use crate::utility::LogUtility;

    fn symmetric_exchange(beta: f64) -> Economy {
        let u = Arc::new(LogUtility { beta });
        let saver = Agent::new("saver", u.clone(), 10.0, 3.0)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        let borrower = Agent::new("borrower", u, 3.0, 10.0)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        Economy::new(
            vec![(saver, 0.5), (borrower, 0.5)],
            0.02,
            Market::Exchange,
            None,
        )
        .unwrap()
    }

    #[test]
    fn state_machine_transitions() {
        let economy = symmetric_exchange(0.96);
        let mut solver = Solver::new(&economy);
        assert_eq!(solver.state(), &SolverState::Unsolved);
        assert!(solver.allocation().is_none());

        let rate = solver.find_equilibrium_r().unwrap();
        assert!(matches!(solver.state(), SolverState::Solved(_)));
        assert_eq!(solver.equilibrium().map(|s| s.rate), Some(rate));

        let err = solver
            .find_equilibrium_r_with((1.0, 1.01), 1e-10, 200)
            .map(|_| ());
        // Expansion recovers the root from a narrow bracket on the wrong side
        assert!(err.is_ok());
    }

    #[test]
    fn failure_is_cached() {
        let economy = symmetric_exchange(0.96);
        let config = SolverConfig {
            bracket: (1.3, 1.4),
            max_bracket_expansions: 0,
            ..SolverConfig::default()
        };
        let mut solver = Solver::with_config(&economy, config);
        let err = solver.find_equilibrium_r().unwrap_err();
        assert!(matches!(err, SolveError::NoBracket { expansions: 0, .. }));
        assert_eq!(solver.state(), &SolverState::Failed(err));
        assert!(solver.equilibrium().is_none());
    }

    #[test]
    fn rejects_invalid_config() {
        let economy = symmetric_exchange(0.96);
        let mut solver = Solver::new(&economy);
        assert!(matches!(
            solver.find_equilibrium_r_with((-1.0, 1.5), 1e-10, 200),
            Err(SolveError::InvalidParameter(_))
        ));
        assert!(matches!(
            solver.find_equilibrium_r_with((1.2, 1.1), 1e-10, 200),
            Err(SolveError::InvalidParameter(_))
        ));
    }

    #[test]
    fn bracket_below_rate_floor_is_lifted() {
        let agent = Agent::new("worker", Arc::new(LogUtility { beta: 0.96 }), 5.0, 0.0).unwrap();
        let economy = Economy::new(
            vec![(agent, 1.0)],
            0.0,
            Market::Production(Firm::new(1.0, 0.33, 0.05).unwrap()),
            None,
        )
        .unwrap();
        let config = SolverConfig {
            bracket: (0.5, 1.5),
            ..SolverConfig::default()
        };
        let solution = solve_equilibrium(&economy, &config).unwrap();
        assert!(solution.rate > 0.95);
        assert!(solution.residual.abs() < 1e-8);
    }
}
