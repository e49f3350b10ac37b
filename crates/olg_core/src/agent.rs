//! Individual optimization
//!
//! A two-period agent receives `endowment_young` and `endowment_old`, pays a
//! proportional tax on the young endowment, receives a lump-sum transfer when
//! old, and picks savings `s` to maximize lifetime utility subject to
//!
//! ```text
//! c_young = endowment_young * (1 - tax_young) - s
//! c_old   = endowment_old + transfer_old + R * s
//! ```
//!
//! No closed form is assumed: the utility function is caller-supplied, so the
//! savings choice is solved numerically on the feasible interval.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, SolveError};
use crate::optimization::{ScalarSearchOptions, maximize_scalar};
use crate::utility::Utility;

/// How far below zero savings may go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowingPolicy {
    /// Savings are bounded below by zero
    #[default]
    NoBorrowing,
    /// The agent may borrow up to the present value of old-age income
    NaturalLimit,
}

/// Optimal choices of one agent at given prices and policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub c_young: f64,
    pub c_old: f64,
    pub savings: f64,
    pub utility: f64,
}

/// An agent's utility maximization problem: preferences plus endowments
#[derive(Clone)]
pub struct UtilityProblem {
    utility: Arc<dyn Utility>,
    endowment_young: f64,
    endowment_old: f64,
    borrowing: BorrowingPolicy,
}

impl fmt::Debug for UtilityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtilityProblem")
            .field("endowment_young", &self.endowment_young)
            .field("endowment_old", &self.endowment_old)
            .field("borrowing", &self.borrowing)
            .finish_non_exhaustive()
    }
}

impl UtilityProblem {
    pub fn new(
        utility: Arc<dyn Utility>,
        endowment_young: f64,
        endowment_old: f64,
    ) -> Result<Self, ParameterError> {
        for (name, value) in [
            ("endowment_young", endowment_young),
            ("endowment_old", endowment_old),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParameterError::new(
                    name,
                    value,
                    "endowment must be non-negative and finite",
                ));
            }
        }
        if endowment_young == 0.0 && endowment_old == 0.0 {
            return Err(ParameterError::new(
                "endowment_young",
                endowment_young,
                "at least one endowment must be strictly positive",
            ));
        }
        Ok(Self {
            utility,
            endowment_young,
            endowment_old,
            borrowing: BorrowingPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_borrowing(mut self, borrowing: BorrowingPolicy) -> Self {
        self.borrowing = borrowing;
        self
    }

    pub fn endowment_young(&self) -> f64 {
        self.endowment_young
    }

    pub fn endowment_old(&self) -> f64 {
        self.endowment_old
    }

    pub fn borrowing(&self) -> BorrowingPolicy {
        self.borrowing
    }

    /// Feasible savings interval `[lower, upper]` at rate `rate`
    pub fn savings_bounds(&self, rate: f64, tax_young: f64, transfer_old: f64) -> (f64, f64) {
        let upper = self.endowment_young * (1.0 - tax_young);
        let lower = match self.borrowing {
            BorrowingPolicy::NoBorrowing => 0.0,
            BorrowingPolicy::NaturalLimit => -(self.endowment_old + transfer_old) / rate,
        };
        (lower, upper)
    }

    fn consumption(&self, savings: f64, rate: f64, tax_young: f64, transfer_old: f64) -> (f64, f64) {
        (
            self.endowment_young * (1.0 - tax_young) - savings,
            self.endowment_old + transfer_old + rate * savings,
        )
    }

    /// Solve for optimal savings at gross rate `rate` under the given policy
    pub fn solve(
        &self,
        rate: f64,
        tax_young: f64,
        transfer_old: f64,
    ) -> Result<AgentDecision, SolveError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SolveError::InvalidRate { rate });
        }
        if !(tax_young.is_finite() && (0.0..1.0).contains(&tax_young)) {
            return Err(ParameterError::new("tax_young", tax_young, "must lie in [0, 1)").into());
        }
        if !(transfer_old.is_finite() && transfer_old >= 0.0) {
            return Err(ParameterError::new(
                "transfer_old",
                transfer_old,
                "must be non-negative and finite",
            )
            .into());
        }

        let (lower, upper) = self.savings_bounds(rate, tax_young, transfer_old);
        let decision_at = |savings: f64, utility: f64| {
            let (c_young, c_old) = self.consumption(savings, rate, tax_young, transfer_old);
            AgentDecision {
                c_young,
                c_old,
                savings,
                utility,
            }
        };

        // Corners: undefined or -inf utility there is dominated, +inf has no finite optimum
        let corner = |savings: f64| -> Result<Option<f64>, SolveError> {
            let (c_young, c_old) = self.consumption(savings, rate, tax_young, transfer_old);
            let value = self.utility.evaluate(c_young.max(0.0), c_old.max(0.0));
            if value == f64::INFINITY {
                return Err(SolveError::DegenerateProblem {
                    reason: "utility is unbounded at a corner of the savings interval",
                });
            }
            Ok(value.is_finite().then_some(value))
        };

        if upper <= lower {
            return match corner(lower)? {
                Some(value) => Ok(decision_at(lower, value)),
                None => Err(SolveError::DegenerateProblem {
                    reason: "the only feasible consumption plan has no finite utility",
                }),
            };
        }

        let interior = |savings: f64| -> Result<f64, SolveError> {
            let (c_young, c_old) = self.consumption(savings, rate, tax_young, transfer_old);
            let value = self.utility.evaluate(c_young, c_old);
            if value == f64::INFINITY {
                Err(SolveError::DegenerateProblem {
                    reason: "utility diverges inside the savings interval",
                })
            } else if value.is_finite() {
                Ok(value)
            } else {
                Err(SolveError::InvalidUtilityEvaluation {
                    c_young,
                    c_old,
                    value,
                })
            }
        };

        let peak = maximize_scalar(interior, lower, upper, &ScalarSearchOptions::default())?;
        if peak.singular {
            return Err(SolveError::DegenerateProblem {
                reason: "utility has no finite maximum inside the savings interval",
            });
        }

        let mut best = decision_at(peak.x, peak.value);
        for savings in [lower, upper] {
            if let Some(value) = corner(savings)?
                && value >= best.utility
            {
                best = decision_at(savings, value);
            }
        }
        Ok(best)
    }
}

/// A household type in the economy
#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    problem: UtilityProblem,
}

impl Agent {
    /// Agent with the baseline no-borrowing constraint
    pub fn new(
        name: impl Into<String>,
        utility: Arc<dyn Utility>,
        endowment_young: f64,
        endowment_old: f64,
    ) -> Result<Self, ParameterError> {
        Ok(Self {
            name: name.into(),
            problem: UtilityProblem::new(utility, endowment_young, endowment_old)?,
        })
    }

    #[must_use]
    pub fn with_borrowing(mut self, borrowing: BorrowingPolicy) -> Self {
        self.problem = self.problem.with_borrowing(borrowing);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn problem(&self) -> &UtilityProblem {
        &self.problem
    }

    pub fn solve(
        &self,
        rate: f64,
        tax_young: f64,
        transfer_old: f64,
    ) -> Result<AgentDecision, SolveError> {
        self.problem.solve(rate, tax_young, transfer_old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::{CrraUtility, LogUtility};

    fn log_agent(beta: f64, e_y: f64, e_o: f64) -> Agent {
        Agent::new("test", Arc::new(LogUtility { beta }), e_y, e_o).unwrap()
    }

    fn closed_form(beta: f64, e_y: f64, e_o: f64, rate: f64) -> f64 {
        (beta * e_y - e_o / rate) / (1.0 + beta)
    }

    #[test]
    fn log_savings_match_closed_form() {
        for (beta, e_y, e_o, rate) in [
            (0.96, 10.0, 3.0, 1.05),
            (0.9, 5.0, 0.0, 1.2),
            (0.99, 1.0, 0.5, 0.9),
            (0.5, 8.0, 1.0, 2.0),
        ] {
            let decision = log_agent(beta, e_y, e_o).solve(rate, 0.0, 0.0).unwrap();
            let expected = closed_form(beta, e_y, e_o, rate);
            assert!(
                (decision.savings - expected).abs() < 1e-6,
                "beta={beta} e_y={e_y} e_o={e_o} R={rate}: got {} expected {expected}",
                decision.savings
            );
            assert!((decision.c_young + decision.savings - e_y).abs() < 1e-12);
            assert!((decision.c_old - e_o - rate * decision.savings).abs() < 1e-12);
        }
    }

    #[test]
    fn natural_limit_allows_borrowing() {
        let agent = log_agent(0.96, 3.0, 10.0).with_borrowing(BorrowingPolicy::NaturalLimit);
        let decision = agent.solve(1.05, 0.0, 0.0).unwrap();
        let expected = closed_form(0.96, 3.0, 10.0, 1.05);
        assert!(expected < 0.0);
        assert!((decision.savings - expected).abs() < 1e-6);
    }

    #[test]
    fn no_borrowing_clamps_to_zero() {
        let decision = log_agent(0.96, 3.0, 10.0).solve(1.05, 0.0, 0.0).unwrap();
        assert_eq!(decision.savings, 0.0);
        assert_eq!(decision.c_young, 3.0);
        assert_eq!(decision.c_old, 10.0);
    }

    #[test]
    fn zero_old_endowment_keeps_old_consumption_positive() {
        let decision = log_agent(0.96, 10.0, 0.0).solve(1.1, 0.0, 0.0).unwrap();
        assert!(decision.c_old > 0.0);
        assert!(decision.savings > 0.0);
        assert!(decision.utility.is_finite());
    }

    #[test]
    fn taxes_and_transfers_enter_the_budget() {
        let (beta, e_y, e_o, rate, tax, transfer) = (0.9, 10.0, 1.0, 1.1, 0.2, 0.5);
        let decision = log_agent(beta, e_y, e_o).solve(rate, tax, transfer).unwrap();
        let expected = closed_form(beta, e_y * (1.0 - tax), e_o + transfer, rate);
        assert!((decision.savings - expected).abs() < 1e-6);
    }

    #[test]
    fn crra_satisfies_euler_equation() {
        let (beta, sigma, rate) = (0.96, 2.0, 1.08);
        let agent = Agent::new(
            "crra",
            Arc::new(CrraUtility { beta, sigma }),
            10.0,
            2.0,
        )
        .unwrap();
        let d = agent.solve(rate, 0.0, 0.0).unwrap();
        let ratio = d.c_old / d.c_young;
        assert!((ratio - (beta * rate).powf(1.0 / sigma)).abs() < 1e-5);
    }

    #[test]
    fn upper_corner_is_chosen_exactly() {
        let agent = Agent::new("patient", Arc::new(|_c_y: f64, c_o: f64| c_o), 4.0, 1.0).unwrap();
        let decision = agent.solve(1.1, 0.0, 0.0).unwrap();
        assert_eq!(decision.savings, 4.0);
        assert_eq!(decision.c_young, 0.0);
    }

    #[test]
    fn rejects_non_positive_rates() {
        let agent = log_agent(0.96, 1.0, 1.0);
        for rate in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                agent.solve(rate, 0.0, 0.0),
                Err(SolveError::InvalidRate { .. })
            ));
        }
    }

    #[test]
    fn rejects_invalid_endowments() {
        let u: Arc<dyn Utility> = Arc::new(LogUtility { beta: 0.9 });
        assert!(Agent::new("a", u.clone(), 0.0, 0.0).is_err());
        assert!(Agent::new("a", u.clone(), -1.0, 1.0).is_err());
        assert!(Agent::new("a", u, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn interior_divergence_is_degenerate() {
        // Utility spikes to +inf where c_young == 1
        let u = |c_y: f64, _c_o: f64| -(c_y - 1.0).abs().ln();
        let agent = Agent::new("spiky", Arc::new(u), 2.0, 1.0).unwrap();
        assert!(matches!(
            agent.solve(1.0, 0.0, 0.0),
            Err(SolveError::DegenerateProblem { .. })
        ));
    }

    #[test]
    fn bounded_cusp_has_an_interior_optimum() {
        // Peaks at 0 where c_young == c_old, i.e. s = 5
        let u = |c_y: f64, c_o: f64| -(c_y - c_o).abs().powf(0.25);
        let agent = Agent::new("cusp", Arc::new(u), 10.0, 0.0).unwrap();
        let decision = agent.solve(1.0, 0.0, 0.0).unwrap();
        assert!((decision.savings - 5.0).abs() < 1e-6, "s = {}", decision.savings);
        assert!(decision.utility <= 0.0 && decision.utility > -0.05);
    }

    #[test]
    fn nan_inside_the_interval_is_a_caller_error() {
        let u = |c_y: f64, c_o: f64| if c_y > 1.0 { f64::NAN } else { c_y + c_o };
        let agent = Agent::new("broken", Arc::new(u), 2.0, 1.0).unwrap();
        assert!(matches!(
            agent.solve(1.0, 0.0, 0.0),
            Err(SolveError::InvalidUtilityEvaluation { .. })
        ));
    }

    #[test]
    fn single_point_interval_without_finite_utility_is_degenerate() {
        // No young endowment and no borrowing: c_young is pinned at zero
        let agent = log_agent(0.9, 0.0, 1.0);
        assert!(matches!(
            agent.solve(1.0, 0.0, 0.0),
            Err(SolveError::DegenerateProblem { .. })
        ));
    }

    #[test]
    fn repeated_solves_are_identical() {
        let agent = log_agent(0.96, 10.0, 3.0);
        assert_eq!(agent.solve(1.04, 0.1, 0.2), agent.solve(1.04, 0.1, 0.2));
    }
}
