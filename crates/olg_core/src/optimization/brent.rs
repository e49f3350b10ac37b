//! Bracketed root finding (Brent's method)
//!
//! Combines inverse quadratic interpolation, the secant step and bisection.
//! Every iterate stays inside a bracket with a sign change, so the search can
//! never wander into rates where the excess demand function is undefined.

use serde::{Deserialize, Serialize};

use crate::error::SolveError;

use super::result::{ConvergenceHistory, EvaluationRecord, RootResult, TerminationReason};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootOptions {
    /// Converged when |residual| or the bracket width falls below this
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
        }
    }
}

/// Explicit state of a bracketed search before iteration starts
#[derive(Debug, Clone, PartialEq)]
pub struct RootSearch {
    pub low: f64,
    pub high: f64,
    pub residual_low: f64,
    pub residual_high: f64,
    pub history: ConvergenceHistory,
}

impl RootSearch {
    /// Evaluate `f` at both ends of `[low, high]`
    pub fn new<F>(f: &F, low: f64, high: f64) -> Result<Self, SolveError>
    where
        F: Fn(f64) -> Result<f64, SolveError>,
    {
        let residual_low = f(low)?;
        let residual_high = f(high)?;
        let mut history = ConvergenceHistory::new();
        history.record(low, residual_low);
        history.record(high, residual_high);
        Ok(Self {
            low,
            high,
            residual_low,
            residual_high,
            history,
        })
    }

    /// Residuals differ in sign (or one end is already a root)
    pub fn has_sign_change(&self) -> bool {
        self.residual_low == 0.0
            || self.residual_high == 0.0
            || (self.residual_low < 0.0) != (self.residual_high < 0.0)
    }
}

/// Find a root of `f` inside the bracket held by `search`.
///
/// Fails with [`SolveError::NoBracket`] if the bracket has no sign change and
/// with [`SolveError::Convergence`] when `max_iterations` runs out.
pub fn brent_root<F>(
    f: &F,
    search: RootSearch,
    options: &RootOptions,
) -> Result<RootResult, SolveError>
where
    F: Fn(f64) -> Result<f64, SolveError>,
{
    if !search.has_sign_change() {
        return Err(SolveError::NoBracket {
            low: search.low,
            high: search.high,
            residual_low: search.residual_low,
            residual_high: search.residual_high,
            expansions: 0,
        });
    }

    let RootSearch {
        low,
        high,
        residual_low,
        residual_high,
        mut history,
    } = search;

    let tol = options.tolerance;
    let finish = |rate: f64,
                  residual: f64,
                  other: f64,
                  iterations: usize,
                  termination: TerminationReason,
                  history: ConvergenceHistory|
     -> Result<RootResult, SolveError> {
        Ok(RootResult {
            rate,
            residual,
            iterations,
            termination,
            bracket: (rate.min(other), rate.max(other)),
            history,
        })
    };

    if residual_low.abs() < tol && residual_low.abs() <= residual_high.abs() {
        return finish(
            low,
            residual_low,
            high,
            0,
            TerminationReason::ResidualTolerance,
            history,
        );
    }
    if residual_high.abs() < tol {
        return finish(
            high,
            residual_high,
            low,
            0,
            TerminationReason::ResidualTolerance,
            history,
        );
    }

    // b: best estimate, a: previous estimate, c: counterpoint with opposite sign
    let (mut a, mut b) = (low, high);
    let (mut fa, mut fb) = (residual_low, residual_high);
    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for iteration in 1..=options.max_iterations {
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        if fb.abs() < tol {
            return finish(
                b,
                fb,
                c,
                iteration - 1,
                TerminationReason::ResidualTolerance,
                history,
            );
        }
        if (c - b).abs() < tol {
            return finish(
                b,
                fb,
                c,
                iteration - 1,
                TerminationReason::BracketWidth,
                history,
            );
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 {
            d
        } else {
            tol1.copysign(xm)
        };
        fb = f(b)?;
        history.record(b, fb);

        tracing::trace!(iteration, rate = b, residual = fb, "root search step");
    }

    // The last step's evaluation has not been tested yet
    if (fb > 0.0) == (fc > 0.0) {
        c = a;
    }
    if fb.abs() < tol {
        return finish(
            b,
            fb,
            c,
            options.max_iterations,
            TerminationReason::ResidualTolerance,
            history,
        );
    }
    if (c - b).abs() < tol {
        return finish(
            b,
            fb,
            c,
            options.max_iterations,
            TerminationReason::BracketWidth,
            history,
        );
    }

    let best = history
        .best_evaluation()
        .copied()
        .unwrap_or(EvaluationRecord {
            rate: b,
            residual: fb,
        });
    Err(SolveError::Convergence {
        best_rate: best.rate,
        residual: best.residual,
        iterations: options.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(f: impl Fn(f64) -> Result<f64, SolveError>, low: f64, high: f64) -> RootResult {
        let search = RootSearch::new(&f, low, high).unwrap();
        brent_root(&f, search, &RootOptions::default()).unwrap()
    }

    #[test]
    fn finds_square_root_of_two() {
        let root = solve(|x| Ok(x * x - 2.0), 0.0, 2.0);
        assert!((root.rate - 2f64.sqrt()).abs() < 1e-9);
        assert!(root.iterations < 20);
    }

    #[test]
    fn handles_decreasing_functions() {
        let root = solve(|x| Ok(1.0 / x - 0.8), 0.5, 3.0);
        assert!((root.rate - 1.25).abs() < 1e-9);
    }

    #[test]
    fn returns_endpoint_that_is_already_a_root() {
        let root = solve(|x| Ok(x - 1.0), 1.0, 3.0);
        assert_eq!(root.rate, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn rejects_bracket_without_sign_change() {
        let f = |x: f64| Ok(x * x + 1.0);
        let search = RootSearch::new(&f, -1.0, 2.0).unwrap();
        assert!(!search.has_sign_change());
        let err = brent_root(&f, search, &RootOptions::default()).unwrap_err();
        assert!(matches!(err, SolveError::NoBracket { .. }));
    }

    #[test]
    fn reports_best_point_when_out_of_iterations() {
        let f = |x: f64| Ok((x - 1.3).powi(3));
        let search = RootSearch::new(&f, 0.0, 2.0).unwrap();
        let options = RootOptions {
            tolerance: 1e-14,
            max_iterations: 3,
        };
        match brent_root(&f, search, &options) {
            Err(SolveError::Convergence {
                best_rate,
                residual,
                iterations,
            }) => {
                assert_eq!(iterations, 3);
                assert!(best_rate > 0.0 && best_rate < 2.0);
                assert!(residual.abs() <= 0.7_f64.powi(3));
            }
            other => panic!("expected convergence error, got {other:?}"),
        }
    }

    #[test]
    fn root_hit_on_final_iteration_is_converged() {
        // One secant step from [0, 3] lands exactly on the root
        let f = |x: f64| Ok(x - 1.0);
        let search = RootSearch::new(&f, 0.0, 3.0).unwrap();
        let options = RootOptions {
            tolerance: 1e-10,
            max_iterations: 1,
        };
        let root = brent_root(&f, search, &options).unwrap();
        assert_eq!(root.rate, 1.0);
        assert_eq!(root.residual, 0.0);
        assert_eq!(root.iterations, 1);
        assert_eq!(root.termination, TerminationReason::ResidualTolerance);
    }

    #[test]
    fn is_deterministic() {
        let f = |x: f64| Ok(x.exp() - 3.0);
        let first = solve(f, 0.0, 2.0);
        let second = solve(f, 0.0, 2.0);
        assert_eq!(first, second);
    }
}
