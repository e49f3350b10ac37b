use std::fmt;

use crate::government::Instrument;

/// A model parameter that failed validation at construction or solve time
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterError {
    pub name: &'static str,
    pub value: f64,
    pub reason: &'static str,
}

impl ParameterError {
    pub fn new(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self {
            name,
            value,
            reason,
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid parameter {} = {}: {}",
            self.name, self.value, self.reason
        )
    }
}

impl std::error::Error for ParameterError {}

/// Errors raised while solving an agent problem, evaluating excess demand,
/// or root-finding the equilibrium interest rate
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Gross interest rate was non-positive or not finite
    InvalidRate { rate: f64 },
    /// The agent's problem has no finite maximum on its feasible interval
    DegenerateProblem { reason: &'static str },
    /// The firm's first-order condition has no positive finite solution at this rate
    NoCapitalDemand { rate: f64 },
    /// The residual fiscal instrument would have to take an infeasible value
    InfeasiblePolicy { instrument: Instrument, value: f64 },
    /// Excess demand has the same sign at both ends of every bracket tried
    NoBracket {
        low: f64,
        high: f64,
        residual_low: f64,
        residual_high: f64,
        expansions: usize,
    },
    /// Iteration budget exhausted; carries the best rate seen and its residual
    Convergence {
        best_rate: f64,
        residual: f64,
        iterations: usize,
    },
    /// Caller-supplied utility returned an undefined value inside the feasible set
    InvalidUtilityEvaluation {
        c_young: f64,
        c_old: f64,
        value: f64,
    },
    InvalidParameter(ParameterError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidRate { rate } => {
                write!(f, "gross interest rate must be positive and finite, got {rate}")
            }
            SolveError::DegenerateProblem { reason } => {
                write!(f, "agent problem has no finite optimum: {reason}")
            }
            SolveError::NoCapitalDemand { rate } => {
                write!(f, "firm has no positive finite capital demand at R={rate}")
            }
            SolveError::InfeasiblePolicy { instrument, value } => {
                write!(
                    f,
                    "balancing the budget requires {instrument} = {value}, which is infeasible"
                )
            }
            SolveError::NoBracket {
                low,
                high,
                residual_low,
                residual_high,
                expansions,
            } => write!(
                f,
                "no sign change in excess demand on [{low}, {high}] \
                 (residuals {residual_low:e}, {residual_high:e}) after {expansions} expansions"
            ),
            SolveError::Convergence {
                best_rate,
                residual,
                iterations,
            } => write!(
                f,
                "root search did not converge in {iterations} iterations \
                 (best R={best_rate}, residual {residual:e})"
            ),
            SolveError::InvalidUtilityEvaluation {
                c_young,
                c_old,
                value,
            } => write!(
                f,
                "utility evaluated to {value} at c_young={c_young}, c_old={c_old}"
            ),
            SolveError::InvalidParameter(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::InvalidParameter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for SolveError {
    fn from(err: ParameterError) -> Self {
        SolveError::InvalidParameter(err)
    }
}

pub type Result<T> = std::result::Result<T, SolveError>;

/// Errors related to comparative statics sweeps
#[derive(Debug, Clone)]
pub enum SweepError {
    /// Sweep configuration is unusable
    Config(String),
    /// Sweep was cancelled through its progress handle
    Cancelled,
    Parameter(ParameterError),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "sweep configuration error: {msg}"),
            SweepError::Cancelled => write!(f, "sweep cancelled"),
            SweepError::Parameter(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Parameter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for SweepError {
    fn from(err: ParameterError) -> Self {
        SweepError::Parameter(err)
    }
}
