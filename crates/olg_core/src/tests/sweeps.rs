//! Tests for comparative statics sweeps
//!
//! These tests verify that:
//! - Share sweeps reproduce the analytical exchange equilibrium
//! - More patient households lower the equilibrium rate
//! - Multi-dimensional grids are stored in row-major order
//! - Failed points are recorded and cancellation stops the sweep

use crate::analysis::{
    PointOutcome, SweepConfig, SweepParameter, SweepProgress, SweepTarget, sweep_equilibrium,
};
use crate::config::preset;
use crate::error::{SolveError, SweepError};

fn one_dimension(target: SweepTarget, min: f64, max: f64, steps: usize) -> SweepConfig {
    SweepConfig {
        parameters: vec![SweepParameter::new(target, min, max, steps)],
    }
}

/// Log-utility exchange equilibrium with saver share `phi`
fn exchange_rate(phi: f64) -> f64 {
    let beta = 0.96;
    (3.0 * phi + 10.0 * (1.0 - phi)) / (beta * 10.0 * phi + beta * 3.0 * (1.0 - phi))
}

#[test]
fn test_share_sweep_matches_analytical_rates() {
    let base = preset("basic").unwrap();
    let sweep = one_dimension(SweepTarget::Share { agent: 0 }, 0.25, 0.75, 3);
    let results = sweep_equilibrium(&base, &sweep, None).unwrap();

    assert_eq!(results.shape(), &[3]);
    assert_eq!(results.solved_count(), 3);
    for (i, phi) in [0.25, 0.5, 0.75].into_iter().enumerate() {
        let rate = results.get(&[i]).and_then(PointOutcome::rate).unwrap();
        assert!(
            (rate - exchange_rate(phi)).abs() < 1e-6,
            "phi={phi}: R*={rate}, expected {}",
            exchange_rate(phi)
        );
    }
}

#[test]
fn test_patience_lowers_interest_rate() {
    let base = preset("patience").unwrap();
    let sweep = one_dimension(SweepTarget::Beta, 0.9, 0.99, 4);
    let results = sweep_equilibrium(&base, &sweep, None).unwrap();

    let rates: Vec<f64> = results
        .rate_grid()
        .data()
        .iter()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rates.len(), 4);
    for pair in rates.windows(2) {
        assert!(pair[1] < pair[0], "rates not decreasing: {rates:?}");
    }
}

#[test]
fn test_two_dimensional_grid_layout() {
    let base = preset("full_system").unwrap();
    let sweep = SweepConfig {
        parameters: vec![
            SweepParameter::new(SweepTarget::GrowthRate, 0.0, 0.04, 2),
            SweepParameter::new(SweepTarget::TaxRateYoung, 0.0, 0.2, 3),
        ],
    };
    let progress = SweepProgress::new(0);
    let results = sweep_equilibrium(&base, &sweep, Some(&progress)).unwrap();

    assert_eq!(results.shape(), &[2, 3]);
    assert_eq!(results.ndim(), 2);
    assert_eq!(progress.total(), 6);
    assert_eq!(progress.completed(), 6);
    assert_eq!(results.coordinates(&[1, 2]), Some(vec![0.04, 0.2]));
    assert_eq!(results.param_labels, vec!["g", "tax_rate_young"]);

    // Each point matches a direct solve of the same scenario
    let mut direct = base.clone();
    direct.growth_rate = 0.04;
    direct.government = Some(crate::government::FiscalRule::Transfer {
        tax_rate_young: 0.1,
        spending_per_old: 0.0,
    });
    let expected = direct.solve().unwrap().equilibrium.rate;
    assert_eq!(results.get(&[1, 1]).and_then(PointOutcome::rate), Some(expected));
}

#[test]
fn test_failed_points_are_recorded() {
    let base = preset("basic").unwrap();
    let sweep = one_dimension(SweepTarget::Beta, -0.5, 0.96, 2);
    let results = sweep_equilibrium(&base, &sweep, None).unwrap();

    assert!(matches!(
        results.get(&[0]),
        Some(PointOutcome::Failed(SolveError::InvalidParameter(_)))
    ));
    assert!(results.get(&[1]).and_then(PointOutcome::point).is_some());
    assert_eq!(results.solved_count(), 1);
}

#[test]
fn test_cancelled_sweep_returns_error() {
    let base = preset("basic").unwrap();
    let sweep = one_dimension(SweepTarget::GrowthRate, 0.0, 0.05, 5);
    let progress = SweepProgress::new(0);
    progress.cancel();
    assert!(matches!(
        sweep_equilibrium(&base, &sweep, Some(&progress)),
        Err(SweepError::Cancelled)
    ));
    assert_eq!(progress.completed(), 0);
}

#[test]
fn test_configuration_errors_stop_the_sweep() {
    let base = preset("full_system").unwrap();

    // The transfer is the residual instrument of the PAYG rule
    let residual = one_dimension(SweepTarget::TransferPayment, 0.0, 1.0, 3);
    assert!(matches!(
        sweep_equilibrium(&base, &residual, None),
        Err(SweepError::Config(_))
    ));

    let missing = one_dimension(SweepTarget::Share { agent: 5 }, 0.1, 0.9, 3);
    assert!(matches!(
        sweep_equilibrium(&base, &missing, None),
        Err(SweepError::Config(_))
    ));

    let mut exchange = base.clone();
    exchange.firm = None;
    let no_firm = one_dimension(SweepTarget::Tfp, 0.5, 1.5, 3);
    assert!(matches!(
        sweep_equilibrium(&exchange, &no_firm, None),
        Err(SweepError::Config(_))
    ));
}

#[test]
fn test_share_sweep_rescales_other_agents() {
    let base = preset("basic").unwrap();
    let parameter = SweepParameter::new(SweepTarget::Share { agent: 0 }, 0.1, 0.9, 2);
    let config = parameter.apply(&base, 0.8).unwrap();
    let total: f64 = config.agents.iter().map(|a| a.share).sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert_eq!(config.agents[0].share, 0.8);
}
