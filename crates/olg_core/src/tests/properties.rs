//! Seeded randomized checks against analytical solutions
//!
//! These tests verify that, across randomly drawn parameters:
//! - Log-utility savings match the closed form when interior
//! - CRRA optima satisfy the Euler equation
//! - Symmetric exchange economies clear at R* = 1/beta
//! - Excess demand is a pure function of the rate

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::{Agent, BorrowingPolicy};
use crate::economy::{Economy, Market};
use crate::firm::Firm;
use crate::government::{FiscalRule, Government};
use crate::solver::Solver;
use crate::utility::{CrraUtility, LogUtility};

const CASES: usize = 40;

#[test]
fn test_log_savings_closed_form() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..CASES {
        let beta = rng.random_range(0.5..0.999);
        let e_y = rng.random_range(0.5..20.0);
        let e_o = rng.random_range(0.0..10.0);
        let rate = rng.random_range(0.8..1.6);

        let agent = Agent::new("a", Arc::new(LogUtility { beta }), e_y, e_o)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        let decision = agent.solve(rate, 0.0, 0.0).unwrap();
        let expected = (beta * e_y - e_o / rate) / (1.0 + beta);
        assert!(
            (decision.savings - expected).abs() < 1e-7 * (1.0 + e_y),
            "beta={beta} e_y={e_y} e_o={e_o} R={rate}: s={} expected {expected}",
            decision.savings
        );
    }
}

#[test]
fn test_no_borrowing_clamps_negative_savings() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let beta = rng.random_range(0.5..0.999);
        let e_y = rng.random_range(0.5..20.0);
        let e_o = rng.random_range(0.0..10.0);
        let rate = rng.random_range(0.8..1.6);

        let agent = Agent::new("a", Arc::new(LogUtility { beta }), e_y, e_o).unwrap();
        let decision = agent.solve(rate, 0.0, 0.0).unwrap();
        let expected = ((beta * e_y - e_o / rate) / (1.0 + beta)).max(0.0);
        assert!((decision.savings - expected).abs() < 1e-7 * (1.0 + e_y));
        assert!(decision.c_young > 0.0 && decision.c_old > 0.0);
    }
}

#[test]
fn test_crra_euler_equation() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..CASES {
        let beta = rng.random_range(0.8..0.99);
        let sigma = rng.random_range(0.3..5.0);
        let rate = rng.random_range(0.9..1.5);
        let e_y = rng.random_range(1.0..10.0);
        let e_o = rng.random_range(0.5..10.0);

        let agent = Agent::new("a", Arc::new(CrraUtility { beta, sigma }), e_y, e_o)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        let d = agent.solve(rate, 0.0, 0.0).unwrap();
        let ratio = d.c_old / d.c_young;
        let expected = (beta * rate).powf(1.0 / sigma);
        assert!(
            (ratio / expected - 1.0).abs() < 1e-6,
            "sigma={sigma} beta={beta} R={rate}: ratio {ratio}, expected {expected}"
        );
    }
}

#[test]
fn test_symmetric_exchange_inverse_beta() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..10 {
        let beta = rng.random_range(0.85..0.99);
        let rich = rng.random_range(5.0..15.0);
        let poor = rng.random_range(0.5..5.0);
        let g = rng.random_range(0.0..0.05);

        let u = Arc::new(LogUtility { beta });
        let a = Agent::new("a", u.clone(), rich, poor)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        let b = Agent::new("b", u, poor, rich)
            .unwrap()
            .with_borrowing(BorrowingPolicy::NaturalLimit);
        let economy = Economy::new(vec![(a, 0.5), (b, 0.5)], g, Market::Exchange, None).unwrap();

        let rate = Solver::new(&economy).find_equilibrium_r().unwrap();
        assert!((rate - 1.0 / beta).abs() < 1e-6, "beta={beta}: R*={rate}");
    }
}

#[test]
fn test_excess_demand_is_pure() {
    let u = Arc::new(LogUtility { beta: 0.96 });
    let a = Agent::new("a", u.clone(), 10.0, 3.0)
        .unwrap()
        .with_borrowing(BorrowingPolicy::NaturalLimit);
    let b = Agent::new("b", u, 3.0, 10.0)
        .unwrap()
        .with_borrowing(BorrowingPolicy::NaturalLimit);
    let government = Government::new(FiscalRule::Spending {
        tax_rate_young: 0.1,
        transfer_payment: 0.2,
    })
    .unwrap();
    let economy = Economy::new(
        vec![(a, 0.4), (b, 0.6)],
        0.01,
        Market::Production(Firm::new(1.0, 0.33, 0.05).unwrap()),
        Some(government),
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let rates: Vec<f64> = (0..CASES).map(|_| rng.random_range(0.96..2.0)).collect();
    let first: Vec<u64> = rates
        .iter()
        .map(|&r| economy.excess_demand(r).unwrap().to_bits())
        .collect();
    let second: Vec<u64> = rates
        .iter()
        .rev()
        .map(|&r| economy.excess_demand(r).unwrap().to_bits())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    assert_eq!(first, second);
}
