//! Plain-text reports for solved scenarios and sweeps

use olg_core::analysis::{PointOutcome, SweepResults};
use olg_core::config::ScenarioOutcome;

/// Equilibrium summary followed by one row per agent type
pub fn format_outcome(outcome: &ScenarioOutcome) -> String {
    let eq = &outcome.equilibrium;
    let alloc = &outcome.allocation;

    let title = if outcome.name.is_empty() {
        "scenario"
    } else {
        outcome.name.as_str()
    };
    let mut lines = vec![
        format!("== {title} =="),
        format!(
            "R*            {:.6}  (r* = {:.2}%)",
            eq.rate,
            (eq.rate - 1.0) * 100.0
        ),
        format!("excess demand {:.3e}", eq.residual),
        format!(
            "iterations    {}  (bracket expansions {}, {:?})",
            eq.iterations, eq.expansions, eq.termination
        ),
        format!("savings       {:.6}", alloc.aggregate_savings),
        format!("welfare       {:.6}", alloc.welfare),
    ];

    if let Some(p) = &alloc.production {
        lines.push(format!(
            "capital       {:.6}  output {:.6}  wage {:.6}",
            p.capital, p.output, p.wage
        ));
    }
    let policy = &alloc.policy;
    if policy.revenue > 0.0 || policy.outlays > 0.0 {
        lines.push(format!(
            "policy        tax {:.4}  transfer {:.4}  spending {:.4}  (budget residual {:.1e})",
            policy.tax_rate_young,
            policy.transfer_payment,
            policy.spending_per_old,
            policy.budget_residual()
        ));
    }
    if alloc.dynamically_inefficient {
        lines.push("note          R* < 1 + g: dynamically inefficient".to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<12} {:>7} {:>12} {:>12} {:>12} {:>12}",
        "agent", "share", "c_young", "c_old", "savings", "utility"
    ));
    for agent in &alloc.agents {
        let d = &agent.decision;
        lines.push(format!(
            "{:<12} {:>7.3} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
            agent.name, agent.share, d.c_young, d.c_old, d.savings, d.utility
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One row per grid point in row-major order
pub fn format_sweep(results: &SweepResults) -> String {
    let mut out = String::new();

    for label in &results.param_labels {
        out.push_str(&format!("{label:>16} "));
    }
    out.push_str(&format!("{:>12} {:>12} {:>12}\n", "R*", "savings", "welfare"));

    for (indices, outcome) in results.outcomes.iter() {
        for value in results.coordinates(&indices).unwrap_or_default() {
            out.push_str(&format!("{value:>16.6} "));
        }
        let row = match outcome {
            PointOutcome::Solved(point) => format!(
                "{:>12.6} {:>12.6} {:>12.6}",
                point.rate, point.aggregate_savings, point.welfare
            ),
            PointOutcome::Failed(err) => format!("failed: {err}"),
        };
        out.push_str(&row);
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{} of {} points solved\n",
        results.solved_count(),
        results.outcomes.len()
    ));
    out
}
