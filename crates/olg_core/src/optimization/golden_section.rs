//! Derivative-free maximization over a bounded interval
//!
//! A uniform scan of interior points picks the best cell, so multi-modal
//! objectives land on the global peak of the scan, then golden-section search
//! refines within the two neighbouring cells. Comparing function values cannot
//! locate a smooth peak closer than about `sqrt(eps)` of the interval, so a
//! final bisection on the sign of a central difference polishes the point.
//! The interval endpoints are never evaluated here: callers decide how to
//! treat corners, which is where objectives like log utility stop being defined.

/// 1/phi
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Distances of the sharpness probes, in multiples of the final bracket width
const PROBE_DECADES: [f64; 4] = [1e4, 1e3, 1e2, 1e1];

/// Per-decade gains that shrink by less than this factor never level off
const LEVELLING_RATIO: f64 = 0.9;

/// Relative drop across the probes above which a peak counts as singular
const SINGULAR_DROP: f64 = 1e-3;

/// Central difference step relative to the interval, about `eps^(1/3)`
const SLOPE_STEP: f64 = 6e-6;

/// Half-width of the polishing bracket in slope steps
const POLISH_CELLS: f64 = 64.0;

const POLISH_ITERATIONS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSearchOptions {
    /// Number of interior points in the initial scan
    pub scan_points: usize,

    /// Stop when the bracket is narrower than this fraction of the interval
    pub relative_tolerance: f64,

    pub max_iterations: usize,
}

impl Default for ScalarSearchOptions {
    fn default() -> Self {
        Self {
            scan_points: 64,
            relative_tolerance: 1e-12,
            max_iterations: 200,
        }
    }
}

/// Best interior point found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarMaximum {
    pub x: f64,
    pub value: f64,

    /// Golden-section iterations after the scan
    pub iterations: usize,

    /// The objective keeps rising sharply as the bracket closes in on `x`,
    /// without levelling off towards a finite peak
    pub singular: bool,
}

/// Maximize `f` over the open interval `(lo, hi)`.
///
/// `f` may reject a point by returning an error, which aborts the search.
/// Requires `lo < hi`.
pub fn maximize_scalar<F, E>(
    mut f: F,
    lo: f64,
    hi: f64,
    options: &ScalarSearchOptions,
) -> Result<ScalarMaximum, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    debug_assert!(lo < hi);
    let span = hi - lo;
    let points = options.scan_points.max(3);
    let step = span / (points + 1) as f64;

    let mut best_k = 1;
    let mut best_x = lo + step;
    let mut best_value = f64::NEG_INFINITY;
    for k in 1..=points {
        let x = lo + step * k as f64;
        let value = f(x)?;
        if value > best_value {
            best_k = k;
            best_x = x;
            best_value = value;
        }
    }

    // Neighbouring cells; the endpoints are only bracket bounds, never evaluated
    let mut a = lo + step * (best_k - 1) as f64;
    let mut b = if best_k == points {
        hi
    } else {
        lo + step * (best_k + 1) as f64
    };

    let tolerance = options.relative_tolerance * span;
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c)?;
    let mut fd = f(d)?;
    let mut iterations = 0;

    while b - a > tolerance && iterations < options.max_iterations {
        iterations += 1;
        if fc >= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d)?;
        }
    }

    let (mut x, mut value) = if fc >= fd { (c, fc) } else { (d, fd) };
    if best_value > value {
        x = best_x;
        value = best_value;
    }

    let width = (b - a).max(tolerance);
    let singular =
        value == f64::INFINITY || rises_without_bound(&mut f, x, value, width, lo, hi)?;

    if !singular && let Some((px, pv)) = polish(&mut f, x, lo, hi)? {
        // Rounding can leave the polished value a hair below the scanned one
        if pv >= value - 1e-10 * (1.0 + value.abs()) {
            x = px;
            value = pv;
        }
    }

    Ok(ScalarMaximum {
        x,
        value,
        iterations,
        singular,
    })
}

/// Best value found at distance `distance` on either side of `x`
fn neighbour<F, E>(f: &mut F, x: f64, distance: f64, lo: f64, hi: f64) -> Result<Option<f64>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut best: Option<f64> = None;
    for candidate in [x - distance, x + distance] {
        if candidate > lo && candidate < hi {
            let value = f(candidate)?;
            best = Some(best.map_or(value, |b| b.max(value)));
        }
    }
    Ok(best)
}

/// Compare the objective at distances shrinking by decades towards `x`.
///
/// A finite peak, even a cusp like `-|x|^p`, gains less and less per decade.
/// A divergence like `-ln|x|` or `|x|^-p` gains at least as much each time.
fn rises_without_bound<F, E>(
    f: &mut F,
    x: f64,
    value: f64,
    width: f64,
    lo: f64,
    hi: f64,
) -> Result<bool, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut levels = [0.0; PROBE_DECADES.len()];
    for (level, decades) in levels.iter_mut().zip(PROBE_DECADES) {
        match neighbour(f, x, width * decades, lo, hi)? {
            Some(v) if v.is_finite() => *level = v,
            _ => return Ok(false),
        }
    }

    let threshold = SINGULAR_DROP * (1.0 + value.abs());
    if value - levels[1] <= threshold {
        return Ok(false);
    }
    let gains: Vec<f64> = levels.windows(2).map(|pair| pair[1] - pair[0]).collect();
    Ok(gains
        .windows(2)
        .all(|pair| pair[0] > 0.0 && pair[1] >= LEVELLING_RATIO * pair[0]))
}

/// Bisect on the sign of `f(x + h) - f(x - h)` around `x0`. Returns `None`
/// when the polishing bracket leaves `(lo, hi)` or does not straddle a peak.
fn polish<F, E>(f: &mut F, x0: f64, lo: f64, hi: f64) -> Result<Option<(f64, f64)>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let h = SLOPE_STEP * (hi - lo);
    let reach = POLISH_CELLS * h;
    let (mut a, mut b) = (x0 - reach, x0 + reach);
    if a - h <= lo || b + h >= hi {
        return Ok(None);
    }

    let mut slope = |x: f64| -> Result<f64, E> { Ok(f(x + h)? - f(x - h)?) };
    if !(slope(a)? > 0.0 && slope(b)? < 0.0) {
        return Ok(None);
    }
    for _ in 0..POLISH_ITERATIONS {
        let mid = 0.5 * (a + b);
        if mid <= a || mid >= b {
            break;
        }
        if slope(mid)? > 0.0 {
            a = mid;
        } else {
            b = mid;
        }
    }
    let x = 0.5 * (a + b);
    Ok(Some((x, f(x)?)))
}
