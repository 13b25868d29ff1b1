//! Real roots of polynomials up to degree four.
//!
//! Coefficients are always given from the highest degree down to the
//! constant term. Leading coefficients that are negligible compared to the
//! largest coefficient lower the degree of the equation. Quadratics use the
//! closed form; higher degrees bracket every root between the real roots of
//! the derivative, which keeps small leading coefficients harmless.

use tracing::trace;

use super::{RootSet, SolverStatus};

/// Newton steps used to polish each root.
const POLISH_ITERATIONS: usize = 4;

/// Upper bound on bisection steps per bracket.
const BISECTION_ITERATIONS: usize = 200;

/// Relative distance below which two roots are reported once.
const MERGE_TOLERANCE: f64 = 1e-10;

/// Relative size of a discriminant that is treated as zero.
const DISCRIMINANT_NOISE: f64 = 1e-14;

/// A critical point is a root when the polynomial there is below this
/// fraction of the magnitude of its terms.
const TOUCH_TOLERANCE: f64 = 1e-13;

/// A root is reported only when its residual is below this fraction of the
/// magnitude of the polynomial's terms.
const RESIDUAL_TOLERANCE: f64 = 1e-9;

/// Result of a polynomial root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyResult {
    /// Solver outcome.
    pub status: SolverStatus,
    /// Real roots in ascending order. Empty unless `status` is `Ok`.
    pub roots: RootSet,
}

impl PolyResult {
    fn with_status(status: SolverStatus) -> Self {
        Self {
            status,
            roots: RootSet::new(),
        }
    }

    /// Returns `true` when the roots were computed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == SolverStatus::Ok
    }

    /// Returns `true` when every value is a root.
    #[must_use]
    pub fn infinite_roots(&self) -> bool {
        self.status == SolverStatus::InfiniteSolutions
    }

    /// Number of real roots found.
    #[must_use]
    pub fn nb_roots(&self) -> usize {
        self.roots.len()
    }

    /// Real roots in ascending order.
    #[must_use]
    pub fn roots(&self) -> &[f64] {
        self.roots.as_slice()
    }
}

/// Solves `a*x + b = 0`.
#[must_use]
pub fn linear(a: f64, b: f64) -> PolyResult {
    solve(&[a, b])
}

/// Solves `a*x^2 + b*x + c = 0`.
#[must_use]
pub fn quadratic(a: f64, b: f64, c: f64) -> PolyResult {
    solve(&[a, b, c])
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0`.
#[must_use]
pub fn cubic(a: f64, b: f64, c: f64, d: f64) -> PolyResult {
    solve(&[a, b, c, d])
}

/// Solves `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0`.
#[must_use]
pub fn quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> PolyResult {
    solve(&[a, b, c, d, e])
}

fn solve(coeffs: &[f64]) -> PolyResult {
    if coeffs.iter().any(|c| !c.is_finite()) {
        trace!(?coeffs, "non-finite polynomial coefficient");
        return PolyResult::with_status(SolverStatus::NumericalError);
    }

    let scale = coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale == 0.0 {
        return PolyResult::with_status(SolverStatus::InfiniteSolutions);
    }

    let start = coeffs
        .iter()
        .position(|c| c.abs() > f64::EPSILON * scale)
        .unwrap_or(coeffs.len() - 1);
    let coeffs = &coeffs[start..];
    if start > 0 {
        trace!(degree = coeffs.len() - 1, "polynomial degree reduced");
    }

    let mut candidates = Vec::with_capacity(4);
    real_roots(coeffs, &mut candidates);

    let mut candidates: Vec<f64> = candidates
        .into_iter()
        .filter(|x| x.is_finite())
        .map(|x| polish(coeffs, x))
        .filter(|&x| {
            let residual = horner(coeffs, x).0.abs();
            let accepted = residual <= RESIDUAL_TOLERANCE * magnitude(coeffs, x);
            if !accepted {
                trace!(x, "polynomial root rejected by its residual");
            }
            accepted
        })
        .collect();
    candidates.sort_by(f64::total_cmp);

    let mut result = PolyResult::with_status(SolverStatus::Ok);
    let mut last: Option<f64> = None;
    for x in candidates {
        if last.is_some_and(|l| (x - l).abs() <= MERGE_TOLERANCE * x.abs().max(1.0)) {
            continue;
        }
        result.roots.insert_sorted(x, 0.0);
        last = Some(x);
    }
    result
}

/// Pushes the real roots of a polynomial whose leading coefficient is not
/// zero.
fn real_roots(coeffs: &[f64], out: &mut Vec<f64>) {
    match *coeffs {
        [a, b] => out.push(-b / a),
        [a, b, c] => quadratic_roots(a, b, c, out),
        [_, _, _, _, ..] => bracketed_roots(coeffs, out),
        // A non-zero constant has no root.
        _ => {}
    }
}

/// Evaluates the polynomial and its derivative at `x` (Horner scheme).
fn horner(coeffs: &[f64], x: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut deriv = 0.0;
    for &c in coeffs {
        deriv = deriv * x + value;
        value = value * x + c;
    }
    (value, deriv)
}

/// Sum of the absolute values of the terms at `x`, the scale of the
/// rounding error of [`horner`].
fn magnitude(coeffs: &[f64], x: f64) -> f64 {
    let ax = x.abs();
    coeffs.iter().fold(0.0, |acc, c| acc * ax + c.abs())
}

/// Refines a root with Newton steps while the residual keeps decreasing.
fn polish(coeffs: &[f64], x0: f64) -> f64 {
    let mut x = x0;
    let (mut f, mut df) = horner(coeffs, x);
    for _ in 0..POLISH_ITERATIONS {
        if f == 0.0 || df == 0.0 {
            break;
        }
        let next = x - f / df;
        let (f_next, df_next) = horner(coeffs, next);
        if f_next.is_nan() || f_next.abs() >= f.abs() {
            break;
        }
        x = next;
        f = f_next;
        df = df_next;
    }
    x
}

fn quadratic_roots(a: f64, b: f64, c: f64, out: &mut Vec<f64>) {
    let disc = b * b - 4.0 * a * c;
    let noise = DISCRIMINANT_NOISE * (b * b).max((4.0 * a * c).abs());
    if disc < -noise {
        return;
    }
    if disc <= noise {
        out.push(-b / (2.0 * a));
        return;
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    out.push(q / a);
    out.push(c / q);
}

/// Isolates the real roots between consecutive real roots of the
/// derivative, then bisects every interval with a sign change.
///
/// The critical points split the real line into intervals on which the
/// polynomial is monotone, so each interval holds at most one root. The
/// outer intervals end at twice the Cauchy bound. A critical point where the
/// polynomial vanishes up to round-off is a root of even multiplicity.
fn bracketed_roots(coeffs: &[f64], out: &mut Vec<f64>) {
    let degree = coeffs.len() - 1;
    #[allow(clippy::cast_precision_loss)]
    let derivative: Vec<f64> = coeffs[..degree]
        .iter()
        .enumerate()
        .map(|(i, c)| c * (degree - i) as f64)
        .collect();
    let mut critical = Vec::with_capacity(degree - 1);
    real_roots(&derivative, &mut critical);
    critical.retain(|x| x.is_finite());
    critical.sort_by(f64::total_cmp);
    critical.dedup();

    let lead = coeffs[0];
    let bound = 2.0
        * (1.0
            + coeffs[1..]
                .iter()
                .fold(0.0_f64, |m, c| m.max((c / lead).abs())));

    let mut points = Vec::with_capacity(critical.len() + 2);
    points.push(-bound);
    points.extend(critical.into_iter().filter(|x| x.abs() < bound));
    points.push(bound);

    let values: Vec<f64> = points
        .iter()
        .map(|&x| {
            let value = horner(coeffs, x).0;
            if value.abs() <= TOUCH_TOLERANCE * magnitude(coeffs, x) {
                0.0
            } else {
                value
            }
        })
        .collect();

    for (i, (&x, &value)) in points.iter().zip(&values).enumerate() {
        if value == 0.0 {
            out.push(x);
        }
        if let (Some(&next), Some(&next_value)) = (points.get(i + 1), values.get(i + 1)) {
            if value != 0.0 && next_value != 0.0 && (value < 0.0) != (next_value < 0.0) {
                out.push(bisect(coeffs, x, next, value < 0.0));
            }
        }
    }
}

/// Bisects `[lo, hi]` down to adjacent floats. `lo_negative` is the sign of
/// the polynomial at `lo`; the sign at `hi` is the opposite one.
fn bisect(coeffs: &[f64], mut lo: f64, mut hi: f64, lo_negative: bool) -> f64 {
    for _ in 0..BISECTION_ITERATIONS {
        #[allow(clippy::manual_midpoint)]
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let value = horner(coeffs, mid).0;
        if value == 0.0 {
            return mid;
        }
        if (value < 0.0) == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    #[allow(clippy::manual_midpoint)]
    let mid = 0.5 * (lo + hi);
    mid
}
