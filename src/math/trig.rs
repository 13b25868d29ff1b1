//! Roots of the second-degree trigonometric equation
//!
//! ```text
//! a*cos^2(x) + 2b*cos(x)*sin(x) + c*cos(x) + d*sin(x) + e = 0
//! ```
//!
//! Degenerate coefficient patterns are dispatched to closed forms
//! (`asin`/`acos` or a factored product). The general case goes through the
//! tangent half-angle substitution `t = tan(x/2)`, which turns the equation
//! into a quartic in `t`:
//!
//! ```text
//! (a-c+e)*t^4 + (2d-4b)*t^3 + (2e-2a)*t^2 + (4b+2d)*t + (a+c+e) = 0
//! ```
//!
//! The substitution cannot represent `x = pi` (`t` goes to infinity), so that
//! angle is tested separately whenever the leading coefficient vanishes.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use tracing::{debug, trace};

use super::poly::{self, PolyResult};
use super::{RootSet, SolverStatus, MAX_ROOTS};

/// Default tolerance for treating coefficients as zero and merging roots.
pub const DEFAULT_EPS: f64 = 1.5e-12;

/// Upper bound on Newton iterations per root.
pub const NEWTON_MAX_ITERATIONS: usize = 10;

/// A refined root is discarded when Newton moved it further than this
/// fraction of the search window.
pub const NEWTON_WINDOW_FRACTION: f64 = 0.01;

/// Newton stops once the step is below this relative size.
const NEWTON_STEP_TOLERANCE: f64 = 1e-15;

/// A candidate is reported only when `|F(x)|` is at most this multiple of
/// `eps` times the magnitude of the coefficients.
pub const ROOT_RESIDUAL_FACTOR: f64 = 100.0;

/// Coefficients of `a*cos^2(x) + 2b*cos(x)*sin(x) + c*cos(x) + d*sin(x) + e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrigEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

/// Result of [`trigonometric`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrigResult {
    /// Solver outcome.
    pub status: SolverStatus,
    /// Roots in ascending order, pairwise further apart than `eps`.
    pub roots: RootSet,
    /// Set when every angle satisfies the equation. `roots` is empty then.
    pub infinite_roots: bool,
}

impl TrigResult {
    fn with_status(status: SolverStatus) -> Self {
        Self {
            status,
            roots: RootSet::new(),
            infinite_roots: false,
        }
    }

    fn infinite() -> Self {
        Self {
            status: SolverStatus::InfiniteSolutions,
            roots: RootSet::new(),
            infinite_roots: true,
        }
    }

    /// Returns `true` when a finite set of roots was computed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == SolverStatus::Ok
    }

    /// Number of roots found.
    #[must_use]
    pub fn nb_roots(&self) -> usize {
        self.roots.len()
    }

    /// Roots in ascending order.
    #[must_use]
    pub fn roots(&self) -> &[f64] {
        self.roots.as_slice()
    }

    /// Returns the `i`-th root, if any.
    #[must_use]
    pub fn root(&self, i: usize) -> Option<f64> {
        self.roots.get(i)
    }
}

/// Search window on the angle axis, at most one period wide.
#[derive(Debug, Clone, Copy)]
struct Window {
    lower: f64,
    width: f64,
    /// Whole periods separating `[0, 2*pi)` from the window.
    shift: f64,
}

impl Window {
    fn new(inf_bound: f64, sup_bound: f64) -> Self {
        let (lower, width) = match (inf_bound.is_infinite(), sup_bound.is_infinite()) {
            (true, true) => (0.0, TAU),
            (false, true) => (inf_bound, TAU),
            (true, false) => (sup_bound - TAU, TAU),
            (false, false) => (inf_bound, (sup_bound - inf_bound).min(TAU)),
        };
        let shift = (lower / TAU).trunc() * TAU;
        Self {
            lower,
            width,
            shift,
        }
    }

    fn upper(&self) -> f64 {
        self.lower + self.width
    }

    /// Moves an angle from `(-eps, 2*pi)` to its representative in the
    /// window, or returns `None` when the window does not contain it.
    fn fold(&self, angle: f64, eps: f64) -> Option<f64> {
        let mut x = angle + self.shift;
        if x < self.lower - eps {
            x += TAU;
        } else if x - TAU >= self.lower - eps {
            x -= TAU;
        }
        let offset = x - self.lower;
        let pad = eps.max(f64::EPSILON * self.width);
        (offset >= -pad && offset <= self.width + pad).then_some(x)
    }

    fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lower, self.upper())
    }
}

impl TrigEquation {
    /// Creates the equation from its five coefficients.
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64) -> Self {
        Self { a, b, c, d, e }
    }

    /// Evaluates the left-hand side at `x`.
    #[must_use]
    pub fn value(&self, x: f64) -> f64 {
        let (s, c) = x.sin_cos();
        self.a * c * c + 2.0 * self.b * c * s + self.c * c + self.d * s + self.e
    }

    /// Evaluates the derivative of the left-hand side at `x`.
    #[must_use]
    pub fn derivative(&self, x: f64) -> f64 {
        self.value_and_derivative(x).1
    }

    /// Upper bound of `|F|` over all angles.
    fn magnitude(&self) -> f64 {
        self.a.abs() + 2.0 * self.b.abs() + self.c.abs() + self.d.abs() + self.e.abs()
    }

    fn value_and_derivative(&self, x: f64) -> (f64, f64) {
        let (s, c) = x.sin_cos();
        let value = self.a * c * c + 2.0 * self.b * c * s + self.c * c + self.d * s + self.e;
        let deriv = -2.0 * self.a * c * s + 2.0 * self.b * (c * c - s * s) - self.c * s
            + self.d * c;
        (value, deriv)
    }

    /// Finds the roots in `[inf_bound, sup_bound]`.
    ///
    /// Infinite bounds select a full period anchored at the finite bound (or
    /// `[0, 2*pi]` when both are infinite). Windows wider than one period are
    /// cut to one period. Coefficients with an absolute value at most `eps`
    /// are treated as zero and roots closer than `eps` are merged.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn solve(&self, inf_bound: f64, sup_bound: f64, eps: f64) -> TrigResult {
        let Self { a, b, c, d, e } = *self;
        if [a, b, c, d, e].iter().any(|k| !k.is_finite()) {
            debug!(equation = ?self, "non-finite trigonometric coefficient");
            return TrigResult::with_status(SolverStatus::NumericalError);
        }

        let window = Window::new(inf_bound, sup_bound);
        let is_zero = |k: f64| k.abs() <= eps;

        if is_zero(a) && is_zero(b) {
            if is_zero(c) && is_zero(d) {
                if is_zero(e) {
                    trace!("identically zero equation");
                    return TrigResult::infinite();
                }
                return TrigResult::with_status(SolverStatus::Ok);
            }
            if is_zero(c) {
                // d*sin(x) + e = 0
                let v = -e / d;
                if v.abs() > 1.0 {
                    return TrigResult::with_status(SolverStatus::Ok);
                }
                let x = v.asin();
                return self.collect([x, PI - x], window, eps, false);
            }
            if is_zero(d) {
                // c*cos(x) + e = 0
                let v = -e / c;
                if v.abs() > 1.0 {
                    return TrigResult::with_status(SolverStatus::Ok);
                }
                let x = v.acos();
                return self.collect([x, -x], window, eps, false);
            }
            let quadratic = poly::quadratic(e - c, 2.0 * d, e + c);
            return self.collect_polynomial(&quadratic, window, eps);
        }

        if is_zero(a) && is_zero(e) && (is_zero(c) || is_zero(d)) {
            let mut angles = Vec::with_capacity(MAX_ROOTS);
            if is_zero(c) {
                // sin(x) * (2b*cos(x) + d) = 0
                angles.extend([0.0, PI]);
                if let Some(v) = unit_ratio(-d, 2.0 * b, eps) {
                    let x = v.acos();
                    angles.extend([x, -x]);
                }
            } else {
                // cos(x) * (2b*sin(x) + c) = 0
                angles.extend([FRAC_PI_2, 3.0 * FRAC_PI_2]);
                if let Some(v) = unit_ratio(-c, 2.0 * b, eps) {
                    let x = v.asin();
                    angles.extend([x, PI - x]);
                }
            }
            let mut result = self.collect(angles, window, eps, true);
            self.check_pi(&mut result, window, eps);
            return result;
        }

        let quartic = poly::quartic(
            a - c + e,
            2.0 * d - 4.0 * b,
            2.0 * (e - a),
            4.0 * b + 2.0 * d,
            a + c + e,
        );
        self.collect_polynomial(&quartic, window, eps)
    }

    /// Converts the roots in `t = tan(x/2)` to angles.
    fn collect_polynomial(&self, poly: &PolyResult, window: Window, eps: f64) -> TrigResult {
        match poly.status {
            SolverStatus::Ok => {}
            SolverStatus::InfiniteSolutions => return TrigResult::infinite(),
            status => {
                debug!(?status, equation = ?self, "polynomial solver failed");
                return TrigResult::with_status(status);
            }
        }
        let angles = poly.roots().iter().map(|&t| 2.0 * t.atan());
        let mut result = self.collect(angles, window, eps, true);
        self.check_pi(&mut result, window, eps);
        result
    }

    /// Folds candidate angles into the window, optionally refines them and
    /// inserts the ones that satisfy the equation in ascending order.
    fn collect(
        &self,
        angles: impl IntoIterator<Item = f64>,
        window: Window,
        eps: f64,
        refine: bool,
    ) -> TrigResult {
        let mut result = TrigResult::with_status(SolverStatus::Ok);
        let max_shift = NEWTON_WINDOW_FRACTION * window.width;
        let max_residual = ROOT_RESIDUAL_FACTOR * eps.max(f64::EPSILON) * self.magnitude();
        for angle in angles {
            let angle = if angle <= -eps { angle + TAU } else { angle };
            let Some(x) = window.fold(angle, eps) else {
                trace!(angle, lower = window.lower, width = window.width, "root outside window");
                continue;
            };
            let x = if refine {
                self.refine(x, max_shift)
            } else {
                x
            };
            let residual = self.value(x).abs();
            if residual > max_residual {
                debug!(x, residual, "candidate rejected by its residual");
                continue;
            }
            result.roots.insert_sorted(window.clamp(x), eps);
        }
        result
    }

    /// Adds `x = pi`, which the half-angle substitution cannot produce.
    ///
    /// A root the polynomial already placed within `sqrt(eps)` of `pi` is the
    /// same zero seen through a huge `t`, so `pi` is not added next to it.
    fn check_pi(&self, result: &mut TrigResult, window: Window, eps: f64) {
        if result.roots.len() >= MAX_ROOTS || (self.a - self.c + self.e).abs() > eps {
            return;
        }
        let Some(x) = window.fold(PI, eps).map(|x| window.clamp(x)) else {
            return;
        };
        if result.roots.iter().any(|r| (r - x).abs() <= eps.sqrt()) {
            return;
        }
        if result.roots.insert_sorted(x, eps) {
            trace!(x, "root at the singular point of the substitution");
        }
    }

    fn refine(&self, x0: f64, max_shift: f64) -> f64 {
        match self.newton(x0) {
            Some(x) if (x - x0).abs() <= max_shift => x,
            Some(x) => {
                debug!(x0, x, "Newton refinement left the neighbourhood, keeping the estimate");
                x0
            }
            None => x0,
        }
    }

    fn newton(&self, x0: f64) -> Option<f64> {
        let mut x = x0;
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let (f, df) = self.value_and_derivative(x);
            if f == 0.0 {
                return Some(x);
            }
            if df == 0.0 {
                return None;
            }
            let step = f / df;
            x -= step;
            if !x.is_finite() {
                return None;
            }
            if step.abs() <= NEWTON_STEP_TOLERANCE * x.abs().max(1.0) {
                return Some(x);
            }
        }
        None
    }
}

/// Returns `num / den` when it lies in `[-1, 1]`; values exceeding the
/// interval by round-off only are clamped.
fn unit_ratio(num: f64, den: f64, eps: f64) -> Option<f64> {
    let v = num / den;
    if v.abs() > 1.0 + eps {
        return None;
    }
    Some(v.clamp(-1.0, 1.0))
}

/// Solves `a*cos^2(x) + 2b*cos(x)*sin(x) + c*cos(x) + d*sin(x) + e = 0` on
/// `[inf_bound, sup_bound]`.
///
/// Pass `0.0`, `TAU` and [`DEFAULT_EPS`] for the usual full-period search.
#[must_use]
#[allow(clippy::too_many_arguments, clippy::many_single_char_names)]
pub fn trigonometric(
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    inf_bound: f64,
    sup_bound: f64,
    eps: f64,
) -> TrigResult {
    TrigEquation::new(a, b, c, d, e).solve(inf_bound, sup_bound, eps)
}

/// Solves `d*sin(x) + e = 0`.
#[must_use]
pub fn trigonometric_linear(
    d: f64,
    e: f64,
    inf_bound: f64,
    sup_bound: f64,
    eps: f64,
) -> TrigResult {
    trigonometric(0.0, 0.0, 0.0, d, e, inf_bound, sup_bound, eps)
}

/// Solves `c*cos(x) + d*sin(x) + e = 0`.
#[must_use]
pub fn trigonometric_cde(
    c: f64,
    d: f64,
    e: f64,
    inf_bound: f64,
    sup_bound: f64,
    eps: f64,
) -> TrigResult {
    trigonometric(0.0, 0.0, c, d, e, inf_bound, sup_bound, eps)
}
