pub mod poly;
pub mod trig;

use std::f64::consts::TAU;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Maximum number of real roots any solver in this module reports.
pub const MAX_ROOTS: usize = 4;

/// Outcome of a root solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Roots were computed; the set may still be empty.
    Ok,
    /// An iterative stage ran out of iterations.
    NotConverged,
    /// Every value satisfies the equation.
    InfiniteSolutions,
    /// Input or intermediate values were not finite.
    NumericalError,
}

/// Ascending sequence of at most [`MAX_ROOTS`] distinct reals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootSet {
    values: [f64; MAX_ROOTS],
    len: usize,
}

impl RootSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no root is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` when the set holds [`MAX_ROOTS`] values.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == MAX_ROOTS
    }

    /// The stored roots in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    /// Iterates over the stored roots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.as_slice().iter().copied()
    }

    /// Returns the `i`-th root, if any.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.as_slice().get(i).copied()
    }

    /// Inserts `value` keeping the ascending order.
    ///
    /// Returns `false` without modifying the set when a stored root lies
    /// within `eps` of `value` or when the set is full.
    pub fn insert_sorted(&mut self, value: f64, eps: f64) -> bool {
        if self.iter().any(|r| (r - value).abs() <= eps) || self.is_full() {
            return false;
        }
        let pos = self
            .as_slice()
            .iter()
            .position(|&r| value < r)
            .unwrap_or(self.len);
        self.values.copy_within(pos..self.len, pos + 1);
        self.values[pos] = value;
        self.len += 1;
        true
    }
}

/// Maps an angle onto `[0, 2*pi)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Shifts a periodic parameter by whole periods so that it falls inside
/// `[min - tol, max + tol]`.
///
/// Returns the smallest such representative, or `None` when no representative
/// of `value` lies in the range. An infinite `min` anchors the search one
/// period below `max`; with both bounds infinite `value` is returned as is.
#[must_use]
pub fn fit_periodic(value: f64, min: f64, max: f64, tol: f64) -> Option<f64> {
    if !min.is_finite() {
        return if max.is_finite() {
            fit_periodic(value, max - TAU, max, tol)
        } else {
            Some(value)
        };
    }
    let periods = ((min - tol - value) / TAU).ceil();
    let shifted = value + periods * TAU;
    (shifted <= max + tol).then_some(shifted)
}
