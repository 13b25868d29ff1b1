mod ellipse;

pub use ellipse::Ellipse;

use std::f64::consts::TAU;

use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// One full turn, `[0, 2*pi]`.
    #[must_use]
    pub fn full_period() -> Self {
        Self::new(0.0, TAU)
    }

    /// Length of the parameter range.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.t_max - self.t_min
    }
}

impl Default for CurveDomain {
    fn default() -> Self {
        Self::full_period()
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn value(&self, t: f64) -> Point3;

    /// First derivative with respect to `t`.
    fn derivative(&self, t: f64) -> Vector3;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the parameterization repeats with period `2*pi`.
    fn is_periodic(&self) -> bool;
}
