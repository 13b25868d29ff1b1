mod cone;
mod sphere;

pub use cone::Cone;
pub use sphere::Sphere;

use std::f64::consts::TAU;

use crate::math::{fit_periodic, Point3};

/// Parameter domain for a surface.
///
/// The U range is periodic for every surface in this crate; V is bounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Shifts `u` by whole periods into the U range widened by `tol`.
    #[must_use]
    pub fn fit_u(&self, u: f64, tol: f64) -> Option<f64> {
        fit_periodic(u, self.u_min, self.u_max, tol)
    }

    /// Returns `true` if `v` lies in the V range widened by `tol`.
    #[must_use]
    pub fn contains_v(&self, v: f64, tol: f64) -> bool {
        v >= self.v_min - tol && v <= self.v_max + tol
    }

    /// Returns `true` when the U range spans a whole turn, so that the domain
    /// has no border across U.
    #[must_use]
    pub fn wraps_u(&self, tol: f64) -> bool {
        self.u_max - self.u_min >= TAU - tol
    }

    /// Maps `(u, v)` into the domain, or `None` when it lies outside.
    #[must_use]
    pub fn fit(&self, u: f64, v: f64, tol: f64) -> Option<(f64, f64)> {
        if !self.contains_v(v, tol) {
            return None;
        }
        self.fit_u(u, tol).map(|u| (u, v))
    }
}

/// Trait for parametric surfaces in 3D space.
pub trait Surface {
    /// Evaluates the surface at parameters `(u, v)`.
    fn value(&self, u: f64, v: f64) -> Point3;

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Parameters of the surface point closest to `point` along the
    /// parameterization's natural projection. `u` is in `[0, 2*pi)`.
    fn parameters(&self, point: &Point3) -> (f64, f64);
}
