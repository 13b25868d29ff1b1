mod cone;
mod sphere;

pub use cone::PointCone;
pub use sphere::PointSphere;

use std::f64::consts::TAU;

use crate::geometry::surface::SurfaceDomain;
use crate::math::trig::{trigonometric_cde, DEFAULT_EPS};
use crate::math::Point3;

use super::Extremum;

/// Stationary point of the distance between a point and a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSurfaceExtremum {
    /// U parameter on the surface.
    pub u: f64,
    /// V parameter on the surface.
    pub v: f64,
    /// Surface point at `(u, v)`.
    pub point: Point3,
    /// Square distance from the query point to `point`.
    pub square_distance: f64,
    /// Whether the distance is locally minimal here.
    pub is_minimum: bool,
}

impl Extremum for PointSurfaceExtremum {
    fn square_distance(&self) -> f64 {
        self.square_distance
    }

    fn is_minimum(&self) -> bool {
        self.is_minimum
    }

    fn set_minimum(&mut self, is_minimum: bool) {
        self.is_minimum = is_minimum;
    }
}

/// Longitudes in the U range of `domain` where `x*cos(u) + y*sin(u)` is
/// stationary. Empty when `x` and `y` both vanish.
pub(crate) fn stationary_longitudes(
    x: f64,
    y: f64,
    domain: &SurfaceDomain,
    tol: f64,
) -> Vec<f64> {
    let (lower, upper) = if domain.wraps_u(tol) {
        (0.0, TAU)
    } else {
        (domain.u_min, domain.u_max)
    };
    trigonometric_cde(y, -x, 0.0, lower, upper, DEFAULT_EPS)
        .roots()
        .iter()
        .filter_map(|&u| domain.fit_u(u, tol))
        .collect()
}
