mod ellipse_sphere;

pub use ellipse_sphere::EllipseSphere;

use crate::geometry::curve::CurveDomain;
use crate::geometry::surface::SurfaceDomain;
use crate::math::Point3;

use super::Extremum;

/// Parameter restrictions for a curve/surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSurfaceDomain {
    /// Range of the curve parameter.
    pub curve: CurveDomain,
    /// Ranges of the surface parameters.
    pub surface: SurfaceDomain,
}

impl CurveSurfaceDomain {
    /// Creates a new curve/surface domain.
    #[must_use]
    pub fn new(curve: CurveDomain, surface: SurfaceDomain) -> Self {
        Self { curve, surface }
    }
}

/// Stationary point of the distance between a curve and a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSurfaceExtremum {
    /// Curve parameter.
    pub parameter_on_curve: f64,
    /// U parameter of the surface footpoint.
    pub u: f64,
    /// V parameter of the surface footpoint.
    pub v: f64,
    /// Curve point at `parameter_on_curve`.
    pub point_on_curve: Point3,
    /// Surface point at `(u, v)`.
    pub point_on_surface: Point3,
    /// Square distance between the two points.
    pub square_distance: f64,
    /// Whether this is a global minimum among the extrema of the query.
    pub is_minimum: bool,
}

impl Extremum for CurveSurfaceExtremum {
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
