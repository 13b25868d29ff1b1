mod ellipse;

pub use ellipse::PointEllipse;
pub(crate) use ellipse::{ellipse_stationary_angles, StationaryAngles};

use std::f64::consts::TAU;

use crate::geometry::curve::{Curve, CurveDomain};
use crate::math::Point3;

use super::Extremum;

/// Ends of `domain` that bound the curve. A domain covering a whole period
/// of a periodic curve has none.
pub(crate) fn domain_endpoints<C: Curve>(curve: &C, domain: CurveDomain, tol: f64) -> Vec<f64> {
    if curve.is_periodic() && domain.width() >= TAU - tol {
        return Vec::new();
    }
    [domain.t_min, domain.t_max]
        .into_iter()
        .filter(|t| t.is_finite())
        .collect()
}

/// Stationary point of the distance between a point and a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCurveExtremum {
    /// Curve parameter.
    pub parameter: f64,
    /// Curve point at `parameter`.
    pub point: Point3,
    /// Square distance from the query point to `point`.
    pub square_distance: f64,
    /// Whether the distance is locally minimal here.
    pub is_minimum: bool,
}

impl Extremum for PointCurveExtremum {
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
