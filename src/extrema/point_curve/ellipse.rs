use std::f64::consts::{FRAC_PI_2, PI};

use tracing::trace;

use crate::extrema::{add_boundary_extrema, ExtremaResult, SearchMode};
use crate::geometry::curve::{Curve, CurveDomain, Ellipse};
use crate::math::trig::{self, DEFAULT_EPS};
use crate::math::{fit_periodic, Point3, SolverStatus};

use super::{domain_endpoints, PointCurveExtremum};

/// Stationary parameters of `t -> |P(t) - target|^2` on an ellipse.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StationaryAngles {
    /// Finitely many parameters, inside the requested domain.
    Finite(Vec<f64>),
    /// The ellipse is a circle and `target` lies on its axis.
    Circle,
    /// The trigonometric solver failed.
    Failed(SolverStatus),
}

/// Solves for the parameters where the distance from `target` to the ellipse
/// is stationary, restricted to `domain`.
///
/// With `W` the local coordinates of `target`, `R`/`r` the radii,
/// `d/dt |P(t) - target|^2 / 2 = 0` reads
/// `(R^2 - r^2) cos(t) sin(t) + r Wy cos(t) - R Wx sin(t) = 0`.
/// A target on the normal axis through the center (`Wx = Wy = 0`) makes the
/// vertices the only candidates, or every parameter for a circle.
pub(crate) fn ellipse_stationary_angles(
    ellipse: &Ellipse,
    target: &Point3,
    domain: CurveDomain,
    tol: f64,
) -> StationaryAngles {
    let w = ellipse.local_coordinates(target);
    let major = ellipse.major_radius();
    let minor = ellipse.minor_radius();

    if w.x.hypot(w.y) <= tol {
        if ellipse.is_circle(tol) {
            return StationaryAngles::Circle;
        }
        trace!(height = w.z, "target on the ellipse axis");
        let angles = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
            .into_iter()
            .filter_map(|t| fit_periodic(t, domain.t_min, domain.t_max, tol))
            .collect();
        return StationaryAngles::Finite(angles);
    }

    let b = 0.5 * (major * major - minor * minor);
    let roots = trig::trigonometric(
        0.0,
        b,
        minor * w.y,
        -major * w.x,
        0.0,
        domain.t_min,
        domain.t_max,
        DEFAULT_EPS,
    );
    if roots.infinite_roots {
        return StationaryAngles::Circle;
    }
    if !roots.is_done() {
        return StationaryAngles::Failed(roots.status);
    }
    StationaryAngles::Finite(roots.roots().to_vec())
}

/// Extrema of the distance between a point and an ellipse.
///
/// Minima and maxima are told apart locally from the sign of the second
/// derivative of the square distance.
#[derive(Debug, Clone)]
pub struct PointEllipse<'a> {
    ellipse: &'a Ellipse,
    domain: CurveDomain,
}

impl<'a> PointEllipse<'a> {
    /// Creates a query over the ellipse's own parameter domain.
    #[must_use]
    pub fn new(ellipse: &'a Ellipse) -> Self {
        Self {
            ellipse,
            domain: ellipse.domain(),
        }
    }

    /// Restricts the curve parameter to `domain`.
    #[must_use]
    pub fn with_domain(mut self, domain: CurveDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Computes the extrema of the distance from `point` to the ellipse.
    #[must_use]
    pub fn perform(
        &self,
        point: &Point3,
        tol: f64,
        mode: SearchMode,
    ) -> ExtremaResult<PointCurveExtremum> {
        match self.stationary(point, tol) {
            Ok(extrema) => ExtremaResult::from_classified(extrema, mode),
            Err(terminal) => terminal,
        }
    }

    /// Like [`perform`](Self::perform), and also reports a domain endpoint
    /// when it is nearer or farther than every stationary point.
    #[must_use]
    pub fn perform_with_endpoints(
        &self,
        point: &Point3,
        tol: f64,
        mode: SearchMode,
    ) -> ExtremaResult<PointCurveExtremum> {
        let mut extrema = match self.stationary(point, tol) {
            Ok(extrema) => extrema,
            Err(terminal) => return terminal,
        };
        let ends: Vec<PointCurveExtremum> = domain_endpoints(self.ellipse, self.domain, tol)
            .into_iter()
            .map(|t| self.extremum_at(point, t))
            .collect();
        add_boundary_extrema(&mut extrema, &ends, true, tol);
        ExtremaResult::from_classified(extrema, mode)
    }

    /// Locally classified stationary points, or the terminal result of a
    /// continuum or a solver failure.
    fn stationary(
        &self,
        point: &Point3,
        tol: f64,
    ) -> Result<Vec<PointCurveExtremum>, ExtremaResult<PointCurveExtremum>> {
        match ellipse_stationary_angles(self.ellipse, point, self.domain, tol) {
            StationaryAngles::Finite(angles) => Ok(angles
                .into_iter()
                .map(|t| self.extremum_at(point, t))
                .collect()),
            StationaryAngles::Circle => {
                let height = self.ellipse.local_coordinates(point).z;
                let radius = self.ellipse.major_radius();
                Err(ExtremaResult::infinite(radius * radius + height * height))
            }
            StationaryAngles::Failed(status) => Err(ExtremaResult::failed(status.into())),
        }
    }

    fn extremum_at(&self, point: &Point3, t: f64) -> PointCurveExtremum {
        let on_curve = self.ellipse.value(t);
        let diff = on_curve - point;
        let d1 = self.ellipse.derivative(t);
        let d2 = self.ellipse.second_derivative(t);
        PointCurveExtremum {
            parameter: t,
            point: on_curve,
            square_distance: diff.norm_squared(),
            is_minimum: d1.norm_squared() + diff.dot(&d2) > 0.0,
        }
    }
}
