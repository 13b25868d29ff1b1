use tracing::{debug, trace};

use crate::extrema::point_curve::{domain_endpoints, ellipse_stationary_angles, StationaryAngles};
use crate::extrema::{
    add_boundary_extrema, classify_global, ExtremaResult, ExtremaStatus, SearchMode,
};
use crate::geometry::curve::{Curve, Ellipse};
use crate::geometry::surface::{Sphere, Surface};

use super::{CurveSurfaceDomain, CurveSurfaceExtremum};

/// Extrema of the distance between an ellipse and a sphere.
///
/// The distance from a point to the sphere is a monotone function of its
/// distance to the center, so the extrema sit at the parameters where the
/// distance from the ellipse to the sphere center is stationary. Footpoints
/// are radial projections on the sphere.
#[derive(Debug, Clone)]
pub struct EllipseSphere<'a> {
    ellipse: &'a Ellipse,
    sphere: &'a Sphere,
    domain: CurveSurfaceDomain,
}

impl<'a> EllipseSphere<'a> {
    /// Creates a query over the ellipse's own domain and the whole sphere.
    #[must_use]
    pub fn new(ellipse: &'a Ellipse, sphere: &'a Sphere) -> Self {
        Self {
            ellipse,
            sphere,
            domain: CurveSurfaceDomain::new(ellipse.domain(), sphere.domain()),
        }
    }

    /// Restricts the curve and surface parameters. U is periodic.
    #[must_use]
    pub fn with_domain(mut self, domain: CurveSurfaceDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Computes the extrema.
    ///
    /// Every extremum whose square distance is within `tol` of the smallest
    /// one is a minimum; all others are maxima. `mode` is applied after that
    /// classification.
    #[must_use]
    pub fn perform(&self, tol: f64, mode: SearchMode) -> ExtremaResult<CurveSurfaceExtremum> {
        match self.stationary(tol) {
            Ok(mut extrema) => {
                classify_global(&mut extrema, tol);
                ExtremaResult::from_classified(extrema, mode)
            }
            Err(terminal) => terminal,
        }
    }

    /// Like [`perform`](Self::perform), and also reports an end of the curve
    /// domain when it is nearer or farther than every stationary point.
    #[must_use]
    pub fn perform_with_endpoints(
        &self,
        tol: f64,
        mode: SearchMode,
    ) -> ExtremaResult<CurveSurfaceExtremum> {
        let mut extrema = match self.stationary(tol) {
            Ok(extrema) => extrema,
            Err(terminal) => return terminal,
        };
        classify_global(&mut extrema, tol);
        let ends: Vec<CurveSurfaceExtremum> =
            domain_endpoints(self.ellipse, self.domain.curve, tol)
                .into_iter()
                .filter_map(|t| self.extremum_at(t, tol))
                .collect();
        add_boundary_extrema(&mut extrema, &ends, true, tol);
        classify_global(&mut extrema, tol);
        ExtremaResult::from_classified(extrema, mode)
    }

    /// Unclassified stationary points, or the terminal result of a continuum
    /// or a solver failure.
    fn stationary(
        &self,
        tol: f64,
    ) -> Result<Vec<CurveSurfaceExtremum>, ExtremaResult<CurveSurfaceExtremum>> {
        let center = self.sphere.center();
        let angles = match ellipse_stationary_angles(self.ellipse, center, self.domain.curve, tol)
        {
            StationaryAngles::Finite(angles) => angles,
            StationaryAngles::Circle => {
                let height = self.ellipse.local_coordinates(center).z;
                let gap = self.ellipse.major_radius().hypot(height) - self.sphere.radius();
                return Err(ExtremaResult::infinite(gap * gap));
            }
            StationaryAngles::Failed(status) => {
                debug!(?status, "ellipse/sphere stationary equation failed");
                return Err(ExtremaResult::failed(ExtremaStatus::NumericalError));
            }
        };

        let mut extrema: Vec<CurveSurfaceExtremum> = Vec::with_capacity(angles.len());
        for t in angles {
            if extrema.iter().any(|e| (e.parameter_on_curve - t).abs() <= tol) {
                continue;
            }
            if let Some(extremum) = self.extremum_at(t, tol) {
                extrema.push(extremum);
            }
        }
        Ok(extrema)
    }

    /// Pairs the curve point at `t` with its radial footpoint, unless the
    /// footpoint falls outside the surface domain.
    fn extremum_at(&self, t: f64, tol: f64) -> Option<CurveSurfaceExtremum> {
        let point_on_curve = self.ellipse.value(t);
        let point_on_surface = self.sphere.radial_projection(&point_on_curve);
        let (u, v) = self.sphere.parameters(&point_on_surface);
        let Some((u, v)) = self.domain.surface.fit(u, v, tol) else {
            trace!(t, u, v, "footpoint outside the surface domain");
            return None;
        };
        Some(CurveSurfaceExtremum {
            parameter_on_curve: t,
            u,
            v,
            point_on_curve,
            point_on_surface,
            square_distance: (point_on_surface - point_on_curve).norm_squared(),
            is_minimum: false,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::CurveDomain;
    use crate::geometry::surface::SurfaceDomain;
    use crate::math::{Point3, Vector3};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn xy_ellipse(major: f64, minor: f64) -> Ellipse {
        Ellipse::new(Point3::origin(), major, minor, Vector3::z(), Vector3::x()).unwrap()
    }

    fn sphere_at(x: f64, y: f64, z: f64, radius: f64) -> Sphere {
        Sphere::with_center_radius(Point3::new(x, y, z), radius).unwrap()
    }

    #[test]
    fn sphere_on_major_axis_line() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(5.0, 0.0, 0.0, 1.0);
        let r = EllipseSphere::new(&e, &s).perform(1e-9, SearchMode::MinMax);
        assert!(r.is_done());
        assert_eq!(r.len(), 2);

        let min = &r.extrema[0];
        assert!(min.is_minimum);
        assert_abs_diff_eq!(min.parameter_on_curve, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(min.square_distance, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(min.point_on_surface, Point3::new(4.0, 0.0, 0.0), epsilon = 1e-12);

        let max = &r.extrema[1];
        assert!(!max.is_minimum);
        assert_abs_diff_eq!(max.parameter_on_curve, PI, epsilon = 1e-12);
        assert_abs_diff_eq!(max.square_distance, 36.0, epsilon = 1e-9);

        for ext in &r {
            let direct = (ext.point_on_curve - ext.point_on_surface).norm_squared();
            assert_abs_diff_eq!(ext.square_distance, direct);
            assert_abs_diff_eq!(s.value(ext.u, ext.v), ext.point_on_surface, epsilon = 1e-9);
        }
    }

    #[test]
    fn sphere_on_normal_axis() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(0.0, 0.0, 3.0, 1.0);
        let r = EllipseSphere::new(&e, &s).perform(1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 4);
        let params: Vec<f64> = r.iter().map(|e| e.parameter_on_curve).collect();
        for (got, want) in params.iter().zip([0.0, FRAC_PI_2, PI, 1.5 * PI]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
        let minima: Vec<bool> = r.iter().map(|e| e.is_minimum).collect();
        assert_eq!(minima, vec![false, true, false, true]);
        assert_abs_diff_eq!(r.min_square_distance(), (10.0_f64.sqrt() - 1.0).powi(2), epsilon = 1e-12);
    }

    #[test]
    fn sphere_on_normal_axis_swapped_radii() {
        let e = xy_ellipse(1.0, 2.0);
        let s = sphere_at(0.0, 0.0, 3.0, 1.0);
        let r = EllipseSphere::new(&e, &s).perform(1e-9, SearchMode::Min);
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r.extrema[0].parameter_on_curve, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.extrema[1].parameter_on_curve, PI, epsilon = 1e-12);
    }

    #[test]
    fn ellipse_inside_sphere_flips_classification() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(0.0, 0.0, 0.0, 10.0);
        let r = EllipseSphere::new(&e, &s).perform(1e-9, SearchMode::Min);
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r.extrema[0].parameter_on_curve, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.extrema[0].square_distance, 64.0, epsilon = 1e-12);
    }

    #[test]
    fn circle_with_sphere_on_axis_is_infinite() {
        let c = xy_ellipse(2.0, 2.0);
        let s = sphere_at(0.0, 0.0, 3.0, 1.0);
        let r = EllipseSphere::new(&c, &s).perform(1e-9, SearchMode::MinMax);
        assert!(r.is_infinite());
        assert!(r.is_empty());
        assert_abs_diff_eq!(
            r.infinite_square_distance,
            (13.0_f64.sqrt() - 1.0).powi(2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn search_modes() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(5.0, 0.0, 0.0, 1.0);
        let q = EllipseSphere::new(&e, &s);

        let min = q.perform(1e-9, SearchMode::Min);
        assert_eq!(min.len(), 1);
        assert!(min.extrema[0].is_minimum);

        let max = q.perform(1e-9, SearchMode::Max);
        assert_eq!(max.len(), 1);
        assert!(!max.extrema[0].is_minimum);

        assert_eq!(q.perform(1e-9, SearchMode::default()).len(), 2);
    }

    #[test]
    fn curve_domain_filter() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(5.0, 0.0, 0.0, 1.0);
        let domain = CurveSurfaceDomain::new(CurveDomain::new(-1.0, 1.0), s.domain());
        let r = EllipseSphere::new(&e, &s)
            .with_domain(domain)
            .perform(1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 1);
        assert_abs_diff_eq!(r.extrema[0].parameter_on_curve, 0.0, epsilon = 1e-12);

        let domain = CurveSurfaceDomain::new(CurveDomain::new(0.5, 2.0), s.domain());
        let r = EllipseSphere::new(&e, &s)
            .with_domain(domain)
            .perform(1e-9, SearchMode::MinMax);
        assert_eq!(r.status, ExtremaStatus::NoSolution);
    }

    #[test]
    fn sphere_just_off_the_major_axis_line() {
        let e = xy_ellipse(2.0, 1.0);
        for offset in [1e-6, 1e-8] {
            let s = sphere_at(5.0, offset, 0.0, 1.0);
            let r = EllipseSphere::new(&e, &s).perform(1e-12, SearchMode::MinMax);
            assert_eq!(r.len(), 2, "offset {offset}");

            let min = &r.extrema[0];
            assert!(min.is_minimum);
            assert_abs_diff_eq!(min.parameter_on_curve, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(min.square_distance, 4.0, epsilon = 1e-9);

            let max = &r.extrema[1];
            assert!(!max.is_minimum);
            assert_abs_diff_eq!(max.parameter_on_curve, PI, epsilon = 1e-6);
            assert_abs_diff_eq!(max.square_distance, 36.0, epsilon = 1e-9);

            for ext in &r {
                let radial = ext.point_on_curve - s.center();
                let tangent = e.derivative(ext.parameter_on_curve);
                assert_abs_diff_eq!(radial.dot(&tangent), 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn arc_ends_bound_the_distance() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(5.0, 0.0, 0.0, 1.0);
        let domain = CurveSurfaceDomain::new(CurveDomain::new(0.5, 2.0), s.domain());
        let r = EllipseSphere::new(&e, &s)
            .with_domain(domain)
            .perform_with_endpoints(1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);
        let gap = |t: f64| ((e.value(t) - s.center()).norm() - 1.0).powi(2);

        let min = r.get(r.min_index().unwrap()).unwrap();
        assert!(min.is_minimum);
        assert_abs_diff_eq!(min.parameter_on_curve, 0.5);
        assert_abs_diff_eq!(min.square_distance, gap(0.5), epsilon = 1e-12);

        let max = r.get(r.max_index().unwrap()).unwrap();
        assert!(!max.is_minimum);
        assert_abs_diff_eq!(max.parameter_on_curve, 2.0);
        assert_abs_diff_eq!(max.square_distance, gap(2.0), epsilon = 1e-12);
    }

    #[test]
    fn arc_end_nearer_than_the_interior_minimum() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(5.0, 0.0, 0.0, 1.0);
        // Only pi is stationary inside; the end at t = 4 is nearer than it.
        let domain = CurveSurfaceDomain::new(CurveDomain::new(2.5, 4.0), s.domain());
        let r = EllipseSphere::new(&e, &s)
            .with_domain(domain)
            .perform_with_endpoints(1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);
        let minima: Vec<f64> = r
            .iter()
            .filter(|x| x.is_minimum)
            .map(|x| x.parameter_on_curve)
            .collect();
        assert_eq!(minima, vec![4.0]);
        assert_abs_diff_eq!(r.max_square_distance(), 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.min_square_distance(), 28.649_564_733, epsilon = 1e-8);
    }

    #[test]
    fn surface_domain_filter_wraps_u() {
        let e = xy_ellipse(2.0, 1.0);
        let s = sphere_at(0.0, 5.0, 0.0, 1.0);
        // Both footpoints face the ellipse at longitude 3*pi/2, expressed here as -pi/2.
        let keep = SurfaceDomain::new(-PI, 0.0, -FRAC_PI_2, FRAC_PI_2);
        let r = EllipseSphere::new(&e, &s)
            .with_domain(CurveSurfaceDomain::new(CurveDomain::new(0.0, TAU), keep))
            .perform(1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);
        for ext in &r {
            assert_abs_diff_eq!(ext.u, -FRAC_PI_2, epsilon = 1e-9);
        }

        let drop = SurfaceDomain::new(0.0, PI, -FRAC_PI_2, FRAC_PI_2);
        let r = EllipseSphere::new(&e, &s)
            .with_domain(CurveSurfaceDomain::new(CurveDomain::new(0.0, TAU), drop))
            .perform(1e-9, SearchMode::MinMax);
        assert_eq!(r.status, ExtremaStatus::NoSolution);
    }

    #[test]
    fn generic_configuration_is_stationary() {
        let e = Ellipse::new(
            Point3::new(0.5, -0.5, 1.0),
            3.0,
            1.2,
            Vector3::new(0.0, 0.3, 1.0),
            Vector3::x(),
        )
        .unwrap();
        let s = sphere_at(1.3, 2.1, -0.4, 0.5);
        let r = EllipseSphere::new(&e, &s).perform(1e-9, SearchMode::MinMax);
        assert!(r.is_done());
        assert!((2..=4).contains(&r.len()));
        assert_eq!(r.iter().filter(|e| e.is_minimum).count(), 1);

        for ext in &r {
            let radial = ext.point_on_curve - s.center();
            let tangent = e.derivative(ext.parameter_on_curve);
            assert_abs_diff_eq!(radial.dot(&tangent), 0.0, epsilon = 1e-8);
            assert_abs_diff_eq!((ext.point_on_surface - s.center()).norm(), 0.5, epsilon = 1e-12);
        }

        let n = 20_000;
        let sampled = (0..n)
            .map(|i| {
                let t = TAU * f64::from(i) / f64::from(n);
                let gap = (e.value(t) - s.center()).norm() - 0.5;
                gap * gap
            })
            .fold(f64::INFINITY, f64::min);
        assert!(r.min_square_distance() <= sampled + 1e-12);
        assert!(r.min_square_distance() >= sampled - 1e-3);
    }
}
