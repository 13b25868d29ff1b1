use std::f64::consts::PI;

use tracing::trace;

use crate::extrema::{add_boundary_extrema, ExtremaResult, SearchMode};
use crate::geometry::surface::{Cone, Surface, SurfaceDomain};
use crate::math::{normalize_angle, Point3};

use super::{stationary_longitudes, PointSurfaceExtremum};

/// Extrema of the distance between a point and a double cone.
///
/// The stationary points lie in the meridian plane through the query point:
/// they are its orthogonal projections on the two generators of that plane,
/// at `u = phi` and `u = phi + pi`. The projection further from the apex is
/// the minimum and the other one is reported as a maximum. A point on the
/// apex plane is equally far from both, and both are minima.
#[derive(Debug, Clone)]
pub struct PointCone<'a> {
    cone: &'a Cone,
    domain: SurfaceDomain,
}

impl<'a> PointCone<'a> {
    /// Creates a query over both nappes.
    #[must_use]
    pub fn new(cone: &'a Cone) -> Self {
        Self {
            cone,
            domain: cone.domain(),
        }
    }

    /// Restricts the surface parameters to `domain`. U is periodic.
    #[must_use]
    pub fn with_domain(mut self, domain: SurfaceDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Computes the extrema of the distance from `point` to the cone.
    #[must_use]
    pub fn perform(
        &self,
        point: &Point3,
        tol: f64,
        mode: SearchMode,
    ) -> ExtremaResult<PointSurfaceExtremum> {
        match self.stationary(point, tol) {
            Ok(extrema) => ExtremaResult::from_classified(extrema, mode),
            Err(terminal) => terminal,
        }
    }

    /// Same as [`perform`](Self::perform), plus the nearest border point of
    /// the domain when it is nearer than every stationary point.
    ///
    /// The farthest border point is added as a maximum only when both V
    /// bounds are finite.
    #[must_use]
    pub fn perform_with_boundary(
        &self,
        point: &Point3,
        tol: f64,
        mode: SearchMode,
    ) -> ExtremaResult<PointSurfaceExtremum> {
        let mut extrema = match self.stationary(point, tol) {
            Ok(extrema) => extrema,
            Err(terminal) => return terminal,
        };
        let border: Vec<PointSurfaceExtremum> = self
            .border_parameters(point, tol)
            .into_iter()
            .filter_map(|(u, v)| self.extremum_at(point, u, v, tol))
            .collect();
        let bounded = self.domain.v_min.is_finite() && self.domain.v_max.is_finite();
        add_boundary_extrema(&mut extrema, &border, bounded, tol);
        ExtremaResult::from_classified(extrema, mode)
    }

    fn stationary(
        &self,
        point: &Point3,
        tol: f64,
    ) -> Result<Vec<PointSurfaceExtremum>, ExtremaResult<PointSurfaceExtremum>> {
        let (height, rho, phi) = self.cone.cylindrical_coordinates(point);
        let (sa, ca) = self.cone.half_angle().sin_cos();

        if rho <= tol {
            // Every generator is at the same distance from an axis point.
            let dist = height * sa;
            return Err(ExtremaResult::infinite(dist * dist));
        }

        let square_norm = height * height + rho * rho;
        // Projections on the generators at phi and phi + pi.
        let v_along = height * ca + rho * sa;
        let v_across = height * ca - rho * sa;
        let tie = (v_along.abs() - v_across.abs()).abs() <= tol;
        let along_is_min = v_along.abs() >= v_across.abs();
        let candidates = [
            (phi, v_along, along_is_min || tie),
            (normalize_angle(phi + PI), v_across, !along_is_min || tie),
        ];

        Ok(candidates
            .into_iter()
            .filter_map(|(u, v, is_minimum)| {
                let Some((u, v)) = self.domain.fit(u, v, tol) else {
                    trace!(u, v, "cone candidate outside the domain");
                    return None;
                };
                Some(PointSurfaceExtremum {
                    u,
                    v,
                    point: self.cone.value(u, v),
                    square_distance: (square_norm - v * v).max(0.0),
                    is_minimum,
                })
            })
            .collect())
    }

    fn extremum_at(
        &self,
        point: &Point3,
        u: f64,
        v: f64,
        tol: f64,
    ) -> Option<PointSurfaceExtremum> {
        let (u, v) = self.domain.fit(u, v, tol)?;
        let on_surface = self.cone.value(u, v);
        Some(PointSurfaceExtremum {
            u,
            v,
            point: on_surface,
            square_distance: (point - on_surface).norm_squared(),
            is_minimum: true,
        })
    }

    /// Border parameters where the distance to `point` is stationary along
    /// the border, followed by the corners.
    ///
    /// Finite V bounds are circles; U bounds shorter than a turn are
    /// generators, whose nearest point to `point` is its projection.
    fn border_parameters(&self, point: &Point3, tol: f64) -> Vec<(f64, f64)> {
        let dp = point - self.cone.apex();
        let x = dp.dot(self.cone.ref_dir());
        let y = dp.dot(&self.cone.binormal());
        let v_bounds: Vec<f64> = [self.domain.v_min, self.domain.v_max]
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();

        let longitudes = stationary_longitudes(x, y, &self.domain, tol);
        let mut params: Vec<(f64, f64)> = v_bounds
            .iter()
            .flat_map(|&v| longitudes.iter().map(move |&u| (u, v)))
            .collect();
        if self.domain.wraps_u(tol) {
            return params;
        }
        for u in [self.domain.u_min, self.domain.u_max] {
            params.push((u, dp.dot(&self.cone.generator(u))));
            params.extend(v_bounds.iter().map(|&v| (u, v)));
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::extrema::ExtremaStatus;
    use crate::math::Vector3;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_4, TAU};

    fn z_cone_45() -> Cone {
        Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_4, Vector3::x()).unwrap()
    }

    #[test]
    fn point_above_upper_nappe() {
        let c = z_cone_45();
        let q = Point3::new(0.0, 1.0, 3.0);
        let r = PointCone::new(&c).perform(&q, 1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);

        let min = &r.extrema[0];
        assert!(min.is_minimum);
        assert_abs_diff_eq!(min.u, PI / 2.0, epsilon = 1e-12);
        // Distance from (rho, h) = (1, 3) to the line rho = h is |3 - 1| / sqrt(2).
        assert_abs_diff_eq!(min.square_distance, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!((min.point - q).norm_squared(), 2.0, epsilon = 1e-12);

        let max = &r.extrema[1];
        assert!(!max.is_minimum);
        assert_abs_diff_eq!(max.u, 1.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(max.square_distance, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!((max.point - q).norm_squared(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn point_below_apex_uses_lower_nappe() {
        let c = z_cone_45();
        let q = Point3::new(1.0, 0.0, -3.0);
        let r = PointCone::new(&c).perform(&q, 1e-9, SearchMode::Min);
        assert_eq!(r.len(), 1);
        let min = &r.extrema[0];
        assert!(min.v < 0.0);
        assert_abs_diff_eq!(min.u, PI, epsilon = 1e-12);
        assert_abs_diff_eq!(min.square_distance, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!((min.point - q).norm_squared(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn stationarity_of_extrema() {
        let c = Cone::new(
            Point3::new(0.5, 0.5, 0.0),
            Vector3::new(1.0, 0.0, 1.0),
            0.35,
            Vector3::y(),
        )
        .unwrap();
        let q = Point3::new(2.0, -1.0, 1.5);
        let r = PointCone::new(&c).perform(&q, 1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);
        let h = 1e-6;
        for ext in &r {
            let d_v = (c.value(ext.u, ext.v + h) - c.value(ext.u, ext.v - h)) / (2.0 * h);
            let d_u = (c.value(ext.u + h, ext.v) - c.value(ext.u - h, ext.v)) / (2.0 * h);
            let diff = ext.point - q;
            assert_abs_diff_eq!(diff.dot(&d_v), 0.0, epsilon = 1e-7);
            assert_abs_diff_eq!(diff.dot(&d_u), 0.0, epsilon = 1e-7);
            assert_abs_diff_eq!(ext.square_distance, diff.norm_squared(), epsilon = 1e-10);
        }
    }

    #[test]
    fn axis_point_is_infinite() {
        let c = z_cone_45();
        let r = PointCone::new(&c).perform(&Point3::new(0.0, 0.0, 2.0), 1e-9, SearchMode::MinMax);
        assert!(r.is_infinite());
        assert_abs_diff_eq!(r.infinite_square_distance, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn upper_nappe_domain_drops_lower_candidate() {
        let c = z_cone_45();
        let r = PointCone::new(&c)
            .with_domain(SurfaceDomain::new(0.0, TAU, 0.0, f64::INFINITY))
            .perform(&Point3::new(3.0, 0.0, 0.0), 1e-9, SearchMode::MinMax);
        // On the apex plane both projections sit at |v| = 3 sin(45deg); only v > 0 survives.
        assert_eq!(r.len(), 1);
        assert!(r.extrema[0].v > 0.0);

        let r = PointCone::new(&c)
            .with_domain(SurfaceDomain::new(0.0, TAU, 10.0, 20.0))
            .perform(&Point3::new(3.0, 0.0, 0.0), 1e-9, SearchMode::MinMax);
        assert_eq!(r.status, ExtremaStatus::NoSolution);
    }

    #[test]
    fn apex_plane_point_has_two_minima() {
        let c = z_cone_45();
        let r = PointCone::new(&c).perform(&Point3::new(3.0, 0.0, 0.0), 1e-9, SearchMode::Min);
        assert_eq!(r.len(), 2);
        for ext in &r {
            assert!(ext.is_minimum);
            assert_abs_diff_eq!(ext.square_distance, 4.5, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(r.extrema[0].v, -r.extrema[1].v, epsilon = 1e-12);

        // Off the apex plane the classification is unchanged.
        let r = PointCone::new(&c).perform(&Point3::new(3.0, 0.0, 1e-3), 1e-9, SearchMode::Min);
        assert_eq!(r.len(), 1);
        assert!(r.extrema[0].v > 0.0);
    }

    #[test]
    fn band_without_stationary_points_is_bounded_by_its_rims() {
        let c = z_cone_45();
        let q = Point3::new(3.0, 0.0, 0.0);
        let band = SurfaceDomain::new(0.0, TAU, 1.0, 2.0);
        let plain = PointCone::new(&c).with_domain(band).perform(&q, 1e-9, SearchMode::MinMax);
        assert_eq!(plain.status, ExtremaStatus::NoSolution);

        let r = PointCone::new(&c)
            .with_domain(band)
            .perform_with_boundary(&q, 1e-9, SearchMode::MinMax);
        assert_eq!(r.len(), 2);
        let root2 = 2.0_f64.sqrt();

        let min = &r.extrema[r.min_index().unwrap()];
        assert!(min.is_minimum);
        assert_abs_diff_eq!(min.square_distance, 13.0 - 6.0 * root2, epsilon = 1e-9);
        assert_abs_diff_eq!(min.u, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(min.v, 2.0, epsilon = 1e-12);

        let max = &r.extrema[r.max_index().unwrap()];
        assert!(!max.is_minimum);
        assert_abs_diff_eq!(max.square_distance, 13.0 + 6.0 * root2, epsilon = 1e-9);
        assert_abs_diff_eq!(max.u, PI, epsilon = 1e-9);
        assert_abs_diff_eq!(max.v, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!((max.point - q).norm_squared(), max.square_distance, epsilon = 1e-9);
    }

    #[test]
    fn open_nappe_adds_no_border_maximum() {
        let c = z_cone_45();
        let r = PointCone::new(&c)
            .with_domain(SurfaceDomain::new(0.0, TAU, 0.0, f64::INFINITY))
            .perform_with_boundary(&Point3::new(3.0, 0.0, 0.0), 1e-9, SearchMode::MinMax);
        // The apex circle (v = 0) is farther than the footpoint on the nappe.
        assert_eq!(r.len(), 1);
        assert!(r.extrema[0].is_minimum);
        assert_abs_diff_eq!(r.extrema[0].square_distance, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn sector_edge_generator_holds_the_minimum() {
        let c = z_cone_45();
        let q = Point3::new(3.0, 0.0, 3.0);
        // The meridian of q (u = 0) is outside; the nearest edge generator is u = 0.5.
        let sector = SurfaceDomain::new(0.5, 1.0, 0.0, 10.0);
        let r = PointCone::new(&c)
            .with_domain(sector)
            .perform_with_boundary(&q, 1e-9, SearchMode::Min);
        assert_eq!(r.len(), 1);
        let min = &r.extrema[0];
        assert_abs_diff_eq!(min.u, 0.5, epsilon = 1e-12);
        let foot = (q - c.apex()).dot(&c.generator(0.5));
        assert_abs_diff_eq!(min.v, foot, epsilon = 1e-12);
        let square_distance = (q - c.value(0.5, foot)).norm_squared();
        assert_abs_diff_eq!(min.square_distance, square_distance, epsilon = 1e-12);
    }
}
