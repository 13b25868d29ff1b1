use std::f64::consts::FRAC_PI_2;

use crate::extrema::{add_boundary_extrema, ExtremaResult, SearchMode};
use crate::geometry::surface::{Sphere, Surface, SurfaceDomain};
use crate::math::trig::{trigonometric_cde, DEFAULT_EPS};
use crate::math::Point3;

use super::{stationary_longitudes, PointSurfaceExtremum};

/// Extrema of the distance between a point and a sphere.
///
/// Both extrema lie on the line through the center and the query point: the
/// near footpoint is the minimum, the antipodal one the maximum.
#[derive(Debug, Clone)]
pub struct PointSphere<'a> {
    sphere: &'a Sphere,
    domain: SurfaceDomain,
}

impl<'a> PointSphere<'a> {
    /// Creates a query over the whole sphere.
    #[must_use]
    pub fn new(sphere: &'a Sphere) -> Self {
        Self {
            sphere,
            domain: sphere.domain(),
        }
    }

    /// Restricts the surface parameters to `domain`. U is periodic.
    #[must_use]
    pub fn with_domain(mut self, domain: SurfaceDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Computes the extrema of the distance from `point` to the sphere.
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

    /// Same as [`perform`](Self::perform), plus the nearest and farthest
    /// points of the domain border when they bound the distance better than
    /// the stationary points.
    ///
    /// The border is made of the parallels at the V bounds and, when the U
    /// range is shorter than a turn, the meridians at the U bounds.
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
        add_boundary_extrema(&mut extrema, &border, true, tol);
        ExtremaResult::from_classified(extrema, mode)
    }

    fn stationary(
        &self,
        point: &Point3,
        tol: f64,
    ) -> Result<Vec<PointSurfaceExtremum>, ExtremaResult<PointSurfaceExtremum>> {
        let center = self.sphere.center();
        let radius = self.sphere.radius();
        let dp = point - center;
        let dist = dp.norm();
        if dist <= tol {
            return Err(ExtremaResult::infinite(radius * radius));
        }

        let dir = dp / dist;
        let candidates = [(center + dir * radius, true), (center - dir * radius, false)];
        Ok(candidates
            .into_iter()
            .filter_map(|(on_surface, is_minimum)| {
                let (u, v) = self.sphere.parameters(&on_surface);
                let (u, v) = self.domain.fit(u, v, tol)?;
                Some(PointSurfaceExtremum {
                    u,
                    v,
                    point: on_surface,
                    square_distance: (point - on_surface).norm_squared(),
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
        let on_surface = self.sphere.value(u, v);
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
    fn border_parameters(&self, point: &Point3, tol: f64) -> Vec<(f64, f64)> {
        let dp = point - self.sphere.center();
        let x = dp.dot(self.sphere.ref_dir());
        let y = dp.dot(&self.sphere.binormal());
        let z = dp.dot(self.sphere.axis());
        let v_lower = self.domain.v_min.max(-FRAC_PI_2);
        let v_upper = self.domain.v_max.min(FRAC_PI_2);

        let longitudes = stationary_longitudes(x, y, &self.domain, tol);
        let mut params: Vec<(f64, f64)> = [v_lower, v_upper]
            .into_iter()
            .flat_map(|v| longitudes.iter().map(move |&u| (u, v)))
            .collect();
        if self.domain.wraps_u(tol) {
            return params;
        }
        for u in [self.domain.u_min, self.domain.u_max] {
            // Distance along a meridian depends on rho*cos(v) + z*sin(v).
            let rho = x * u.cos() + y * u.sin();
            let latitudes = trigonometric_cde(z, -rho, 0.0, v_lower, v_upper, DEFAULT_EPS);
            params.extend(latitudes.roots().iter().map(|&v| (u, v)));
            params.extend([(u, v_lower), (u, v_upper)]);
        }
        params
    }
}
