use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{normalize_angle, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A double conical surface in 3D space.
///
/// `P(u, v) = apex + v * g(u)` with the unit generator
/// `g(u) = cos(alpha) * axis + sin(alpha) * (cos(u) * ref_dir + sin(u) * binormal)`,
/// where `binormal = axis x ref_dir` and `alpha` is the half-angle.
///
/// `v` is the signed distance from the apex along the generator: positive
/// values sweep the nappe around `+axis`, negative values the opposite one.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    ref_dir: Vector3,
}

impl Cone {
    /// Creates a new cone.
    ///
    /// # Arguments
    ///
    /// * `apex` - The apex (tip) of the cone
    /// * `axis` - Axis direction (will be normalized)
    /// * `half_angle` - Half-angle in radians (must be in `(0, pi/2)`)
    /// * `ref_dir` - Reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is out of range, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, ref_dir: Vector3) -> Result<Self> {
        if half_angle <= TOLERANCE || half_angle >= FRAC_PI_2 - TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cone half-angle must be in (0, pi/2)".into(),
            )
            .into());
        }

        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }

        Ok(Self {
            apex,
            axis,
            half_angle,
            ref_dir,
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Returns the reference direction (u=0).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Computes the binormal direction (`axis x ref_dir`).
    #[must_use]
    pub fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Unit generator direction at longitude `u`.
    #[must_use]
    pub fn generator(&self, u: f64) -> Vector3 {
        let (su, cu) = u.sin_cos();
        let (sa, ca) = self.half_angle.sin_cos();
        self.axis * ca + (self.ref_dir * cu + self.binormal() * su) * sa
    }

    /// Axial height, distance to the axis and longitude of `point`
    /// relative to the apex.
    ///
    /// The longitude is `0` for points on the axis.
    #[must_use]
    pub fn cylindrical_coordinates(&self, point: &Point3) -> (f64, f64, f64) {
        let dp = point - self.apex;
        let height = dp.dot(&self.axis);
        let x = dp.dot(&self.ref_dir);
        let y = dp.dot(&self.binormal());
        let rho = x.hypot(y);
        let phi = if rho < TOLERANCE {
            0.0
        } else {
            normalize_angle(y.atan2(x))
        };
        (height, rho, phi)
    }
}

impl Surface for Cone {
    fn value(&self, u: f64, v: f64) -> Point3 {
        self.apex + self.generator(u) * v
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Projects `point` on the generator of its own meridian half-plane,
    /// picking the nappe on the same side of the apex.
    fn parameters(&self, point: &Point3) -> (f64, f64) {
        let (height, rho, phi) = self.cylindrical_coordinates(point);
        let (sa, ca) = self.half_angle.sin_cos();
        if height >= 0.0 {
            (phi, height * ca + rho * sa)
        } else {
            (normalize_angle(phi + PI), height * ca - rho * sa)
        }
    }
}
