use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{normalize_angle, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A spherical surface in 3D space.
///
/// Defined by a center, radius, axis (north pole direction), and a
/// reference direction for the equator at u=0.
///
/// `P(u, v) = center + r * cos(v) * (cos(u) * ref_dir + sin(u) * binormal) + r * sin(v) * axis`
/// where `binormal = axis x ref_dir`.
///
/// Parameters: `u` = longitude `[0, 2*pi)`, `v` = latitude `[-pi/2, pi/2]`.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Sphere {
    /// Creates a new sphere.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the sphere
    /// * `radius` - Radius (must be positive)
    /// * `axis` - North pole direction (will be normalized)
    /// * `ref_dir` - Equatorial reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("sphere radius must be positive".into()).into(),
            );
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
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Sphere centered at `center` with the global Z axis as pole.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn with_center_radius(center: Point3, radius: f64) -> Result<Self> {
        Self::new(center, radius, Vector3::z(), Vector3::x())
    }

    /// Returns the center of the sphere.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (north pole, unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the reference direction (u=0 on equator).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Computes the binormal direction (`axis x ref_dir`).
    #[must_use]
    pub fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Point where the ray from the center through `point` meets the sphere.
    ///
    /// A point at the center projects along the reference direction.
    #[must_use]
    pub fn radial_projection(&self, point: &Point3) -> Point3 {
        let dp = point - self.center;
        let len = dp.norm();
        let dir = if len < TOLERANCE {
            self.ref_dir
        } else {
            dp / len
        };
        self.center + dir * self.radius
    }
}

impl Surface for Sphere {
    fn value(&self, u: f64, v: f64) -> Point3 {
        let (su, cu) = u.sin_cos();
        let (sv, cv) = v.sin_cos();
        self.center
            + self.ref_dir * (self.radius * cv * cu)
            + self.binormal() * (self.radius * cv * su)
            + self.axis * (self.radius * sv)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -FRAC_PI_2, FRAC_PI_2)
    }

    fn parameters(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let len = dp.norm();
        if len < TOLERANCE {
            return (0.0, 0.0);
        }
        let dp = dp / len;
        let v = dp.dot(&self.axis).clamp(-1.0, 1.0).asin();
        let x = dp.dot(&self.ref_dir);
        let y = dp.dot(&self.binormal());
        // Poles: longitude is arbitrary.
        if x.abs() < TOLERANCE && y.abs() < TOLERANCE {
            return (0.0, v);
        }
        (normalize_angle(y.atan2(x)), v)
    }
}
