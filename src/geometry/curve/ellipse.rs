use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// An ellipse (or elliptical arc) in 3D space.
///
/// `P(t) = center + R * cos(t) * x_dir + r * sin(t) * y_dir`
/// where `R` is the major radius, `r` the minor radius and
/// `y_dir = normal x x_dir`.
///
/// The radii are only required to be positive: `R < r` is accepted and
/// describes the same ellipse rotated by a quarter turn in parameter space.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    major_radius: f64,
    minor_radius: f64,
    normal: Vector3,
    x_dir: Vector3,
    domain: CurveDomain,
}

impl Ellipse {
    /// Creates a full ellipse with parameter domain `[0, 2*pi]`.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the ellipse
    /// * `major_radius` - Radius along `x_dir` (must be positive)
    /// * `minor_radius` - Radius along `normal x x_dir` (must be positive)
    /// * `normal` - Normal vector defining the ellipse plane
    /// * `x_dir` - Direction of `t = 0` (must be perpendicular to normal)
    ///
    /// # Errors
    ///
    /// Returns an error if either radius is non-positive, a direction is
    /// zero-length, or `x_dir` is not perpendicular to the normal.
    pub fn new(
        center: Point3,
        major_radius: f64,
        minor_radius: f64,
        normal: Vector3,
        x_dir: Vector3,
    ) -> Result<Self> {
        if major_radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("major radius must be positive".into()).into(),
            );
        }
        if minor_radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("minor radius must be positive".into()).into(),
            );
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let x_len = x_dir.norm();
        if x_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let x_dir = x_dir / x_len;

        if normal.dot(&x_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "x direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            major_radius,
            minor_radius,
            normal,
            x_dir,
            domain: CurveDomain::full_period(),
        })
    }

    /// Restricts the ellipse to the arc `[start_angle, end_angle]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or not finite.
    pub fn trimmed(mut self, start_angle: f64, end_angle: f64) -> Result<Self> {
        if !start_angle.is_finite() || !end_angle.is_finite() || end_angle <= start_angle {
            return Err(GeometryError::Degenerate(format!(
                "invalid arc range [{start_angle}, {end_angle}]"
            ))
            .into());
        }
        self.domain = CurveDomain::new(start_angle, end_angle);
        Ok(self)
    }

    /// Returns the center of the ellipse.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius along `x_dir`.
    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Returns the radius along `y_dir`.
    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    /// Returns the normal vector of the ellipse plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the direction of `t = 0`.
    #[must_use]
    pub fn x_dir(&self) -> &Vector3 {
        &self.x_dir
    }

    /// Returns the direction of `t = pi/2` (`normal x x_dir`).
    #[must_use]
    pub fn y_dir(&self) -> Vector3 {
        self.normal.cross(&self.x_dir)
    }

    /// Returns `true` when both radii agree within `tol`.
    #[must_use]
    pub fn is_circle(&self, tol: f64) -> bool {
        (self.major_radius - self.minor_radius).abs() <= tol
    }

    /// Coordinates of `point` in the ellipse frame `(x_dir, y_dir, normal)`.
    #[must_use]
    pub fn local_coordinates(&self, point: &Point3) -> Vector3 {
        let w = point - self.center;
        Vector3::new(w.dot(&self.x_dir), w.dot(&self.y_dir()), w.dot(&self.normal))
    }

    /// Second derivative with respect to `t`.
    #[must_use]
    pub fn second_derivative(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        self.x_dir * (-self.major_radius * c) + self.y_dir() * (-self.minor_radius * s)
    }
}

impl Curve for Ellipse {
    fn value(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + self.x_dir * (self.major_radius * c) + self.y_dir() * (self.minor_radius * s)
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        self.x_dir * (-self.major_radius * s) + self.y_dir() * (self.minor_radius * c)
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn is_periodic(&self) -> bool {
        true
    }
}
