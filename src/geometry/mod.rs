pub mod curve;
pub mod surface;

pub use curve::{Curve, CurveDomain, Ellipse};
pub use surface::{Cone, Sphere, Surface, SurfaceDomain};
