pub mod error;
pub mod extrema;
pub mod geometry;
pub mod math;

pub use error::{ExtremisError, Result};
