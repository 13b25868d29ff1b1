use thiserror::Error;

/// Top-level error type for the extremis kernel.
#[derive(Debug, Error)]
pub enum ExtremisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Extrema(#[from] ExtremaError),
}

/// Errors raised while constructing geometric primitives.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Unsuccessful outcomes of an extrema query.
///
/// Extrema components report these through a status field; this type is what
/// [`ExtremaResult::into_result`](crate::extrema::ExtremaResult::into_result)
/// turns them into.
#[derive(Debug, Error)]
pub enum ExtremaError {
    #[error("numerical failure in the underlying root solver")]
    NumericalError,

    #[error("iteration did not converge")]
    NotConverged,

    #[error("infinitely many extrema at square distance {square_distance}")]
    InfiniteSolutions { square_distance: f64 },

    #[error("no extremum inside the requested domain")]
    NoSolution,
}

/// Convenience type alias for results using [`ExtremisError`].
pub type Result<T> = std::result::Result<T, ExtremisError>;
