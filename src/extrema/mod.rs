//! Analytic extrema of the distance between geometric entities.
//!
//! Every component builds its candidates from closed forms or from the
//! trigonometric solver in [`crate::math::trig`], filters them through an
//! optional parameter domain and returns a fresh [`ExtremaResult`] per call.

pub mod curve_surface;
pub mod point_curve;
pub mod point_surface;

pub use curve_surface::{CurveSurfaceDomain, CurveSurfaceExtremum, EllipseSphere};
pub use point_curve::{PointCurveExtremum, PointEllipse};
pub use point_surface::{PointCone, PointSphere, PointSurfaceExtremum};

use tracing::{debug, trace};

use crate::error::{ExtremaError, Result};
use crate::math::SolverStatus;

/// Which kind of extrema a query should report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Minima only.
    Min,
    /// Maxima only.
    Max,
    /// Both minima and maxima.
    #[default]
    MinMax,
}

impl SearchMode {
    fn accepts(self, is_minimum: bool) -> bool {
        match self {
            Self::Min => is_minimum,
            Self::Max => !is_minimum,
            Self::MinMax => true,
        }
    }
}

/// Outcome of an extrema query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremaStatus {
    /// Extrema were found.
    Ok,
    /// An iterative stage ran out of iterations.
    NotConverged,
    /// The distance is stationary along a continuum of parameters.
    InfiniteSolutions,
    /// The underlying solver failed.
    NumericalError,
    /// The query is well posed but no extremum survived the filters.
    NoSolution,
}

impl From<SolverStatus> for ExtremaStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Ok => Self::Ok,
            SolverStatus::NotConverged => Self::NotConverged,
            SolverStatus::InfiniteSolutions => Self::InfiniteSolutions,
            SolverStatus::NumericalError => Self::NumericalError,
        }
    }
}

/// Common view on one stationary point of a distance function.
pub trait Extremum {
    /// Square of the distance at the stationary point.
    fn square_distance(&self) -> f64;

    /// Whether the stationary point is classified as a minimum.
    fn is_minimum(&self) -> bool;

    /// Overrides the classification.
    fn set_minimum(&mut self, is_minimum: bool);
}

/// Extrema found by one query together with its status.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremaResult<E> {
    /// Query outcome. `extrema` is empty unless this is [`ExtremaStatus::Ok`].
    pub status: ExtremaStatus,
    /// Extrema in the order the component produced them.
    pub extrema: Vec<E>,
    /// Square distance shared by the continuum of solutions when `status`
    /// is [`ExtremaStatus::InfiniteSolutions`], `0.0` otherwise.
    pub infinite_square_distance: f64,
}

impl<E: Extremum> ExtremaResult<E> {
    pub(crate) fn failed(status: ExtremaStatus) -> Self {
        debug!(?status, "extrema query failed");
        Self {
            status,
            extrema: Vec::new(),
            infinite_square_distance: 0.0,
        }
    }

    pub(crate) fn infinite(square_distance: f64) -> Self {
        debug!(square_distance, "continuum of extrema");
        Self {
            status: ExtremaStatus::InfiniteSolutions,
            extrema: Vec::new(),
            infinite_square_distance: square_distance,
        }
    }

    /// Applies the search mode to classified extrema.
    pub(crate) fn from_classified(extrema: Vec<E>, mode: SearchMode) -> Self {
        let extrema = filter_by_mode(extrema, mode);
        if extrema.is_empty() {
            return Self::failed(ExtremaStatus::NoSolution);
        }
        Self {
            status: ExtremaStatus::Ok,
            extrema,
            infinite_square_distance: 0.0,
        }
    }

    /// Returns `true` when extrema were found.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == ExtremaStatus::Ok
    }

    /// Returns `true` for a continuum of solutions.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.status == ExtremaStatus::InfiniteSolutions
    }

    /// Number of extrema.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extrema.len()
    }

    /// Returns `true` when no extremum is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extrema.is_empty()
    }

    /// Iterates over the extrema.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.extrema.iter()
    }

    /// Returns the `i`-th extremum, if any.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&E> {
        self.extrema.get(i)
    }

    /// Index of the extremum with the smallest square distance.
    #[must_use]
    pub fn min_index(&self) -> Option<usize> {
        self.extrema
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.square_distance().total_cmp(&b.square_distance()))
            .map(|(i, _)| i)
    }

    /// Index of the extremum with the largest square distance.
    #[must_use]
    pub fn max_index(&self) -> Option<usize> {
        self.extrema
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.square_distance().total_cmp(&b.square_distance()))
            .map(|(i, _)| i)
    }

    /// Smallest square distance, `+inf` when empty.
    #[must_use]
    pub fn min_square_distance(&self) -> f64 {
        self.extrema
            .iter()
            .map(Extremum::square_distance)
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest square distance, `-inf` when empty.
    #[must_use]
    pub fn max_square_distance(&self) -> f64 {
        self.extrema
            .iter()
            .map(Extremum::square_distance)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Converts the status into a `Result` over the extrema.
    ///
    /// # Errors
    ///
    /// Returns the [`ExtremaError`] matching any status other than
    /// [`ExtremaStatus::Ok`].
    pub fn into_result(self) -> Result<Vec<E>> {
        let err = match self.status {
            ExtremaStatus::Ok => return Ok(self.extrema),
            ExtremaStatus::NotConverged => ExtremaError::NotConverged,
            ExtremaStatus::InfiniteSolutions => ExtremaError::InfiniteSolutions {
                square_distance: self.infinite_square_distance,
            },
            ExtremaStatus::NumericalError => ExtremaError::NumericalError,
            ExtremaStatus::NoSolution => ExtremaError::NoSolution,
        };
        Err(err.into())
    }
}

impl<'a, E> IntoIterator for &'a ExtremaResult<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.extrema.iter()
    }
}

/// Marks every extremum within `tol` of the smallest square distance as a
/// minimum and every other one as a maximum.
pub fn classify_global<E: Extremum>(extrema: &mut [E], tol: f64) {
    let min = extrema
        .iter()
        .map(Extremum::square_distance)
        .fold(f64::INFINITY, f64::min);
    for e in extrema {
        let is_minimum = e.square_distance() <= min + tol;
        e.set_minimum(is_minimum);
    }
}

/// Adds the boundary candidates that bound the distance over a restricted
/// domain.
///
/// The nearest candidate becomes a minimum when it is nearer by more than
/// `tol` than every extremum in `extrema`. On a `bounded` domain the farthest
/// candidate becomes a maximum when it is farther by more than `tol` than all
/// of them. Other candidates are dropped.
pub(crate) fn add_boundary_extrema<E: Extremum + Clone>(
    extrema: &mut Vec<E>,
    candidates: &[E],
    bounded: bool,
    tol: f64,
) {
    let (nearest_known, farthest_known) = extrema
        .iter()
        .map(Extremum::square_distance)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    let by_distance = |a: &&E, b: &&E| a.square_distance().total_cmp(&b.square_distance());

    if let Some(nearest) = candidates.iter().min_by(by_distance) {
        if nearest.square_distance() < nearest_known - tol {
            let mut nearest = nearest.clone();
            nearest.set_minimum(true);
            extrema.push(nearest);
        }
    }
    if !bounded {
        return;
    }
    if let Some(farthest) = candidates.iter().max_by(by_distance) {
        if farthest.square_distance() > farthest_known + tol {
            trace!(square_distance = farthest.square_distance(), "boundary maximum");
            let mut farthest = farthest.clone();
            farthest.set_minimum(false);
            extrema.push(farthest);
        }
    }
}

/// Keeps the extrema the search mode asks for.
#[must_use]
pub fn filter_by_mode<E: Extremum>(mut extrema: Vec<E>, mode: SearchMode) -> Vec<E> {
    extrema.retain(|e| mode.accepts(e.is_minimum()));
    extrema
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ExtremisError;

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        sq: f64,
        min: bool,
    }

    impl Extremum for Sample {
        fn square_distance(&self) -> f64 {
            self.sq
        }

        fn is_minimum(&self) -> bool {
            self.min
        }

        fn set_minimum(&mut self, is_minimum: bool) {
            self.min = is_minimum;
        }
    }

    fn samples(values: &[f64]) -> Vec<Sample> {
        values.iter().map(|&sq| Sample { sq, min: false }).collect()
    }

    #[test]
    fn classify_marks_ties_as_minima() {
        let mut s = samples(&[4.0, 1.0, 1.0 + 1e-12, 9.0]);
        classify_global(&mut s, 1e-9);
        let flags: Vec<bool> = s.iter().map(|e| e.min).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn boundary_candidates_extend_the_extremes() {
        let mut extrema = vec![Sample { sq: 4.0, min: true }, Sample { sq: 9.0, min: false }];
        add_boundary_extrema(&mut extrema, &samples(&[5.0, 1.0, 16.0, 7.0]), true, 1e-9);
        assert_eq!(extrema.len(), 4);
        assert_eq!(extrema[2], Sample { sq: 1.0, min: true });
        assert_eq!(extrema[3], Sample { sq: 16.0, min: false });
    }

    #[test]
    fn boundary_candidates_inside_the_range_are_dropped() {
        let mut extrema = vec![Sample { sq: 1.0, min: true }, Sample { sq: 16.0, min: false }];
        add_boundary_extrema(&mut extrema, &samples(&[1.0, 5.0, 16.0]), true, 1e-9);
        assert_eq!(extrema.len(), 2);

        let mut extrema = Vec::new();
        add_boundary_extrema(&mut extrema, &samples(&[3.0, 2.0, 8.0]), false, 1e-9);
        assert_eq!(extrema, vec![Sample { sq: 2.0, min: true }]);
    }

    #[test]
    fn filter_keeps_requested_kind() {
        let mut s = samples(&[4.0, 1.0, 9.0]);
        classify_global(&mut s, 1e-9);
        assert_eq!(filter_by_mode(s.clone(), SearchMode::Min).len(), 1);
        assert_eq!(filter_by_mode(s.clone(), SearchMode::Max).len(), 2);
        assert_eq!(filter_by_mode(s, SearchMode::MinMax).len(), 3);
    }

    #[test]
    fn empty_after_filter_is_no_solution() {
        let mut s = samples(&[2.0]);
        classify_global(&mut s, 1e-9);
        let r = ExtremaResult::from_classified(s, SearchMode::Max);
        assert_eq!(r.status, ExtremaStatus::NoSolution);
        assert!(r.is_empty());
        assert!(!r.is_done());
    }

    #[test]
    fn min_and_max_accessors() {
        let mut s = samples(&[4.0, 1.0, 9.0]);
        classify_global(&mut s, 1e-9);
        let r = ExtremaResult::from_classified(s, SearchMode::MinMax);
        assert!(r.is_done());
        assert_eq!(r.min_index(), Some(1));
        assert_eq!(r.max_index(), Some(2));
        assert!((r.min_square_distance() - 1.0).abs() < f64::EPSILON);
        assert!((r.max_square_distance() - 9.0).abs() < f64::EPSILON);
        assert_eq!((&r).into_iter().count(), 3);
    }

    #[test]
    fn empty_result_extremes() {
        let r = ExtremaResult::<Sample>::failed(ExtremaStatus::NoSolution);
        assert_eq!(r.min_index(), None);
        assert!(r.min_square_distance().is_infinite());
        assert!(r.max_square_distance() < 0.0);
    }

    #[test]
    fn into_result_maps_status() {
        let r = ExtremaResult::<Sample>::infinite(2.5);
        assert!(r.is_infinite());
        match r.into_result() {
            Err(ExtremisError::Extrema(ExtremaError::InfiniteSolutions { square_distance })) => {
                assert!((square_distance - 2.5).abs() < f64::EPSILON);
            }
            other => panic!("unexpected {other:?}"),
        }

        let r = ExtremaResult::<Sample>::failed(ExtremaStatus::NumericalError);
        assert!(matches!(
            r.into_result(),
            Err(ExtremisError::Extrema(ExtremaError::NumericalError))
        ));

        let r = ExtremaResult::from_classified(samples(&[1.0]), SearchMode::MinMax);
        assert_eq!(r.into_result().unwrap().len(), 1);
    }

    #[test]
    fn solver_status_conversion() {
        assert_eq!(ExtremaStatus::from(SolverStatus::Ok), ExtremaStatus::Ok);
        assert_eq!(
            ExtremaStatus::from(SolverStatus::NumericalError),
            ExtremaStatus::NumericalError
        );
    }
}
