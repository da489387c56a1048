//! hpgeo error types.

mod invalid_value;
mod polygon;
mod shape;

#[cfg(test)]
mod tests;

pub use invalid_value::{
    InvalidAngle, InvalidFact, InvalidNside, InvalidPixel, InvalidRadius,
    InvalidRange, InvalidSemiAxes, InvalidStep,
};
pub use polygon::PolygonError;
pub use shape::ShapeMismatch;

use std::{error::Error as StdError, fmt};

/// Invalid ordering scheme name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidScheme {
    /// The invalid value.
    pub value: String,
    /// The reason why it's invalid.
    pub reason: &'static str,
}

impl InvalidScheme {
    pub(crate) const fn new(value: String, reason: &'static str) -> Self {
        Self { value, reason }
    }
}

impl fmt::Display for InvalidScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid ordering scheme (got {:?}): {}",
            self.value, self.reason
        )
    }
}

impl StdError for InvalidScheme {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }
}

// -----------------------------------------------------------------------------

/// Any error produced by the batched drivers.
///
/// The per-concern error types are kept as variants so that callers can
/// still match on the exact failure.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid nside.
    Nside(InvalidNside),
    /// Pixel identifier out of range.
    Pixel(InvalidPixel),
    /// Angle out of range.
    Angle(InvalidAngle),
    /// Disc radius out of range.
    Radius(InvalidRadius),
    /// Invalid inclusive-mode refinement factor.
    Fact(InvalidFact),
    /// Invalid ellipse semi-axes.
    SemiAxes(InvalidSemiAxes),
    /// Invalid boundary sampling step.
    Step(InvalidStep),
    /// Invalid range-set interval.
    Range(InvalidRange),
    /// Inputs cannot be broadcast together.
    Shape(ShapeMismatch),
    /// Degenerate or non-convex polygon.
    Polygon(PolygonError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Nside(ref err) => err.fmt(f),
            Self::Pixel(ref err) => err.fmt(f),
            Self::Angle(ref err) => err.fmt(f),
            Self::Radius(ref err) => err.fmt(f),
            Self::Fact(ref err) => err.fmt(f),
            Self::SemiAxes(ref err) => err.fmt(f),
            Self::Step(ref err) => err.fmt(f),
            Self::Range(ref err) => err.fmt(f),
            Self::Shape(ref err) => err.fmt(f),
            Self::Polygon(ref err) => err.fmt(f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Self::Nside(ref err) => Some(err),
            Self::Pixel(ref err) => Some(err),
            Self::Angle(ref err) => Some(err),
            Self::Radius(ref err) => Some(err),
            Self::Fact(ref err) => Some(err),
            Self::SemiAxes(ref err) => Some(err),
            Self::Step(ref err) => Some(err),
            Self::Range(ref err) => Some(err),
            Self::Shape(ref err) => Some(err),
            Self::Polygon(ref err) => Some(err),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $error:ty) => {
        impl From<$error> for Error {
            fn from(value: $error) -> Self {
                Self::$variant(value)
            }
        }
    };
}

impl_from!(Nside, InvalidNside);
impl_from!(Pixel, InvalidPixel);
impl_from!(Angle, InvalidAngle);
impl_from!(Radius, InvalidRadius);
impl_from!(Fact, InvalidFact);
impl_from!(SemiAxes, InvalidSemiAxes);
impl_from!(Step, InvalidStep);
impl_from!(Range, InvalidRange);
impl_from!(Shape, ShapeMismatch);
impl_from!(Polygon, PolygonError);
