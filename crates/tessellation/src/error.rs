use crate::geometry_builder::Count;
use crate::path::{Edge, FlattenedPath};

use std::fmt;

/// The tessellators' result type.
pub type TessellationResult = Result<Count, TessellationError>;

/// An error that can happen while generating geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryBuilderError {
    InvalidVertex,
    TooManyVertices,
}

impl fmt::Display for GeometryBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryBuilderError::InvalidVertex => write!(f, "Invalid vertex"),
            GeometryBuilderError::TooManyVertices => write!(f, "Too many vertices"),
        }
    }
}

impl std::error::Error for GeometryBuilderError {}

/// The triangulation oracle could not produce triangles for a set of contours.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OracleError {
    /// The oracle rejected the input, typically because of self-intersections.
    Rejected(String),
    /// The oracle produced a number of indices that is not a multiple of 3,
    /// or indices that do not refer to input vertices.
    InvalidOutput,
    /// The oracle did not answer, for example because a caller-side timeout
    /// expired.
    Unavailable,
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Rejected(reason) => write!(f, "Triangulation rejected: {}", reason),
            OracleError::InvalidOutput => write!(f, "Invalid triangulation output"),
            OracleError::Unavailable => write!(f, "Triangulation unavailable"),
        }
    }
}

impl std::error::Error for OracleError {}

#[derive(Clone, Debug, PartialEq)]
pub enum UnsupportedParameter {
    PositionIsNaN,
    ThicknessIsNaN,
    PixelScaleIsNotPositive,
}

impl fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedParameter::PositionIsNaN => write!(f, "Position is not a number"),
            UnsupportedParameter::ThicknessIsNaN => write!(f, "Line thickness is not a number"),
            UnsupportedParameter::PixelScaleIsNotPositive => {
                write!(f, "Pixel scale must be a positive number")
            }
        }
    }
}

impl std::error::Error for UnsupportedParameter {}

/// The tessellators' error enumeration.
#[derive(Clone, Debug, PartialEq)]
pub enum TessellationError {
    UnsupportedParameter(UnsupportedParameter),
    GeometryBuilder(GeometryBuilderError),
    Oracle(OracleError),
}

impl fmt::Display for TessellationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TessellationError::UnsupportedParameter(e) => write!(f, "Unsupported parameter: {}", e),
            TessellationError::GeometryBuilder(e) => write!(f, "Geometry builder error: {}", e),
            TessellationError::Oracle(e) => write!(f, "Triangulation error: {}", e),
        }
    }
}

impl std::error::Error for TessellationError {}

impl From<GeometryBuilderError> for TessellationError {
    fn from(value: GeometryBuilderError) -> Self {
        Self::GeometryBuilder(value)
    }
}

impl From<UnsupportedParameter> for TessellationError {
    fn from(value: UnsupportedParameter) -> Self {
        Self::UnsupportedParameter(value)
    }
}

impl From<OracleError> for TessellationError {
    fn from(value: OracleError) -> Self {
        Self::Oracle(value)
    }
}

/// Rejects paths with NaN positions, control points included.
pub(crate) fn check_positions(path: &FlattenedPath) -> Result<(), TessellationError> {
    for sub_path in &path.sub_paths {
        let ctrl_points = sub_path.edges.iter().filter_map(|edge| match edge {
            Edge::Curve(curve) => Some(curve.ctrl),
            Edge::Line(_) => None,
        });
        if sub_path
            .points()
            .chain(ctrl_points)
            .any(|p| p.x.is_nan() || p.y.is_nan())
        {
            return Err(UnsupportedParameter::PositionIsNaN.into());
        }
    }

    Ok(())
}
