#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Data structures to turn vector shape records into paths.
//!
//! The input of this crate is a list of [shape records](records/index.html):
//! style changes and move/line/curve edges expressed in twips, as produced by
//! a shape decoder. The [scanner](scanner/index.html) splits the edges into
//! chains per style, the [contour assembler](contour/index.html) stitches the
//! chains of a style into contours and the contours are replayed into
//! [paths](path/index.html) through the [builder](builder/index.html).
//!
//! This crate is reexported in [shapemesh](../shapemesh/index.html).
//!
//! # Examples
//!
//! ```
//! use shapemesh_path::Path;
//! use shapemesh_path::math::point;
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.curve_to(point(10.0, 10.0), point(0.0, 10.0));
//! builder.line_to(point(0.0, 0.0));
//!
//! let path = builder.build();
//!
//! for event in &path {
//!     println!("{:?}", event);
//! }
//! ```

pub use shapemesh_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod builder;
pub mod chain;
pub mod contour;
mod events;
pub mod path;
pub mod records;
pub mod scanner;
pub mod style;
pub mod twips;

#[doc(inline)]
pub use crate::builder::PathBuilder;
#[doc(inline)]
pub use crate::chain::{Chain, ChainArena, ChainId, ChainSegment};
#[doc(inline)]
pub use crate::contour::{assemble_contours, Contour};
pub use crate::events::*;
#[doc(inline)]
pub use crate::path::{
    polygon_points, Edge, FlattenedPath, FlattenedSubPath, Path, PrepareOptions,
};
#[doc(inline)]
pub use crate::records::{EdgeCommand, ShapeDefinition, ShapeRecord, StyleChange};
#[doc(inline)]
pub use crate::scanner::{ContourSet, ShapeContours, ShapeScanner, StyleKey};
#[doc(inline)]
pub use crate::style::{
    BitmapFill, Color, FillStyle, Gradient, GradientInterpolation, GradientKind, GradientSpread,
    GradientStop, ImageRef, LineCap, LineJoin, ScaleMode, StrokeStyle, StyleTable,
};
#[doc(inline)]
pub use crate::twips::{TwipPoint, Twips};

pub use crate::geom::FlatteningOptions;

pub mod math {
    //! f32 version of the shapemesh_geom types used everywhere. The other
    //! shapemesh crates reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Alias for ```euclid::default::Transform2D<f32>```
    pub type Transform = euclid::default::Transform2D<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// See the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i16) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i16) -> bool {
        !self.is_in(winding_number)
    }
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::EvenOdd
    }
}

/// The two possible orientations for the edges of a shape to be built in.
///
/// Positive winding corresponds to the positive orientation in trigonometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Winding {
    Positive,
    Negative,
}

impl Winding {
    /// Winding of a polygon with the given signed area. `None` for empty polygons.
    pub fn from_signed_area(area: f32) -> Option<Self> {
        if area > 0.0 {
            Some(Winding::Positive)
        } else if area < 0.0 {
            Some(Winding::Negative)
        } else {
            None
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Winding::Positive => 1.0,
            Winding::Negative => -1.0,
        }
    }
}

#[test]
fn fill_rule() {
    assert!(FillRule::EvenOdd.is_in(1));
    assert!(FillRule::EvenOdd.is_out(2));
    assert!(FillRule::EvenOdd.is_in(-3));
    assert!(FillRule::NonZero.is_in(2));
    assert!(FillRule::NonZero.is_out(0));
}
