#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Tessellation of vector shape fills and strokes.
//!
//! This crate is reexported in [shapemesh](../shapemesh/index.html).
//!
//! ## Overview
//!
//! The most interesting types and traits of this crate are:
//!
//! * [FillTessellator](fill/struct.FillTessellator.html) - Triangulates the closed contours of
//!   a fill style, with an optional analytic representation of the curves.
//! * [StrokeTessellator](stroke/struct.StrokeTessellator.html) - Outlines the center-line of a
//!   line style with joins and caps.
//! * [`GeometryBuilder`](geometry_builder/trait.GeometryBuilder.html) - The trait both
//!   tessellators write their triangles into. [`VertexBuffer`](geometry_builder/struct.VertexBuffer.html)
//!   implements it with a flat `f32` layout.
//! * [`Triangulator`](oracle/trait.Triangulator.html) - The polygon triangulation the fill
//!   tessellator delegates to.
//!
//! ## The tessellation pipeline
//!
//! ```ascii
//!  Path ──► FillTessellator ──┐
//!                 │           ├──► GeometryBuilder ──► VertexBuffer
//!            Triangulator     │
//!  Path ──► StrokeTessellator ┘
//! ```
//!
//! ### Flattening
//!
//! The tessellators work on paths made of line segments and quadratic bézier
//! curves. Curves are approximated with line segments by recursive
//! subdivision, see [FlatteningOptions](struct.FlatteningOptions.html).
//!
//! ## Examples
//!
//! ```
//! use shapemesh_tessellation::*;
//! use shapemesh_tessellation::geometry_builder::*;
//! use shapemesh_tessellation::math::point;
//! use shapemesh_tessellation::path::Path;
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.line_to(point(10.0, 10.0));
//! builder.line_to(point(0.0, 10.0));
//! builder.line_to(point(0.0, 0.0));
//! let path = builder.build();
//!
//! let mut buffer = VertexBuffer::new(VertexLayout::Position);
//! let mut tessellator = FillTessellator::new();
//! let outcome = tessellator
//!     .tessellate_path(&path, &FillOptions::default(), &mut buffer)
//!     .unwrap();
//!
//! assert_eq!(outcome.count.triangles, 2);
//! ```

pub use shapemesh_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod boundary;
mod error;
pub mod fill;
pub mod geometry_builder;
pub mod math_utils;
pub mod oracle;
pub mod stroke;

#[cfg(test)]
mod fill_tests;

pub use crate::path::geom;
pub use crate::path::math;

#[doc(inline)]
pub use crate::error::*;

#[doc(inline)]
pub use crate::fill::{FillOutcome, FillTessellator};

#[doc(inline)]
pub use crate::stroke::{RailPiece, StrokeTessellator};

#[doc(inline)]
pub use crate::geometry_builder::{
    Count, GeometryBuilder, NoOutput, TriangleKind, VertexBuffer, VertexLayout,
};

#[doc(inline)]
pub use crate::oracle::{EarcutTriangulator, Triangulator};

pub use crate::path::{
    FillRule, FlatteningOptions, LineCap, LineJoin, PrepareOptions, ScaleMode, Winding,
};

/// Turn angles, in degrees, at which a stroke joint is considered straight.
///
/// Turn angles are measured from the incoming to the outgoing direction in
/// `[0, 360)`. A joint is drawn without joint geometry when its turn angle
/// is at most `straight_max`, between `reversal_min` and `reversal_max`, or
/// at least `wrap_min`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct JoinAngleBand {
    pub straight_max: f32,
    pub reversal_min: f32,
    pub reversal_max: f32,
    pub wrap_min: f32,
}

impl JoinAngleBand {
    pub const DEFAULT: Self = JoinAngleBand {
        straight_max: 10.0,
        reversal_min: 170.0,
        reversal_max: 190.0,
        wrap_min: 350.0,
    };

    /// A band that treats every joint as a real joint.
    pub const NONE: Self = JoinAngleBand {
        straight_max: -1.0,
        reversal_min: 361.0,
        reversal_max: 361.0,
        wrap_min: 361.0,
    };

    #[inline]
    pub const fn with_straight_max(mut self, degrees: f32) -> Self {
        self.straight_max = degrees;
        self
    }

    #[inline]
    pub const fn with_reversal(mut self, min: f32, max: f32) -> Self {
        self.reversal_min = min;
        self.reversal_max = max;
        self
    }

    #[inline]
    pub const fn with_wrap_min(mut self, degrees: f32) -> Self {
        self.wrap_min = degrees;
        self
    }

    /// `turn` in degrees, in `[0, 360)`.
    pub fn is_straight(&self, turn: f32) -> bool {
        turn <= self.straight_max
            || (turn >= self.reversal_min && turn <= self.reversal_max)
            || turn >= self.wrap_min
    }
}

impl Default for JoinAngleBand {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the stroke tessellator.
///
/// The style dependent parameters (thickness, joins, caps, miter limit,
/// scale mode) come from the [StrokeStyle](../shapemesh_path/style/struct.StrokeStyle.html).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeOptions {
    /// How the rails of curves are approximated.
    ///
    /// Default value: `FlatteningOptions::DEFAULT`.
    pub flattening: FlatteningOptions,

    /// Joints in this band get no joint geometry.
    ///
    /// Default value: `JoinAngleBand::DEFAULT`.
    pub join_band: JoinAngleBand,

    /// Angle between two consecutive triangles of a round joint.
    ///
    /// Default value: `StrokeOptions::DEFAULT_ROUND_JOIN_STEP_DEGREES`.
    pub round_join_step_degrees: f32,

    /// Angle between two consecutive triangles of a round cap.
    ///
    /// Default value: `StrokeOptions::DEFAULT_ROUND_CAP_STEP_DEGREES`.
    pub round_cap_step_degrees: f32,

    /// Miter limit used when the style does not have one.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub default_miter_limit: f32,

    /// Maximum number of bisections of a curve whose rails overlap.
    ///
    /// Default value: `StrokeOptions::DEFAULT_MAX_RAIL_DEPTH`.
    pub max_rail_depth: u32,
}

impl StrokeOptions {
    /// Smallest miter limit, below which joints would be cut inside the rails.
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    pub const DEFAULT_MITER_LIMIT: f32 = 1.5 * 2.0;
    pub const DEFAULT_ROUND_JOIN_STEP_DEGREES: f32 = 5.0;
    pub const DEFAULT_ROUND_CAP_STEP_DEGREES: f32 = 2.0;
    pub const DEFAULT_MAX_RAIL_DEPTH: u32 = 8;

    pub const DEFAULT: Self = StrokeOptions {
        flattening: FlatteningOptions::DEFAULT,
        join_band: JoinAngleBand::DEFAULT,
        round_join_step_degrees: Self::DEFAULT_ROUND_JOIN_STEP_DEGREES,
        round_cap_step_degrees: Self::DEFAULT_ROUND_CAP_STEP_DEGREES,
        default_miter_limit: Self::DEFAULT_MITER_LIMIT,
        max_rail_depth: Self::DEFAULT_MAX_RAIL_DEPTH,
    };

    #[inline]
    pub const fn with_flattening(mut self, flattening: FlatteningOptions) -> Self {
        self.flattening = flattening;
        self
    }

    #[inline]
    pub const fn with_join_band(mut self, band: JoinAngleBand) -> Self {
        self.join_band = band;
        self
    }

    #[inline]
    pub const fn with_round_join_step(mut self, degrees: f32) -> Self {
        self.round_join_step_degrees = degrees;
        self
    }

    #[inline]
    pub const fn with_round_cap_step(mut self, degrees: f32) -> Self {
        self.round_cap_step_degrees = degrees;
        self
    }

    #[inline]
    pub fn with_default_miter_limit(mut self, limit: f32) -> Self {
        self.default_miter_limit = limit.max(Self::MINIMUM_MITER_LIMIT);
        self
    }

    #[inline]
    pub const fn with_max_rail_depth(mut self, depth: u32) -> Self {
        self.max_rail_depth = depth;
        self
    }

    /// How to prepare a center-line for these options.
    ///
    /// Curves are split in flat pieces up front, only their rails depend on
    /// the thickness.
    #[inline]
    pub const fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions::DEFAULT
            .with_flattening(Some(self.flattening))
            .with_force_close(false)
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the fill tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FillOptions {
    /// Set the fill rule.
    ///
    /// See the [SVG specification](https://www.w3.org/TR/SVG/painting.html#FillRuleProperty).
    ///
    /// Default value: `EvenOdd`.
    pub fill_rule: FillRule,

    /// How curves are approximated.
    ///
    /// Default value: `FlatteningOptions::DEFAULT`.
    pub flattening: FlatteningOptions,

    /// Emit one curve triangle per curve, to be shaded analytically, instead
    /// of flattening it.
    ///
    /// Default value: `false`.
    pub analytic_curves: bool,

    /// Close open contours with a line back to their start.
    ///
    /// Default value: `true`.
    pub force_close: bool,
}

impl FillOptions {
    /// Default Fill rule.
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::EvenOdd;

    pub const DEFAULT: Self = FillOptions {
        fill_rule: Self::DEFAULT_FILL_RULE,
        flattening: FlatteningOptions::DEFAULT,
        analytic_curves: false,
        force_close: true,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub const fn with_flattening(mut self, flattening: FlatteningOptions) -> Self {
        self.flattening = flattening;
        self
    }

    #[inline]
    pub const fn with_analytic_curves(mut self, analytic: bool) -> Self {
        self.analytic_curves = analytic;
        self
    }

    #[inline]
    pub const fn with_force_close(mut self, force_close: bool) -> Self {
        self.force_close = force_close;
        self
    }

    /// How to prepare a path for these options.
    ///
    /// Curves are kept whole, the fill decides how to approximate each of
    /// them depending on its side.
    #[inline]
    pub const fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions::DEFAULT
            .with_flattening(None)
            .with_force_close(self.force_close)
    }

    /// The vertex layout matching these options.
    #[inline]
    pub fn vertex_layout(&self) -> VertexLayout {
        if self.analytic_curves {
            VertexLayout::PositionAndKind
        } else {
            VertexLayout::Position
        }
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn join_band() {
    let band = JoinAngleBand::DEFAULT;
    assert!(band.is_straight(0.0));
    assert!(band.is_straight(10.0));
    assert!(!band.is_straight(45.0));
    assert!(band.is_straight(180.0));
    assert!(!band.is_straight(270.0));
    assert!(band.is_straight(355.0));

    assert!(!JoinAngleBand::NONE.is_straight(0.5));
    assert!(!JoinAngleBand::NONE.is_straight(180.0));
}

#[test]
fn options_builders() {
    let options = FillOptions::non_zero().with_analytic_curves(true);
    assert_eq!(options.fill_rule, FillRule::NonZero);
    assert_eq!(options.vertex_layout(), VertexLayout::PositionAndKind);

    let stroke = StrokeOptions::DEFAULT.with_default_miter_limit(0.5);
    assert_eq!(stroke.default_miter_limit, StrokeOptions::MINIMUM_MITER_LIMIT);
    assert_eq!(StrokeOptions::DEFAULT.default_miter_limit, 3.0);

    assert_eq!(options.prepare_options().flattening, None);
    assert!(options.prepare_options().force_close);
    assert!(!FillOptions::DEFAULT.with_force_close(false).prepare_options().force_close);
    assert_eq!(
        StrokeOptions::DEFAULT.prepare_options().flattening,
        Some(FlatteningOptions::DEFAULT)
    );
    assert!(!StrokeOptions::DEFAULT.prepare_options().force_close);
}
