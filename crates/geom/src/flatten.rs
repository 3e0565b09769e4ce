//! Recursive subdivision of quadratic bézier curves.
//!
//! The flattener does not use a distance tolerance. A piece of curve is considered
//! flat enough when any of the following holds:
//!
//! - the turn between `from → ctrl` and `ctrl → to` is at most `min_angle_degrees`,
//! - the squared chord length is below `min_square_length`,
//! - the recursion reached `max_depth`.
//!
//! Otherwise the piece is split at t = 0.5 and both halves are processed in order.

use crate::scalar::Scalar;
use crate::utils::turn_angle_degrees;
use crate::{Point, QuadraticBezierSegment, Triangle};

/// Parameters of the curve flattener.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FlatteningOptions {
    /// A piece of curve turning by at most this many degrees is flat.
    ///
    /// Default value: `FlatteningOptions::DEFAULT_MIN_ANGLE_DEGREES`.
    pub min_angle_degrees: f32,

    /// A piece of curve with a squared chord length below this value is flat.
    ///
    /// Default value: `FlatteningOptions::DEFAULT_MIN_SQUARE_LENGTH`.
    pub min_square_length: f32,

    /// Maximum number of times a curve gets split.
    ///
    /// Default value: `FlatteningOptions::DEFAULT_MAX_DEPTH`.
    pub max_depth: u32,
}

impl FlatteningOptions {
    pub const DEFAULT_MIN_ANGLE_DEGREES: f32 = 1.0;
    pub const DEFAULT_MIN_SQUARE_LENGTH: f32 = 1.0;
    pub const DEFAULT_MAX_DEPTH: u32 = 6;

    pub const DEFAULT: Self = FlatteningOptions {
        min_angle_degrees: Self::DEFAULT_MIN_ANGLE_DEGREES,
        min_square_length: Self::DEFAULT_MIN_SQUARE_LENGTH,
        max_depth: Self::DEFAULT_MAX_DEPTH,
    };

    #[inline]
    pub fn min_angle_degrees(degrees: f32) -> Self {
        Self::DEFAULT.with_min_angle_degrees(degrees)
    }

    #[inline]
    pub const fn with_min_angle_degrees(mut self, degrees: f32) -> Self {
        self.min_angle_degrees = degrees;
        self
    }

    #[inline]
    pub const fn with_min_square_length(mut self, square_length: f32) -> Self {
        self.min_square_length = square_length;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Returns whether this piece of curve at this recursion depth should
    /// be approximated as is.
    pub fn is_flat_enough<S: Scalar>(&self, curve: &QuadraticBezierSegment<S>, depth: u32) -> bool {
        if depth >= self.max_depth {
            return true;
        }

        if (curve.to - curve.from).square_length() < S::value(self.min_square_length) {
            return true;
        }

        let turn = turn_angle_degrees(curve.ctrl - curve.from, curve.to - curve.ctrl);

        S::abs(turn) <= S::value(self.min_angle_degrees)
    }
}

impl Default for FlatteningOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Approximates a curve with line segments.
///
/// The end point of each segment is pushed to `output`. The start of the
/// curve is not, so the output can directly extend a polyline that already
/// ends at `curve.from`.
pub fn flatten_quadratic<S: Scalar>(
    curve: &QuadraticBezierSegment<S>,
    options: &FlatteningOptions,
    output: &mut Vec<Point<S>>,
) {
    curve.for_each_subdivided(
        &|piece, depth| options.is_flat_enough(piece, depth),
        &mut |piece, _| {
            output.push(piece.to);
        },
    );
}

/// Tiles the area between a curve and its chord with triangles.
///
/// Each subdivision step, leaves included, produces the triangle made of the
/// start, the on-curve midpoint and the end of the current piece. Children
/// share edges with their parent so the tiling has no gap, down to the
/// segments between leaf midpoints and end points.
///
/// `output` receives the on-curve midpoint and end point of each leaf, i.e.
/// the outer boundary of the tiled area, without `curve.from`.
pub fn flatten_quadratic_filled<S: Scalar>(
    curve: &QuadraticBezierSegment<S>,
    options: &FlatteningOptions,
    output: &mut Vec<Point<S>>,
    triangles: &mut Vec<Triangle<S>>,
) {
    fill_step(curve, 0, options, output, triangles);
}

fn fill_step<S: Scalar>(
    curve: &QuadraticBezierSegment<S>,
    depth: u32,
    options: &FlatteningOptions,
    output: &mut Vec<Point<S>>,
    triangles: &mut Vec<Triangle<S>>,
) {
    let mid = curve.sample(S::HALF);
    let tile = Triangle {
        a: curve.from,
        b: mid,
        c: curve.to,
    };
    if !tile.is_degenerate() {
        triangles.push(tile);
    }

    if options.is_flat_enough(curve, depth) {
        output.push(mid);
        output.push(curve.to);
        return;
    }

    let (first, second) = curve.split(S::HALF);
    fill_step(&first, depth + 1, options, output, triangles);
    fill_step(&second, depth + 1, options, output, triangles);
}

#[cfg(test)]
use crate::point;

#[test]
fn straight_curve_is_one_segment() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 0.0),
        to: point(10.0, 0.0),
    };

    let mut points = Vec::new();
    flatten_quadratic(&curve, &FlatteningOptions::DEFAULT, &mut points);
    assert_eq!(points, vec![point(10.0, 0.0)]);
}

#[test]
fn tight_curve_is_subdivided() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(50.0, 100.0),
        to: point(100.0, 0.0),
    };

    let mut points = Vec::new();
    flatten_quadratic(&curve, &FlatteningOptions::DEFAULT, &mut points);
    assert!(points.len() > 8);
    assert!(points.len() <= 1 << FlatteningOptions::DEFAULT_MAX_DEPTH);
    assert_eq!(points.last(), Some(&curve.to));

    // All points are on the curve's side of the chord.
    for p in &points {
        assert!(p.y >= 0.0);
    }
}

#[test]
fn max_depth_bounds_the_output() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(500.0, 1000.0),
        to: point(1000.0, 0.0),
    };

    for depth in 0..5 {
        let options = FlatteningOptions::DEFAULT
            .with_max_depth(depth)
            .with_min_angle_degrees(0.0);
        let mut points = Vec::new();
        flatten_quadratic(&curve, &options, &mut points);
        assert_eq!(points.len(), 1 << depth);
    }
}

#[test]
fn short_curves_are_not_split() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(0.5, 0.5),
        to: point(0.9, 0.0),
    };

    let mut points = Vec::new();
    flatten_quadratic(&curve, &FlatteningOptions::DEFAULT, &mut points);
    assert_eq!(points.len(), 1);
}

#[test]
fn flattening_is_deterministic() {
    let curve = QuadraticBezierSegment {
        from: point(3.0f32, 7.0),
        ctrl: point(-40.0, 25.0),
        to: point(60.0, 90.0),
    };

    let mut a = Vec::new();
    let mut b = Vec::new();
    flatten_quadratic(&curve, &FlatteningOptions::DEFAULT, &mut a);
    flatten_quadratic(&curve, &FlatteningOptions::DEFAULT, &mut b);
    assert_eq!(a, b);
}

#[test]
fn filled_tiles_cover_the_curve_area() {
    use crate::utils::signed_area;

    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(50.0, 100.0),
        to: point(100.0, 0.0),
    };

    for depth in 0..5 {
        let options = FlatteningOptions::DEFAULT.with_max_depth(depth);
        let mut outline = vec![curve.from];
        let mut tiles = Vec::new();
        flatten_quadratic_filled(&curve, &options, &mut outline, &mut tiles);

        assert_eq!(outline.len(), 1 + (2 << depth));
        assert_eq!(outline.last(), Some(&curve.to));

        let tiled: f32 = tiles.iter().map(|t| t.area()).sum();
        let expected = signed_area(&outline).abs();
        assert!(
            (tiled - expected).abs() < expected * 0.0001,
            "{} != {}",
            tiled,
            expected
        );
    }
}
