//! Stroke tessellation.
//!
//! ## Overview
//!
//! The stroke tessellator outlines the center-line of a line style. Each
//! edge produces a ribbon between two *rails*, offset by half the line
//! thickness on each side of the edge. Consecutive ribbons are connected
//! with a joint, the ends of open sub-paths get caps and the first vertex of
//! a closed sub-path is joined like any other vertex.
//!
//! ### Half thickness
//!
//! The half thickness depends on the [scale mode](../path/style/enum.ScaleMode.html)
//! of the style and on the pixel scale, the size of one screen pixel in the
//! units of the path. See [`resolve_half_thickness`](fn.resolve_half_thickness.html).
//!
//! ### Joints
//!
//! Joints with a turn angle inside the [band](../struct.JoinAngleBand.html)
//! of nearly straight (or nearly reversed) directions get no geometry, the
//! rails just meet. Otherwise the gap on the outer side of the turn is
//! filled according to the joint style:
//!
//! - `Miter` extends both outer rails to their intersection. When the
//!   intersection is farther than `miter_limit * half_thickness` from the
//!   vertex, both rails are cut at that distance instead.
//! - `Bevel` connects the ends of the two outer rails.
//! - `Round` fills the gap with a circular fan.
//!
//! ### Curves
//!
//! Curves of the center-line are split into flat enough pieces when the
//! path is prepared, so tangents are continuous from one piece to the next
//! and their joints fall in the straight band. The rails of a piece are
//! quadratic curves fitted through the offset start, end and midpoint of it.
//! When the two rails cross each other the piece is split in two and the
//! rails of each half are fitted again. See [`curve_rails`](fn.curve_rails.html).
//!
//! ## Examples
//!
//! ```
//! use shapemesh_tessellation::*;
//! use shapemesh_tessellation::math::point;
//! use shapemesh_tessellation::path::{Color, Path, StrokeStyle};
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.curve_to(point(15.0, 0.0), point(15.0, 5.0));
//! let path = builder.build();
//!
//! let style = StrokeStyle::new(2.0, Color::BLACK).with_joint(LineJoin::Bevel);
//!
//! let mut buffer = VertexBuffer::new(VertexLayout::Position);
//! let mut tessellator = StrokeTessellator::new();
//! tessellator
//!     .tessellate_path(&path, &style, 1.0, &StrokeOptions::default(), &mut buffer)
//!     .unwrap();
//!
//! assert!(buffer.triangle_count() > 4);
//! ```

use crate::error::{check_positions, TessellationError, TessellationResult, UnsupportedParameter};
use crate::geom::arrayvec::ArrayVec;
use crate::geom::utils::directed_angle;
use crate::geom::QuadraticBezierSegment;
use crate::geometry_builder::{GeometryBuilder, TriangleKind};
use crate::math::*;
use crate::math_utils::{compute_normal, normal, orientation, rotate};
use crate::path::{
    Edge, FlattenedPath, LineCap, LineJoin, Path, PathEvent, ScaleMode, StrokeStyle,
};
use crate::StrokeOptions;

use std::f32::consts::PI;

// Below this squared length an edge has no direction.
const MIN_SQUARE_LENGTH: f32 = 1e-8;

/// Half of the line thickness of a style, in the units of the path.
///
/// `pixel_scale` is the size of a screen pixel in path units, half a pixel
/// being the thinnest visible half thickness.
///
/// - `Hairline` always uses half a pixel.
/// - `Normal` uses the nominal half thickness but never less than half a pixel.
/// - `None` divides the nominal half thickness by the pixel scale.
/// - `Vertical` and `Horizontal` use the nominal half thickness.
pub fn resolve_half_thickness(style: &StrokeStyle, pixel_scale: f32) -> f32 {
    let half_pixel = 0.5 / pixel_scale;
    let nominal = style.thickness * 0.5;
    match style.scale_mode {
        ScaleMode::Hairline => half_pixel,
        ScaleMode::Normal => nominal.max(half_pixel),
        ScaleMode::None => nominal / pixel_scale,
        ScaleMode::Vertical | ScaleMode::Horizontal => nominal,
    }
}

/// The two rails of a piece of curve.
///
/// `left` is on the side of the normal obtained by rotating the direction of
/// the curve by +90°, `right` on the other side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RailPiece {
    pub center: QuadraticBezierSegment<f32>,
    pub left: QuadraticBezierSegment<f32>,
    pub right: QuadraticBezierSegment<f32>,
    /// True if the inner rail was collapsed to a single pivot point because
    /// the rails still crossed at the maximum depth.
    pub collapsed: bool,
}

impl RailPiece {
    /// Whether the quad `(left.from, left.to, right.to, right.from)` folds
    /// over itself, i.e. its four corner triangles do not all have the
    /// same orientation.
    pub fn overlaps(&self) -> bool {
        rails_overlap(&self.left, &self.right)
    }
}

fn rails_overlap(
    left: &QuadraticBezierSegment<f32>,
    right: &QuadraticBezierSegment<f32>,
) -> bool {
    const EPSILON: f32 = 1e-6;

    let corners = [left.from, left.to, right.to, right.from];
    let mut positive = false;
    let mut negative = false;
    for i in 0..4 {
        let o = orientation(corners[i], corners[(i + 1) % 4], corners[(i + 2) % 4]);
        positive |= o > EPSILON;
        negative |= o < -EPSILON;
    }

    positive && negative
}

fn start_direction(curve: &QuadraticBezierSegment<f32>) -> Vector {
    let d = curve.ctrl - curve.from;
    if d.square_length() > MIN_SQUARE_LENGTH {
        d.normalize()
    } else {
        (curve.to - curve.from).normalize()
    }
}

fn end_direction(curve: &QuadraticBezierSegment<f32>) -> Vector {
    let d = curve.to - curve.ctrl;
    if d.square_length() > MIN_SQUARE_LENGTH {
        d.normalize()
    } else {
        (curve.to - curve.from).normalize()
    }
}

fn fit_rails(
    center: &QuadraticBezierSegment<f32>,
    half_width: f32,
) -> (QuadraticBezierSegment<f32>, QuadraticBezierSegment<f32>) {
    let n0 = normal(start_direction(center)) * half_width;
    let n1 = normal(end_direction(center)) * half_width;
    let mid_tangent = center.derivative(0.5);
    let n_mid = if mid_tangent.square_length() > MIN_SQUARE_LENGTH {
        normal(mid_tangent.normalize()) * half_width
    } else {
        n0
    };
    let mid = center.sample(0.5);

    let left = QuadraticBezierSegment::through_points(center.from + n0, mid + n_mid, center.to + n1);
    let right = QuadraticBezierSegment::through_points(center.from - n0, mid - n_mid, center.to - n1);

    (left, right)
}

/// Computes the rails of a curve.
///
/// The rails are fitted as quadratic curves through the offset start, end
/// and midpoint of the curve, using the tangents of the curve at these
/// points. When the two rails cross, the curve is split at t=0.5 and the
/// rails of both halves are fitted again, down to `max_depth` bisections.
/// A piece whose rails still cross at that depth has its inner rail
/// collapsed to a single pivot point.
///
/// The pieces are pushed to `output` in curve order.
pub fn curve_rails(
    curve: &QuadraticBezierSegment<f32>,
    half_width: f32,
    max_depth: u32,
    output: &mut Vec<RailPiece>,
) {
    rails_step(curve, half_width, 0, max_depth, output);
}

fn rails_step(
    center: &QuadraticBezierSegment<f32>,
    half_width: f32,
    depth: u32,
    max_depth: u32,
    output: &mut Vec<RailPiece>,
) {
    let (left, right) = fit_rails(center, half_width);
    let overlaps = rails_overlap(&left, &right);

    if !overlaps {
        output.push(RailPiece {
            center: *center,
            left,
            right,
            collapsed: false,
        });
        return;
    }

    if depth < max_depth {
        let (first, second) = center.split(0.5);
        rails_step(&first, half_width, depth + 1, max_depth, output);
        rails_step(&second, half_width, depth + 1, max_depth, output);
        return;
    }

    // The inner rail is on the side the curve turns to.
    let turn = (center.ctrl - center.from).cross(center.to - center.ctrl);
    let (left, right) = if turn > 0.0 {
        (collapse(&left), right)
    } else {
        (left, collapse(&right))
    };

    output.push(RailPiece {
        center: *center,
        left,
        right,
        collapsed: true,
    });
}

fn collapse(rail: &QuadraticBezierSegment<f32>) -> QuadraticBezierSegment<f32> {
    let pivot = rail.from.lerp(rail.to, 0.5);
    QuadraticBezierSegment {
        from: pivot,
        ctrl: pivot,
        to: pivot,
    }
}

fn edge_start_direction(edge: &Edge) -> Vector {
    match edge {
        Edge::Line(line) => line.to_vector().normalize(),
        Edge::Curve(curve) => start_direction(curve),
    }
}

fn edge_end_direction(edge: &Edge) -> Vector {
    match edge {
        Edge::Line(line) => line.to_vector().normalize(),
        Edge::Curve(curve) => end_direction(curve),
    }
}

/// A stroke tessellator for paths made of line segments and quadratic curves.
///
/// The tessellator keeps its scratch buffers between calls so that it can be
/// reused without allocating.
#[derive(Default)]
pub struct StrokeTessellator {
    pieces: Vec<RailPiece>,
}

impl StrokeTessellator {
    pub fn new() -> Self {
        StrokeTessellator { pieces: Vec::new() }
    }

    /// Compute the tessellation from a path.
    pub fn tessellate_path(
        &mut self,
        path: &Path,
        style: &StrokeStyle,
        pixel_scale: f32,
        options: &StrokeOptions,
        output: &mut dyn GeometryBuilder,
    ) -> TessellationResult {
        let flattened = path.prepare(&options.prepare_options());
        self.tessellate_flattened(&flattened, style, pixel_scale, options, output)
    }

    /// Compute the tessellation from path events.
    pub fn tessellate<I>(
        &mut self,
        events: I,
        style: &StrokeStyle,
        pixel_scale: f32,
        options: &StrokeOptions,
        output: &mut dyn GeometryBuilder,
    ) -> TessellationResult
    where
        I: IntoIterator<Item = PathEvent>,
    {
        let flattened = FlattenedPath::from_events(events, &options.prepare_options());
        self.tessellate_flattened(&flattened, style, pixel_scale, options, output)
    }

    /// Compute the tessellation from a center-line prepared with
    /// [`StrokeOptions::prepare_options`](../struct.StrokeOptions.html#method.prepare_options).
    ///
    /// The same prepared path can be outlined again with another style or
    /// pixel scale.
    pub fn tessellate_flattened(
        &mut self,
        path: &FlattenedPath,
        style: &StrokeStyle,
        pixel_scale: f32,
        options: &StrokeOptions,
        output: &mut dyn GeometryBuilder,
    ) -> TessellationResult {
        if style.thickness.is_nan() {
            return Err(UnsupportedParameter::ThicknessIsNaN.into());
        }
        if !(pixel_scale > 0.0) {
            return Err(UnsupportedParameter::PixelScaleIsNotPositive.into());
        }
        check_positions(path)?;

        output.begin_geometry();

        let draws_nothing = style.thickness <= 0.0 && style.scale_mode != ScaleMode::Hairline;
        let half_width = resolve_half_thickness(style, pixel_scale);
        if draws_nothing || !(half_width > 0.0) {
            return Ok(output.end_geometry());
        }

        let mut builder = StrokeBuilder {
            output,
            options,
            half_width,
            joint: style.joint,
            cap: style.cap,
            miter_limit: style
                .miter_limit
                .unwrap_or(options.default_miter_limit)
                .max(StrokeOptions::MINIMUM_MITER_LIMIT),
            pieces: &mut self.pieces,
        };

        let result = path
            .sub_paths
            .iter()
            .try_for_each(|sub_path| builder.sub_path(&sub_path.edges, sub_path.closed));

        match result {
            Ok(()) => Ok(builder.output.end_geometry()),
            Err(e) => {
                builder.output.abort_geometry();
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for StrokeTessellator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeTessellator").finish()
    }
}

struct StrokeBuilder<'l> {
    output: &'l mut dyn GeometryBuilder,
    options: &'l StrokeOptions,
    half_width: f32,
    joint: LineJoin,
    cap: LineCap,
    miter_limit: f32,
    pieces: &'l mut Vec<RailPiece>,
}

impl<'l> StrokeBuilder<'l> {
    fn sub_path(&mut self, edges: &[Edge], closed: bool) -> Result<(), TessellationError> {
        let (first, last) = match (edges.first(), edges.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Ok(()),
        };

        for (i, edge) in edges.iter().enumerate() {
            self.edge(edge)?;
            if let Some(next) = edges.get(i + 1) {
                self.joint(edge.end(), edge_end_direction(edge), edge_start_direction(next))?;
            }
        }

        if closed && edges.len() > 1 {
            self.joint(first.start(), edge_end_direction(&last), edge_start_direction(&first))?;
        } else {
            self.cap(first.start(), -edge_start_direction(&first))?;
            self.cap(last.end(), edge_end_direction(&last))?;
        }

        Ok(())
    }

    fn edge(&mut self, edge: &Edge) -> Result<(), TessellationError> {
        match edge {
            Edge::Line(line) => {
                let n = normal(line.to_vector().normalize()) * self.half_width;
                self.quad(line.from + n, line.to + n, line.to - n, line.from - n)
            }
            Edge::Curve(curve) => {
                self.pieces.clear();
                curve_rails(curve, self.half_width, self.options.max_rail_depth, self.pieces);
                for i in 0..self.pieces.len() {
                    let piece = self.pieces[i];
                    self.ribbon(&piece.left, &piece.right, 0)?;
                }

                Ok(())
            }
        }
    }

    // Flattens both rails in lock-step and fills the space between them.
    fn ribbon(
        &mut self,
        left: &QuadraticBezierSegment<f32>,
        right: &QuadraticBezierSegment<f32>,
        depth: u32,
    ) -> Result<(), TessellationError> {
        let flattening = &self.options.flattening;
        if flattening.is_flat_enough(left, depth) && flattening.is_flat_enough(right, depth) {
            return self.quad(left.from, left.to, right.to, right.from);
        }

        let (left_a, left_b) = left.split(0.5);
        let (right_a, right_b) = right.split(0.5);
        self.ribbon(&left_a, &right_a, depth + 1)?;
        self.ribbon(&left_b, &right_b, depth + 1)
    }

    fn joint(&mut self, at: Point, incoming: Vector, outgoing: Vector) -> Result<(), TessellationError> {
        let turn = directed_angle(incoming, outgoing).to_degrees();
        if self.options.join_band.is_straight(turn) {
            return Ok(());
        }

        // The gap to fill is on the outer side of the turn.
        let side = if incoming.cross(outgoing) > 0.0 { -1.0 } else { 1.0 };
        let a = at + normal(incoming) * (side * self.half_width);
        let b = at + normal(outgoing) * (side * self.half_width);

        // Outer boundary of the joint, fanned from the vertex.
        let mut outline: ArrayVec<Point, 4> = ArrayVec::new();
        outline.push(a);

        match self.joint {
            LineJoin::Bevel => {}
            LineJoin::Round => {
                let sweep = (a - at).angle_to(b - at).radians;
                return self.fan(at, a, sweep, self.options.round_join_step_degrees);
            }
            LineJoin::Miter => {
                let miter = compute_normal(incoming, outgoing);
                let ratio = miter.length();
                if ratio > 0.0 && ratio <= self.miter_limit {
                    outline.push(at + miter * (side * self.half_width));
                } else if ratio > 0.0 {
                    // Cut both outer rails where they are miter_limit * half_width
                    // away from the vertex.
                    let extension =
                        self.half_width * (self.miter_limit * self.miter_limit - 1.0).max(0.0).sqrt();
                    outline.push(a + incoming * extension);
                    outline.push(b - outgoing * extension);
                }
            }
        }

        outline.push(b);
        for edge in outline.windows(2) {
            self.triangle(at, edge[0], edge[1])?;
        }

        Ok(())
    }

    fn cap(&mut self, at: Point, direction: Vector) -> Result<(), TessellationError> {
        let n = normal(direction) * self.half_width;
        let left = at + n;
        let right = at - n;

        match self.cap {
            LineCap::None => Ok(()),
            LineCap::Square => {
                let extension = direction * self.half_width;
                self.quad(left, left + extension, right + extension, right)
            }
            LineCap::Round => self.fan(at, left, -PI, self.options.round_cap_step_degrees),
        }
    }

    /// A circular fan around `center`, starting at `from` and rotating by
    /// `sweep` radians.
    fn fan(&mut self, center: Point, from: Point, sweep: f32, step_degrees: f32) -> Result<(), TessellationError> {
        let step = step_degrees.max(0.1).to_radians();
        let count = (sweep.abs() / step - 1e-3).ceil().max(1.0) as u32;
        let radius = from - center;

        let mut prev = from;
        for i in 1..=count {
            let p = center + rotate(radius, sweep * i as f32 / count as f32);
            self.triangle(center, prev, p)?;
            prev = p;
        }

        Ok(())
    }

    fn quad(&mut self, a: Point, b: Point, c: Point, d: Point) -> Result<(), TessellationError> {
        self.triangle(a, b, c)?;
        self.triangle(a, c, d)
    }

    fn triangle(&mut self, a: Point, b: Point, c: Point) -> Result<(), TessellationError> {
        let o = orientation(a, b, c);
        if o.abs() <= MIN_SQUARE_LENGTH {
            return Ok(());
        }

        if o > 0.0 {
            self.output.add_triangle(a, b, c, TriangleKind::Solid)?;
        } else {
            self.output.add_triangle(a, c, b, TriangleKind::Solid)?;
        }

        Ok(())
    }
}

#[cfg(test)]
use crate::geometry_builder::{VertexBuffer, VertexLayout};
#[cfg(test)]
use crate::path::Color;
#[cfg(test)]
use crate::JoinAngleBand;

#[cfg(test)]
fn polyline(points: &[(f32, f32)]) -> Path {
    let mut builder = Path::builder();
    builder.move_to(point(points[0].0, points[0].1));
    for p in &points[1..] {
        builder.line_to(point(p.0, p.1));
    }
    builder.build()
}

#[cfg(test)]
fn stroke(path: &Path, style: &StrokeStyle, options: &StrokeOptions) -> VertexBuffer {
    let mut buffer = VertexBuffer::new(VertexLayout::Position);
    StrokeTessellator::new()
        .tessellate_path(path, style, 1.0, options, &mut buffer)
        .unwrap();
    buffer
}

#[cfg(test)]
fn assert_box(buffer: &VertexBuffer, min: (f32, f32), max: (f32, f32)) {
    let bb = buffer.bounding_box().unwrap();
    let eps = 0.001;
    if (bb.min.x - min.0).abs() > eps
        || (bb.min.y - min.1).abs() > eps
        || (bb.max.x - max.0).abs() > eps
        || (bb.max.y - max.1).abs() > eps
    {
        panic!("unexpected bounding box {:?}, expected {:?} {:?}", bb, min, max);
    }
}

#[test]
fn line_without_caps() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK).with_cap(LineCap::None);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    assert_eq!(buffer.triangle_count(), 2);
    assert_box(&buffer, (0.0, -1.0), (10.0, 1.0));
    assert_eq!(buffer.area(), 20.0);
}

#[test]
fn square_caps() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK).with_cap(LineCap::Square);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    assert_eq!(buffer.triangle_count(), 6);
    assert_box(&buffer, (-1.0, -1.0), (11.0, 1.0));
}

#[test]
fn round_caps() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK).with_cap(LineCap::Round);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    // 90 triangles per half circle with the default 2° step.
    assert_eq!(buffer.triangle_count(), 2 + 90 * 2);
    assert_box(&buffer, (-1.0, -1.0), (11.0, 1.0));
    for p in buffer.positions() {
        let closest = point(p.x.max(0.0).min(10.0), 0.0);
        assert!((p - closest).length() <= 1.0001);
    }
}

#[test]
fn closed_square_with_miter_joints() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK)
        .with_joint(LineJoin::Miter)
        .with_cap(LineCap::Square);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    // No caps on closed sub-paths, two triangles per edge and per joint.
    assert_eq!(buffer.triangle_count(), 16);
    assert_box(&buffer, (-1.0, -1.0), (11.0, 11.0));
    // Four 10x2 ribbons overlapping at the inner corners, plus the miters.
    assert!((buffer.area() - 84.0).abs() < 0.001);
    assert!(buffer
        .positions()
        .any(|p| (p - point(11.0, -1.0)).length() < 0.0001));
}

#[test]
fn bevel_joint() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK)
        .with_joint(LineJoin::Bevel)
        .with_cap(LineCap::None);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    assert_eq!(buffer.triangle_count(), 5);
    assert!(!buffer
        .positions()
        .any(|p| (p - point(11.0, -1.0)).length() < 0.1));
    assert_box(&buffer, (0.0, -1.0), (11.0, 10.0));
}

#[test]
fn round_joint_stays_on_the_circle() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let style = StrokeStyle::new(2.0, Color::BLACK)
        .with_joint(LineJoin::Round)
        .with_cap(LineCap::None);
    let buffer = stroke(&path, &style, &StrokeOptions::default());

    // 90° with the default 5° step.
    assert_eq!(buffer.triangle_count(), 4 + 18);
    let joint = point(10.0, 0.0);
    for [a, b, c] in buffer.triangles().skip(2).take(18) {
        assert_eq!(a, joint);
        assert!(((b - joint).length() - 1.0).abs() < 0.0001);
        assert!(((c - joint).length() - 1.0).abs() < 0.0001);
    }
}

#[test]
fn miter_limit_cuts_the_joint() {
    // A turn whose miter is three times the half thickness away.
    let interior = 2.0 * (1.0f32 / 3.0).asin();
    let turn = PI - interior;
    let length = 1.5;
    let out = rotate(vector(1.0, 0.0), turn) * length;
    let path = polyline(&[(-length, 0.0), (0.0, 0.0), (out.x, out.y)]);

    let limited = StrokeStyle::new(2.0, Color::BLACK)
        .with_joint(LineJoin::Miter)
        .with_cap(LineCap::None)
        .with_miter_limit(2.0);
    let buffer = stroke(&path, &limited, &StrokeOptions::default());
    let farthest = buffer
        .positions()
        .map(|p| p.to_vector().length())
        .fold(0.0f32, f32::max);
    assert!(farthest <= 2.0 + 0.0001, "{}", farthest);

    let unlimited = limited.clone().with_miter_limit(4.0);
    let buffer = stroke(&path, &unlimited, &StrokeOptions::default());
    let farthest = buffer
        .positions()
        .map(|p| p.to_vector().length())
        .fold(0.0f32, f32::max);
    assert!((farthest - 3.0).abs() < 0.001, "{}", farthest);
}

#[test]
fn nearly_straight_joints_have_no_geometry() {
    let out = rotate(vector(10.0, 0.0), 5.0f32.to_radians());
    let path = polyline(&[(-10.0, 0.0), (0.0, 0.0), (out.x, out.y)]);
    let style = StrokeStyle::new(2.0, Color::BLACK)
        .with_joint(LineJoin::Round)
        .with_cap(LineCap::None);

    let buffer = stroke(&path, &style, &StrokeOptions::default());
    assert_eq!(buffer.triangle_count(), 4);

    let options = StrokeOptions::default().with_join_band(JoinAngleBand::NONE);
    let buffer = stroke(&path, &style, &options);
    assert_eq!(buffer.triangle_count(), 5);
}

#[test]
fn scale_modes() {
    let style = StrokeStyle::new(4.0, Color::BLACK);
    assert_eq!(resolve_half_thickness(&style, 1.0), 2.0);
    assert_eq!(resolve_half_thickness(&style, 0.125), 4.0);

    let thin = StrokeStyle::new(0.2, Color::BLACK);
    assert_eq!(resolve_half_thickness(&thin, 1.0), 0.5);

    let hairline = style.clone().with_scale_mode(ScaleMode::Hairline);
    assert_eq!(resolve_half_thickness(&hairline, 2.0), 0.25);

    let unscaled = style.clone().with_scale_mode(ScaleMode::None);
    assert_eq!(resolve_half_thickness(&unscaled, 2.0), 1.0);

    let vertical = style.with_scale_mode(ScaleMode::Vertical);
    assert_eq!(resolve_half_thickness(&vertical, 0.125), 2.0);
}

#[test]
fn zero_thickness_draws_nothing() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
    let style = StrokeStyle::new(0.0, Color::BLACK);
    let buffer = stroke(&path, &style, &StrokeOptions::default());
    assert!(buffer.is_empty());

    let hairline = style.with_scale_mode(ScaleMode::Hairline);
    let buffer = stroke(&path, &hairline, &StrokeOptions::default());
    assert!(!buffer.is_empty());
}

#[test]
fn invalid_parameters() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
    let mut buffer = VertexBuffer::new(VertexLayout::Position);
    let mut tessellator = StrokeTessellator::new();
    let options = StrokeOptions::default();

    let style = StrokeStyle::new(f32::NAN, Color::BLACK);
    assert_eq!(
        tessellator.tessellate_path(&path, &style, 1.0, &options, &mut buffer),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::ThicknessIsNaN
        ))
    );

    let style = StrokeStyle::new(1.0, Color::BLACK);
    assert_eq!(
        tessellator.tessellate_path(&path, &style, 0.0, &options, &mut buffer),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::PixelScaleIsNotPositive
        ))
    );
    assert!(buffer.is_empty());
}

#[test]
fn tight_curve_rails_do_not_cross() {
    // Turns by almost 180° with a radius of curvature of 0.1 at the apex.
    let curve = QuadraticBezierSegment {
        from: point(0.0, -1.0),
        ctrl: point(10.0, 0.0),
        to: point(0.0, 1.0),
    };

    let (left, right) = fit_rails(&curve, 5.0);
    assert!(rails_overlap(&left, &right));

    let mut pieces = Vec::new();
    curve_rails(&curve, 5.0, StrokeOptions::DEFAULT_MAX_RAIL_DEPTH, &mut pieces);

    assert!(pieces.len() > 1);
    assert!(pieces.iter().any(|piece| piece.collapsed));
    for piece in &pieces {
        assert!(!piece.overlaps(), "{:?}", piece);
    }
    // The pieces follow each other.
    for pair in pieces.windows(2) {
        assert_eq!(pair[0].center.to, pair[1].center.from);
    }
    assert_eq!(pieces[0].center.from, curve.from);
    assert_eq!(pieces[pieces.len() - 1].center.to, curve.to);
}

#[test]
fn gentle_curve_rails_follow_the_curve() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(50.0, 0.0), point(50.0, 50.0));
    let path = builder.build();

    let style = StrokeStyle::new(4.0, Color::BLACK).with_cap(LineCap::None);
    let buffer = stroke(&path, &style, &StrokeOptions::default());
    assert!(buffer.triangle_count() > 8);

    let curve = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(50.0, 0.0),
        to: point(50.0, 50.0),
    };
    let samples: Vec<Point> = (0..=1000).map(|i| curve.sample(i as f32 / 1000.0)).collect();
    for p in buffer.positions() {
        let distance = samples
            .iter()
            .map(|s| (p - *s).length())
            .fold(f32::INFINITY, f32::min);
        assert!((distance - 2.0).abs() < 0.1, "{:?} is {} away", p, distance);
    }
}

#[test]
fn curve_pieces_are_not_joined() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(50.0, 0.0), point(50.0, 50.0));
    let path = builder.build();

    let flattened = path.prepare(&StrokeOptions::default().prepare_options());
    assert!(flattened.sub_paths[0].edges.len() > 1);

    // Only the joints between pieces could tell the joint styles apart.
    let round = StrokeStyle::new(4.0, Color::BLACK)
        .with_joint(LineJoin::Round)
        .with_cap(LineCap::None);
    let bevel = round.clone().with_joint(LineJoin::Bevel);
    assert_eq!(
        stroke(&path, &round, &StrokeOptions::default()),
        stroke(&path, &bevel, &StrokeOptions::default())
    );
}

#[test]
fn prepared_center_line_is_reused() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(50.0, 0.0), point(50.0, 50.0));
    builder.line_to(point(0.0, 50.0));
    let path = builder.build();

    let options = StrokeOptions::default();
    let flattened = path.prepare(&options.prepare_options());

    let mut tessellator = StrokeTessellator::new();
    for &thickness in &[1.0f32, 4.0] {
        let style = StrokeStyle::new(thickness, Color::BLACK).with_joint(LineJoin::Round);
        let mut reused = VertexBuffer::new(VertexLayout::Position);
        tessellator
            .tessellate_flattened(&flattened, &style, 1.0, &options, &mut reused)
            .unwrap();
        assert_eq!(reused, stroke(&path, &style, &options));
    }
}

#[test]
fn nan_positions_are_rejected() {
    let path = polyline(&[(0.0, 0.0), (f32::NAN, 0.0), (10.0, 10.0)]);
    let style = StrokeStyle::new(1.0, Color::BLACK);
    let mut buffer = VertexBuffer::new(VertexLayout::Position);

    assert_eq!(
        StrokeTessellator::new().tessellate_path(
            &path,
            &style,
            1.0,
            &StrokeOptions::default(),
            &mut buffer
        ),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::PositionIsNaN
        ))
    );
    assert!(buffer.is_empty());
}
