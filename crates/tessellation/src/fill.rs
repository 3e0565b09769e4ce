//! Fill tessellation.
//!
//! ## Overview
//!
//! The fill tessellator turns the closed contours of a fill style into
//! triangles. The polygonal part of the contours is triangulated in a
//! single call to a [`Triangulator`](../oracle/trait.Triangulator.html),
//! and each curve is handled next to it depending on which side it bulges.
//!
//! The side of a curve is decided relative to the winding of the dominant
//! contour, the one with the largest area:
//!
//! - A *convex* curve bulges away from the filled area. The polygon only
//!   follows its chord and the area between the chord and the curve is
//!   added with extra triangles.
//! - A *concave* curve bulges into the filled area. The polygon follows
//!   the curve.
//!
//! With `FillOptions::analytic_curves`, each curve produces a single
//! `(from, ctrl, to)` triangle marked with its
//! [`TriangleKind`](../geometry_builder/enum.TriangleKind.html), to be
//! shaded analytically, and the polygon goes through the control point of
//! concave curves. Otherwise curves are flattened and convex curves are
//! tiled with the triangles produced by
//! [`flatten_quadratic_filled`](../geom/flatten/fn.flatten_quadratic_filled.html).
//!
//! All output triangles have the orientation of the dominant contour, so
//! reversing the input reverses the output vertex order.
//!
//! ## Failures
//!
//! Open contours are closed with a line back to their start, unless
//! `FillOptions::force_close` is false in which case they are ignored.
//! Contours with less than three distinct points are ignored.
//!
//! When the triangulator fails, a warning is logged and the polygonal part
//! of the fill is skipped, while the curve triangles are still produced.
//! The [`FillOutcome`](struct.FillOutcome.html) reports it.
//!
//! ## Examples
//!
//! ```
//! use shapemesh_tessellation::*;
//! use shapemesh_tessellation::math::point;
//! use shapemesh_tessellation::path::Path;
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.curve_to(point(15.0, 5.0), point(10.0, 10.0));
//! builder.line_to(point(0.0, 10.0));
//! builder.line_to(point(0.0, 0.0));
//! let path = builder.build();
//!
//! let options = FillOptions::default().with_analytic_curves(true);
//! let mut buffer = VertexBuffer::new(options.vertex_layout());
//! let mut tessellator = FillTessellator::new();
//! let outcome = tessellator.tessellate_path(&path, &options, &mut buffer).unwrap();
//!
//! assert!(!outcome.oracle_failed);
//! // Two triangles for the square and one for the curve.
//! assert_eq!(outcome.count.triangles, 3);
//! assert_eq!(buffer.triangle_kind(2), TriangleKind::Convex);
//! ```

use crate::error::{check_positions, TessellationError};
use crate::geom::flatten::{flatten_quadratic, flatten_quadratic_filled};
use crate::geom::Triangle;
use crate::geometry_builder::{Count, GeometryBuilder, TriangleKind};
use crate::math::*;
use crate::math_utils::orientation;
use crate::oracle::{EarcutTriangulator, Triangulator};
use crate::path::{
    polygon_points, Edge, FlattenedPath, FlattenedSubPath, Path, PathEvent, Winding,
};
use crate::FillOptions;

/// What happened during a fill tessellation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// The geometry that was produced.
    pub count: Count,
    /// True if the triangulator failed and the polygonal part of the fill
    /// is missing.
    pub oracle_failed: bool,
    /// Number of contours that were ignored because they were open or had
    /// less than three distinct points.
    pub dropped_contours: u32,
}

impl FillOutcome {
    /// True if some of the fill could not be produced.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.oracle_failed
    }
}

/// Signed area enclosed by a closed sub-path, curves included.
fn signed_area(sub_path: &FlattenedSubPath) -> f32 {
    let mut area = 0.0;
    for edge in &sub_path.edges {
        if let Edge::Curve(curve) = edge {
            // Between a quadratic curve and its chord lies two thirds of the
            // (from, ctrl, to) triangle.
            area += orientation(curve.from, curve.ctrl, curve.to) / 3.0;
        }
        let (from, to) = (edge.start(), edge.end());
        area += (from.x * to.y - to.x * from.y) * 0.5;
    }

    area
}

/// A fill tessellator for contours made of line segments and quadratic curves.
///
/// The tessellator keeps its scratch buffers between calls so that it can be
/// reused without allocating.
pub struct FillTessellator {
    triangulator: Box<dyn Triangulator>,
    polygons: Vec<Vec<Point>>,
    curve_triangles: Vec<(Triangle<f32>, TriangleKind)>,
    tiles: Vec<Triangle<f32>>,
    scratch: Vec<Point>,
}

impl FillTessellator {
    /// Constructor using the ear clipping triangulator.
    pub fn new() -> Self {
        FillTessellator::with_triangulator(Box::new(EarcutTriangulator))
    }

    pub fn with_triangulator(triangulator: Box<dyn Triangulator>) -> Self {
        FillTessellator {
            triangulator,
            polygons: Vec::new(),
            curve_triangles: Vec::new(),
            tiles: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn set_triangulator(&mut self, triangulator: Box<dyn Triangulator>) {
        self.triangulator = triangulator;
    }

    /// Compute the tessellation from a path.
    pub fn tessellate_path(
        &mut self,
        path: &Path,
        options: &FillOptions,
        output: &mut dyn GeometryBuilder,
    ) -> Result<FillOutcome, TessellationError> {
        let flattened = path.prepare(&options.prepare_options());
        self.tessellate_flattened(&flattened, options, output)
    }

    /// Compute the tessellation from path events.
    pub fn tessellate<I>(
        &mut self,
        events: I,
        options: &FillOptions,
        output: &mut dyn GeometryBuilder,
    ) -> Result<FillOutcome, TessellationError>
    where
        I: IntoIterator<Item = PathEvent>,
    {
        let flattened = FlattenedPath::from_events(events, &options.prepare_options());
        self.tessellate_flattened(&flattened, options, output)
    }

    /// Compute the tessellation from a path prepared with
    /// [`FillOptions::prepare_options`](../struct.FillOptions.html#method.prepare_options).
    ///
    /// Open sub-paths are ignored.
    pub fn tessellate_flattened(
        &mut self,
        path: &FlattenedPath,
        options: &FillOptions,
        output: &mut dyn GeometryBuilder,
    ) -> Result<FillOutcome, TessellationError> {
        check_positions(path)?;

        let mut outcome = FillOutcome::default();
        output.begin_geometry();
        match self.tessellate_impl(path, options, &mut outcome, output) {
            Ok(()) => {
                outcome.count = output.end_geometry();
                Ok(outcome)
            }
            Err(e) => {
                output.abort_geometry();
                Err(e)
            }
        }
    }

    fn tessellate_impl(
        &mut self,
        path: &FlattenedPath,
        options: &FillOptions,
        outcome: &mut FillOutcome,
        output: &mut dyn GeometryBuilder,
    ) -> Result<(), TessellationError> {
        self.polygons.clear();
        self.curve_triangles.clear();

        let contours = || path.sub_paths.iter().filter(|sub_path| sub_path.closed);
        outcome.dropped_contours += path.sub_paths.len() as u32 - contours().count() as u32;

        let dominant = contours()
            .map(signed_area)
            .fold(0.0f32, |best, area| if area.abs() > best.abs() { area } else { best });

        // A contour crossing itself can enclose area with a zero net signed area.
        let sign = Winding::from_signed_area(dominant)
            .unwrap_or(Winding::Positive)
            .sign();

        for contour in contours() {
            let mut polygon = Vec::with_capacity(contour.edges.len() + 1);
            polygon.push(contour.start);

            for edge in &contour.edges {
                let curve = match *edge {
                    Edge::Line(line) => {
                        polygon.push(line.to);
                        continue;
                    }
                    Edge::Curve(curve) => curve,
                };

                let turn = (curve.ctrl - curve.from).cross(curve.to - curve.ctrl);
                let convex = turn * sign > 0.0;

                let bounding_triangle = curve.bounding_triangle();

                match (options.analytic_curves, convex) {
                    (true, true) => {
                        self.curve_triangles
                            .push((bounding_triangle, TriangleKind::Convex));
                        polygon.push(curve.to);
                    }
                    (true, false) => {
                        self.curve_triangles
                            .push((bounding_triangle, TriangleKind::Concave));
                        polygon.push(curve.ctrl);
                        polygon.push(curve.to);
                    }
                    (false, true) => {
                        self.scratch.clear();
                        self.tiles.clear();
                        flatten_quadratic_filled(
                            &curve,
                            &options.flattening,
                            &mut self.scratch,
                            &mut self.tiles,
                        );
                        self.curve_triangles
                            .extend(self.tiles.iter().map(|&tile| (tile, TriangleKind::Solid)));
                        polygon.push(curve.to);
                    }
                    (false, false) => {
                        flatten_quadratic(&curve, &options.flattening, &mut polygon);
                    }
                }
            }

            let polygon = polygon_points(polygon);
            if polygon.len() < 3 {
                outcome.dropped_contours += 1;
                continue;
            }

            self.polygons.push(polygon);
        }

        if !self.polygons.is_empty() {
            match self.triangulator.triangulate(&self.polygons, options.fill_rule) {
                Ok(triangles) => {
                    for [a, b, c] in triangles {
                        add_oriented(output, a, b, c, TriangleKind::Solid, sign)?;
                    }
                }
                Err(e) => {
                    log::warn!(
                        "failed to triangulate a fill ({}), skipping its polygons: {:?}",
                        e,
                        self.polygons
                    );
                    outcome.oracle_failed = true;
                }
            }
        }

        for &(triangle, kind) in &self.curve_triangles {
            add_oriented(output, triangle.a, triangle.b, triangle.c, kind, sign)?;
        }

        Ok(())
    }
}

impl Default for FillTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FillTessellator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillTessellator")
            .field("polygons", &self.polygons.len())
            .finish()
    }
}

/// Adds a triangle with the orientation given by `sign`, swapping its first
/// and last vertices if needed. Swapping the ends of a curve triangle keeps
/// its canonical curve coordinates valid.
fn add_oriented(
    output: &mut dyn GeometryBuilder,
    a: Point,
    b: Point,
    c: Point,
    kind: TriangleKind,
    sign: f32,
) -> Result<(), TessellationError> {
    if orientation(a, b, c) * sign < 0.0 {
        output.add_triangle(c, b, a, kind)?;
    } else {
        output.add_triangle(a, b, c, kind)?;
    }

    Ok(())
}
