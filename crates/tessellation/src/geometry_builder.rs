//! Tools to help with generating vertex buffers.
//!
//! ## Overview
//!
//! The tessellators do not write vertices directly. They hand triangles to a
//! [`GeometryBuilder`](trait.GeometryBuilder.html), which decides how to
//! store them. This is the last step of the tessellation pipeline and a
//! practical place to apply a transform, count primitives or write into a
//! mapped GPU buffer.
//!
//! The output is a triangle list without an index buffer: each triangle
//! carries its three positions and a [`TriangleKind`](enum.TriangleKind.html).
//!
//! The struct [`VertexBuffer`](struct.VertexBuffer.html) implements the
//! trait and packs the triangles in a flat `f32` buffer using one of two
//! [layouts](enum.VertexLayout.html).
//!
//! ## Writing a custom geometry builder
//!
//! ```
//! use shapemesh_tessellation::geometry_builder::*;
//! use shapemesh_tessellation::math::Point;
//! use shapemesh_tessellation::GeometryBuilderError;
//!
//! // A geometry builder that only keeps track of the area it receives.
//! struct Area {
//!     total: f32,
//!     triangles: u32,
//! }
//!
//! impl GeometryBuilder for Area {
//!     fn add_triangle(
//!         &mut self,
//!         a: Point,
//!         b: Point,
//!         c: Point,
//!         _kind: TriangleKind,
//!     ) -> Result<(), GeometryBuilderError> {
//!         self.total += (b - a).cross(c - a).abs() * 0.5;
//!         self.triangles += 1;
//!         Ok(())
//!     }
//!
//!     fn end_geometry(&mut self) -> Count {
//!         Count { vertices: self.triangles * 3, triangles: self.triangles }
//!     }
//! }
//! ```

use crate::error::GeometryBuilderError;
use crate::math::*;

use std::ops::Add;

/// How a triangle is shaded.
///
/// Curve triangles `(from, ctrl, to)` of a quadratic curve are meant to be
/// shaded analytically, with the canonical `(0, 0) (0.5, 0) (1, 1)` curve
/// coordinates on their three vertices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TriangleKind {
    /// A plain triangle, entirely inside the shape.
    Solid,
    /// A curve triangle whose curve bulges outwards. The inside of the curve is filled.
    Convex,
    /// A curve triangle whose curve bulges inwards. The outside of the curve is filled.
    Concave,
}

impl TriangleKind {
    /// The packed third float of the i-th vertex of a triangle of this kind.
    #[inline]
    pub fn marker(self, vertex: usize) -> f32 {
        let magnitude = (vertex + 1) as f32;
        match self {
            TriangleKind::Solid => 0.0,
            TriangleKind::Convex => magnitude,
            TriangleKind::Concave => -magnitude,
        }
    }

    /// Decodes a packed marker.
    pub fn from_marker(marker: f32) -> Self {
        if marker > 0.0 {
            TriangleKind::Convex
        } else if marker < 0.0 {
            TriangleKind::Concave
        } else {
            TriangleKind::Solid
        }
    }

    #[inline]
    pub fn is_curve(self) -> bool {
        self != TriangleKind::Solid
    }
}

/// Number of floats and meaning of each vertex in a [`VertexBuffer`](struct.VertexBuffer.html).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum VertexLayout {
    /// `x, y`.
    Position,
    /// `x, y, marker` where the marker is given by `TriangleKind::marker`.
    PositionAndKind,
}

impl VertexLayout {
    #[inline]
    pub fn floats_per_vertex(self) -> usize {
        match self {
            VertexLayout::Position => 2,
            VertexLayout::PositionAndKind => 3,
        }
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        VertexLayout::Position
    }
}

/// Number of vertices and triangles in a geometry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Count {
    pub vertices: u32,
    pub triangles: u32,
}

impl Add for Count {
    type Output = Count;
    fn add(self, other: Count) -> Count {
        Count {
            vertices: self.vertices + other.vertices,
            triangles: self.triangles + other.triangles,
        }
    }
}

/// An interface separating tessellators and other geometry generation algorithms from the
/// actual vertex construction.
///
/// See the [`geometry_builder`](index.html) module documentation for more detailed explanation.
pub trait GeometryBuilder {
    /// Called at the beginning of a generation.
    ///
    /// end_geometry must be called before begin_geometry is called again.
    fn begin_geometry(&mut self) {}

    /// Called at the end of a generation.
    /// Returns the number of vertices and triangles added since the last time
    /// begin_geometry was called.
    fn end_geometry(&mut self) -> Count;

    /// Insert a triangle made of vertices that were added since the last call to begin_geometry.
    fn add_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        kind: TriangleKind,
    ) -> Result<(), GeometryBuilderError>;

    /// abort_geometry is called instead of end_geometry if an error occurred while producing
    /// the geometry and we won't be able to finish.
    ///
    /// The implementation is expected to discard the geometry that was generated since the last
    /// time begin_geometry was called, and to remain in a usable state.
    fn abort_geometry(&mut self) {}
}

/// A flat triangle-list vertex buffer, ready to be uploaded.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexBuffer {
    pub vertices: Vec<f32>,
    layout: VertexLayout,
    #[cfg_attr(feature = "serialization", serde(skip))]
    geometry_start: usize,
}

impl VertexBuffer {
    pub fn new(layout: VertexLayout) -> Self {
        VertexBuffer::with_capacity(layout, 0)
    }

    pub fn with_capacity(layout: VertexLayout, num_vertices: usize) -> Self {
        VertexBuffer {
            vertices: Vec::with_capacity(num_vertices * layout.floats_per_vertex()),
            layout,
            geometry_start: 0,
        }
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Empties the buffer and changes its layout. The allocation is kept.
    pub fn reset(&mut self, layout: VertexLayout) {
        self.vertices.clear();
        self.layout = layout;
        self.geometry_start = 0;
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.geometry_start = 0;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Position of the i-th vertex.
    pub fn position(&self, index: usize) -> Point {
        let offset = index * self.layout.floats_per_vertex();
        point(self.vertices[offset], self.vertices[offset + 1])
    }

    /// Kind of the i-th triangle. Always `Solid` with `VertexLayout::Position`.
    pub fn triangle_kind(&self, index: usize) -> TriangleKind {
        match self.layout {
            VertexLayout::Position => TriangleKind::Solid,
            VertexLayout::PositionAndKind => TriangleKind::from_marker(self.vertices[index * 9 + 2]),
        }
    }

    /// Iterates over the positions of all vertices.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices
            .chunks_exact(self.layout.floats_per_vertex())
            .map(|v| point(v[0], v[1]))
    }

    /// Iterates over the triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        let stride = self.layout.floats_per_vertex();
        self.vertices.chunks_exact(stride * 3).map(move |t| {
            [
                point(t[0], t[1]),
                point(t[stride], t[stride + 1]),
                point(t[stride * 2], t[stride * 2 + 1]),
            ]
        })
    }

    pub fn bounding_box(&self) -> Option<Box2D> {
        let mut positions = self.positions();
        let first = positions.next()?;
        let mut bb = Box2D::new(first, first);
        for p in positions {
            bb.min = bb.min.min(p);
            bb.max = bb.max.max(p);
        }

        Some(bb)
    }

    /// Sum of the absolute areas of the triangles.
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).abs() * 0.5)
            .sum()
    }
}

impl GeometryBuilder for VertexBuffer {
    fn begin_geometry(&mut self) {
        self.geometry_start = self.vertices.len();
    }

    fn end_geometry(&mut self) -> Count {
        let floats = self.vertices.len() - self.geometry_start;
        let vertices = (floats / self.layout.floats_per_vertex()) as u32;
        self.geometry_start = self.vertices.len();

        Count {
            vertices,
            triangles: vertices / 3,
        }
    }

    fn add_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        kind: TriangleKind,
    ) -> Result<(), GeometryBuilderError> {
        if !(a.x.is_finite()
            && a.y.is_finite()
            && b.x.is_finite()
            && b.y.is_finite()
            && c.x.is_finite()
            && c.y.is_finite())
        {
            return Err(GeometryBuilderError::InvalidVertex);
        }

        if self.vertex_count() + 3 > u32::MAX as usize {
            return Err(GeometryBuilderError::TooManyVertices);
        }

        for (i, p) in [a, b, c].iter().enumerate() {
            self.vertices.push(p.x);
            self.vertices.push(p.y);
            if self.layout == VertexLayout::PositionAndKind {
                self.vertices.push(kind.marker(i));
            }
        }

        Ok(())
    }

    fn abort_geometry(&mut self) {
        self.vertices.truncate(self.geometry_start);
    }
}

/// A geometry builder that only counts what it receives.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NoOutput {
    count: Count,
}

impl NoOutput {
    pub fn new() -> Self {
        NoOutput::default()
    }
}

impl GeometryBuilder for NoOutput {
    fn begin_geometry(&mut self) {
        self.count = Count::default();
    }

    fn end_geometry(&mut self) -> Count {
        self.count
    }

    fn add_triangle(
        &mut self,
        _a: Point,
        _b: Point,
        _c: Point,
        _kind: TriangleKind,
    ) -> Result<(), GeometryBuilderError> {
        self.count.vertices += 3;
        self.count.triangles += 1;
        Ok(())
    }
}

#[test]
fn packed_markers() {
    let mut buffer = VertexBuffer::new(VertexLayout::PositionAndKind);
    buffer.begin_geometry();
    buffer
        .add_triangle(
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            TriangleKind::Concave,
        )
        .unwrap();
    buffer
        .add_triangle(
            point(0.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
            TriangleKind::Solid,
        )
        .unwrap();
    let count = buffer.end_geometry();

    assert_eq!(count, Count { vertices: 6, triangles: 2 });
    assert_eq!(&buffer.vertices[0..9], &[0.0, 0.0, -1.0, 1.0, 0.0, -2.0, 1.0, 1.0, -3.0]);
    assert_eq!(buffer.triangle_kind(0), TriangleKind::Concave);
    assert_eq!(buffer.triangle_kind(1), TriangleKind::Solid);
    assert_eq!(buffer.position(4), point(1.0, 1.0));
    assert_eq!(buffer.area(), 1.0);
}

#[test]
fn abort_discards_the_current_geometry() {
    let mut buffer = VertexBuffer::new(VertexLayout::Position);
    buffer.begin_geometry();
    buffer
        .add_triangle(point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), TriangleKind::Solid)
        .unwrap();
    buffer.end_geometry();

    buffer.begin_geometry();
    buffer
        .add_triangle(point(5.0, 0.0), point(6.0, 0.0), point(6.0, 1.0), TriangleKind::Solid)
        .unwrap();
    assert_eq!(
        buffer.add_triangle(
            point(f32::NAN, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            TriangleKind::Solid
        ),
        Err(GeometryBuilderError::InvalidVertex)
    );
    buffer.abort_geometry();

    assert_eq!(buffer.triangle_count(), 1);
    assert_eq!(
        buffer.bounding_box(),
        Some(Box2D::new(point(0.0, 0.0), point(1.0, 1.0)))
    );
}
