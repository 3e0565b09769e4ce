//! The default path data structure and its flattened form.
//!

use crate::builder::PathBuilder;
use crate::geom::{FlatteningOptions, LineSegment, QuadraticBezierSegment};
use crate::math::*;
use crate::PathEvent;

use std::fmt;

/// Enumeration corresponding to the [PathEvent](enum.PathEvent.html) enum
/// without the parameters.
///
/// This is used by the [Path](struct.Path.html) data structure to store path events a tad
/// more efficiently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub(crate) enum Verb {
    Begin,
    LineTo,
    QuadraticTo,
    End,
}

/// A simple path data structure.
///
/// # Representation
///
/// Paths contain two buffers:
/// - a buffer of commands (Begin, Line, Quadratic or End),
/// - and a buffer of points that can be endpoints or control points.
///
/// The order of storage for points is determined by the sequence of commands.
///
/// ```ascii
///  __________________________
/// |       |      |         |
/// | Begin | Line |Quadratic| ...
/// |_______|______|_________|_
///  ______________________________________
/// |         |         |         |         |
/// |start x,y| to x, y |ctrl x,y | to x, y | ...
/// |_________|_________|_________|_________|_
/// ```
///
/// Sub-paths are not explicitly closed. A sub-path is closed when its last
/// endpoint is within `Path::CLOSE_EPSILON` of its first one.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    points: Box<[Point]>,
    verbs: Box<[Verb]>,
}

impl Path {
    /// Maximum distance between the two ends of a closed sub-path.
    pub const CLOSE_EPSILON: f32 = 0.01;

    /// Creates a [PathBuilder](../builder/struct.PathBuilder.html) to build a path.
    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Creates an Empty `Path`.
    #[inline]
    pub fn new() -> Path {
        Path {
            points: Box::new([]),
            verbs: Box::new([]),
        }
    }

    pub(crate) fn from_parts(points: Vec<Point>, verbs: Vec<Verb>) -> Path {
        Path {
            points: points.into_boxed_slice(),
            verbs: verbs.into_boxed_slice(),
        }
    }

    /// Iterates over the events of the path.
    pub fn iter(&self) -> Iter {
        Iter::new(&self.points[..], &self.verbs[..])
    }

    /// Returns a slice over the endpoints and control points of the path.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points[..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn sub_path_count(&self) -> usize {
        self.verbs.iter().filter(|v| **v == Verb::Begin).count()
    }

    pub fn edge_count(&self) -> usize {
        self.verbs
            .iter()
            .filter(|v| **v == Verb::LineTo || **v == Verb::QuadraticTo)
            .count()
    }

    /// Resolves which sub-paths are closed and splits the curves in pieces.
    ///
    /// See [`FlattenedPath::from_events`](struct.FlattenedPath.html#method.from_events).
    pub fn prepare(&self, options: &PrepareOptions) -> FlattenedPath {
        FlattenedPath::from_events(self.iter(), options)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("\"")?;
        for evt in self.iter() {
            match evt {
                PathEvent::Begin { at } => write!(formatter, "M {} {} ", at.x, at.y)?,
                PathEvent::Line { to, .. } => write!(formatter, "L {} {} ", to.x, to.y)?,
                PathEvent::Quadratic { ctrl, to, .. } => {
                    write!(formatter, "Q {} {} {} {} ", ctrl.x, ctrl.y, to.x, to.y)?
                }
                PathEvent::End { close: true, .. } => formatter.write_str("Z ")?,
                PathEvent::End { .. } => {}
            }
        }
        formatter.write_str("\"")
    }
}

impl<'l> IntoIterator for &'l Path {
    type Item = PathEvent;
    type IntoIter = Iter<'l>;

    fn into_iter(self) -> Iter<'l> {
        self.iter()
    }
}

/// An iterator for `Path`.
#[derive(Clone)]
pub struct Iter<'l> {
    points: std::slice::Iter<'l, Point>,
    verbs: std::slice::Iter<'l, Verb>,
    current: Point,
    first: Point,
}

impl<'l> Iter<'l> {
    fn new(points: &'l [Point], verbs: &'l [Verb]) -> Self {
        Iter {
            points: points.iter(),
            verbs: verbs.iter(),
            current: point(0.0, 0.0),
            first: point(0.0, 0.0),
        }
    }

    #[inline]
    fn next_point(&mut self) -> Point {
        // The builder always stores as many points as the verbs need.
        self.points
            .next()
            .copied()
            .unwrap_or_else(|| point(f32::NAN, f32::NAN))
    }
}

impl<'l> Iterator for Iter<'l> {
    type Item = PathEvent;
    #[inline]
    fn next(&mut self) -> Option<PathEvent> {
        match self.verbs.next() {
            Some(&Verb::Begin) => {
                self.current = self.next_point();
                self.first = self.current;
                Some(PathEvent::Begin { at: self.current })
            }
            Some(&Verb::LineTo) => {
                let from = self.current;
                self.current = self.next_point();
                Some(PathEvent::Line {
                    from,
                    to: self.current,
                })
            }
            Some(&Verb::QuadraticTo) => {
                let from = self.current;
                let ctrl = self.next_point();
                self.current = self.next_point();
                Some(PathEvent::Quadratic {
                    from,
                    ctrl,
                    to: self.current,
                })
            }
            Some(&Verb::End) => {
                let last = self.current;
                let close = (last - self.first).square_length()
                    <= Path::CLOSE_EPSILON * Path::CLOSE_EPSILON;
                self.current = self.first;
                Some(PathEvent::End {
                    last,
                    first: self.first,
                    close,
                })
            }
            None => None,
        }
    }
}

/// Parameters for [`Path::prepare`](struct.Path.html#method.prepare).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct PrepareOptions {
    /// Splits curves into pieces that are flat enough to be drawn as a
    /// segment. With `None` curves are kept whole.
    ///
    /// Default value: `Some(FlatteningOptions::DEFAULT)`.
    pub flattening: Option<FlatteningOptions>,

    /// Append a line back to the start of open sub-paths.
    ///
    /// Fills need closed contours, strokes keep open ends open.
    ///
    /// Default value: `false`.
    pub force_close: bool,
}

impl PrepareOptions {
    pub const DEFAULT: Self = PrepareOptions {
        flattening: Some(FlatteningOptions::DEFAULT),
        force_close: false,
    };

    #[inline]
    pub const fn with_flattening(mut self, flattening: Option<FlatteningOptions>) -> Self {
        self.flattening = flattening;
        self
    }

    #[inline]
    pub const fn with_force_close(mut self, force_close: bool) -> Self {
        self.force_close = force_close;
        self
    }
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Below this squared length an edge has no direction.
const MIN_EDGE_SQUARE_LENGTH: f32 = 1e-8;

/// An edge of a flattened sub-path.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Edge {
    Line(LineSegment<f32>),
    Curve(QuadraticBezierSegment<f32>),
}

impl Edge {
    #[inline]
    pub fn start(&self) -> Point {
        match self {
            Edge::Line(line) => line.from,
            Edge::Curve(curve) => curve.from,
        }
    }

    #[inline]
    pub fn end(&self) -> Point {
        match self {
            Edge::Line(line) => line.to,
            Edge::Curve(curve) => curve.to,
        }
    }

    fn set_end(&mut self, to: Point) {
        match self {
            Edge::Line(line) => line.to = to,
            Edge::Curve(curve) => curve.to = to,
        }
    }
}

/// A sub-path made of lines and of curves that are flat enough to be drawn
/// as segments.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlattenedSubPath {
    pub start: Point,
    /// Consecutive edges share their end points. When `closed` is true the
    /// last edge ends exactly at `start`.
    pub edges: Vec<Edge>,
    pub closed: bool,
}

impl FlattenedSubPath {
    /// The start followed by the end point of each edge.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.edges.iter().map(Edge::end))
    }
}

/// Removes consecutive duplicates and the points closing the polygon, i.e.
/// the trailing points within `Path::CLOSE_EPSILON` of the first one.
pub fn polygon_points(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup();
    while points.len() > 1 {
        let first = points[0];
        let last = points[points.len() - 1];
        if (last - first).square_length() > Path::CLOSE_EPSILON * Path::CLOSE_EPSILON {
            break;
        }
        points.pop();
    }

    points
}

/// The center-line of a path, ready to be tessellated.
///
/// Building it resolves the closed sub-paths, drops zero-length edges,
/// turns straight curves into lines and splits the other curves into flat
/// pieces. Tessellating the same path with another thickness or scale can
/// reuse it as is.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlattenedPath {
    pub sub_paths: Vec<FlattenedSubPath>,
}

impl FlattenedPath {
    pub fn from_events<I>(events: I, options: &PrepareOptions) -> Self
    where
        I: IntoIterator<Item = PathEvent>,
    {
        let mut sub_paths = Vec::new();
        let mut start = point(0.0, 0.0);
        let mut edges = Vec::new();

        for event in events {
            match event {
                PathEvent::Begin { at } => {
                    start = at;
                    edges.clear();
                }
                PathEvent::Line { from, to } => {
                    push_line(&mut edges, from, to);
                }
                PathEvent::Quadratic { from, ctrl, to } => {
                    let curve = QuadraticBezierSegment { from, ctrl, to };
                    if curve.is_linear() {
                        push_line(&mut edges, from, to);
                        continue;
                    }

                    match options.flattening {
                        Some(flattening) => curve.for_each_subdivided(
                            &|piece, depth| flattening.is_flat_enough(piece, depth),
                            &mut |piece, _| edges.push(Edge::Curve(*piece)),
                        ),
                        None => edges.push(Edge::Curve(curve)),
                    }
                }
                PathEvent::End { last, first, close } => {
                    let mut closed = close;
                    if closed {
                        if let Some(edge) = edges.last_mut() {
                            edge.set_end(first);
                        }
                    } else if options.force_close && !edges.is_empty() {
                        log::debug!("implicitly closing an open sub-path at {:?}", first);
                        push_line(&mut edges, last, first);
                        closed = true;
                    }

                    sub_paths.push(FlattenedSubPath {
                        start,
                        edges: std::mem::take(&mut edges),
                        closed,
                    });
                }
            }
        }

        FlattenedPath { sub_paths }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sub_paths.is_empty()
    }
}

fn push_line(edges: &mut Vec<Edge>, from: Point, to: Point) {
    // Edges with NaN positions are kept for the tessellators to reject.
    if !((to - from).square_length() <= MIN_EDGE_SQUARE_LENGTH) {
        edges.push(Edge::Line(LineSegment { from, to }));
    }
}

#[test]
fn iterate_events() {
    let mut builder = Path::builder();
    builder.move_to(point(1.0, 1.0));
    builder.line_to(point(2.0, 1.0));
    builder.curve_to(point(3.0, 1.0), point(3.0, 2.0));
    builder.line_to(point(1.0, 1.0));
    builder.move_to(point(10.0, 10.0));
    builder.line_to(point(11.0, 10.0));
    let path = builder.build();

    let events: Vec<PathEvent> = path.iter().collect();
    assert_eq!(
        events,
        vec![
            PathEvent::Begin {
                at: point(1.0, 1.0)
            },
            PathEvent::Line {
                from: point(1.0, 1.0),
                to: point(2.0, 1.0)
            },
            PathEvent::Quadratic {
                from: point(2.0, 1.0),
                ctrl: point(3.0, 1.0),
                to: point(3.0, 2.0)
            },
            PathEvent::Line {
                from: point(3.0, 2.0),
                to: point(1.0, 1.0)
            },
            PathEvent::End {
                last: point(1.0, 1.0),
                first: point(1.0, 1.0),
                close: true
            },
            PathEvent::Begin {
                at: point(10.0, 10.0)
            },
            PathEvent::Line {
                from: point(10.0, 10.0),
                to: point(11.0, 10.0)
            },
            PathEvent::End {
                last: point(11.0, 10.0),
                first: point(10.0, 10.0),
                close: false
            },
        ]
    );

    assert_eq!(path.sub_path_count(), 2);
    assert_eq!(path.edge_count(), 4);
}

fn polyline(points: &[(f32, f32)]) -> Path {
    let mut builder = Path::builder();
    builder.move_to(point(points[0].0, points[0].1));
    for p in &points[1..] {
        builder.line_to(point(p.0, p.1));
    }
    builder.build()
}

#[test]
fn prepare_closes_on_request() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

    let open = path.prepare(&PrepareOptions::DEFAULT);
    assert_eq!(open.sub_paths.len(), 1);
    assert!(!open.sub_paths[0].closed);
    assert_eq!(open.sub_paths[0].edges.len(), 2);

    let closed = path.prepare(&PrepareOptions::DEFAULT.with_force_close(true));
    let sub_path = &closed.sub_paths[0];
    assert!(sub_path.closed);
    assert_eq!(
        sub_path.points().collect::<Vec<_>>(),
        vec![
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 0.0)
        ]
    );
    assert_eq!(polygon_points(sub_path.points().collect()).len(), 3);
}

#[test]
fn prepare_snaps_almost_closed_sub_paths() {
    let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.001, 0.0)]);

    let flattened = path.prepare(&PrepareOptions::DEFAULT);
    let sub_path = &flattened.sub_paths[0];
    assert!(sub_path.closed);
    assert_eq!(sub_path.edges.last().map(Edge::end), Some(sub_path.start));
}

#[test]
fn prepare_splits_curves() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(50.0, 100.0), point(100.0, 0.0));
    builder.line_to(point(100.0, 20.0));
    let path = builder.build();

    let flattened = path.prepare(&PrepareOptions::DEFAULT);
    let edges = &flattened.sub_paths[0].edges;
    assert!(edges.len() > 3);
    assert_eq!(edges[0].start(), point(0.0, 0.0));
    for pair in edges.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start());
    }
    match edges[edges.len() - 2] {
        Edge::Curve(piece) => assert_eq!(piece.to, point(100.0, 0.0)),
        other => panic!("unexpected edge {:?}", other),
    }

    let max_y = flattened.sub_paths[0]
        .points()
        .map(|p| p.y)
        .fold(0.0f32, f32::max);
    assert!(max_y > 40.0 && max_y <= 50.0);

    // Whole curves are kept without flattening.
    let whole = path.prepare(&PrepareOptions::DEFAULT.with_flattening(None));
    assert_eq!(whole.sub_paths[0].edges.len(), 2);
}

#[test]
fn straight_curves_become_lines() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, 5.0), point(10.0, 10.0));
    let path = builder.build();

    let flattened = path.prepare(&PrepareOptions::DEFAULT);
    assert_eq!(
        flattened.sub_paths[0].edges,
        vec![Edge::Line(LineSegment {
            from: point(0.0, 0.0),
            to: point(10.0, 10.0)
        })]
    );
}

#[test]
fn zero_length_edges_are_dropped() {
    let mut builder = Path::builder();
    builder.move_to(point(5.0, 5.0));
    builder.curve_to(point(5.0, 5.0), point(5.0, 5.0));
    let path = builder.build();

    // The degenerate curve is kept as a zero-length line.
    assert_eq!(path.edge_count(), 1);

    let flattened = path.prepare(&PrepareOptions::DEFAULT.with_force_close(true));
    assert_eq!(flattened.sub_paths.len(), 1);
    assert!(flattened.sub_paths[0].edges.is_empty());
    assert_eq!(
        polygon_points(flattened.sub_paths[0].points().collect()),
        vec![point(5.0, 5.0)]
    );

    assert!(Path::new().prepare(&PrepareOptions::DEFAULT).is_empty());
}

#[test]
fn polygon_points_drop_the_closing_points() {
    let points = vec![
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.001, 0.0),
        point(0.0, 0.0),
    ];

    assert_eq!(
        polygon_points(points),
        vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]
    );
}
