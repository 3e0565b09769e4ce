//! Path building utilities.
//!
//! The [PathBuilder](struct.PathBuilder.html) follows the conventions of the
//! drawing API of vector shapes: there is no explicit begin or close command,
//! a `move_to` after any command starts a new sub-path and the pen starts at
//! the origin.
//!
//! Degenerate commands are resolved as they arrive:
//!
//! - `line_to` or `move_to` to the current position is dropped.
//! - `curve_to` with `ctrl == to != current` becomes `line_to(ctrl)`.
//! - `curve_to` with `to == current != ctrl` becomes `line_to(ctrl)`.
//! - `curve_to` with `ctrl == current != to` becomes `line_to(to)`.
//! - `curve_to` with `ctrl == to == current` becomes a zero-length `line_to(to)`
//!   which is kept, so that the sub-path still has an edge.
//!
//! ## Examples
//!
//! ```
//! use shapemesh_path::{Path, math::point};
//!
//! let mut builder = Path::builder();
//!
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.curve_to(point(2.0, 0.0), point(2.0, 1.0));
//!
//! builder.move_to(point(10.0, 0.0));
//! builder.line_to(point(12.0, 2.0));
//!
//! let path = builder.build();
//! assert_eq!(path.sub_path_count(), 2);
//! ```

use crate::math::*;
use crate::path::{Path, Verb};

/// Builds a [Path](../path/struct.Path.html) from drawing commands.
#[derive(Clone, Debug)]
pub struct PathBuilder {
    points: Vec<Point>,
    verbs: Vec<Verb>,
    current: Point,
    in_sub_path: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder::with_capacity(0, 0)
    }

    pub fn with_capacity(points: usize, edges: usize) -> Self {
        PathBuilder {
            points: Vec::with_capacity(points),
            verbs: Vec::with_capacity(edges),
            current: point(0.0, 0.0),
            in_sub_path: false,
        }
    }

    /// The position of the pen.
    #[inline]
    pub fn current_position(&self) -> Point {
        self.current
    }

    pub fn move_to(&mut self, to: Point) {
        if to == self.current {
            return;
        }

        self.end_sub_path();
        self.current = to;
    }

    pub fn line_to(&mut self, to: Point) {
        if to == self.current {
            return;
        }

        self.push_line(to);
    }

    #[allow(clippy::if_same_then_else)]
    pub fn curve_to(&mut self, ctrl: Point, to: Point) {
        let current = self.current;

        if ctrl == to && to != current {
            self.line_to(ctrl);
        } else if to == current && ctrl != current {
            self.line_to(ctrl);
        } else if ctrl == current && to != current {
            self.line_to(to);
        } else if ctrl == current && to == current {
            self.push_line(to);
        } else {
            self.begin_if_needed();
            self.verbs.push(Verb::QuadraticTo);
            self.points.push(ctrl);
            self.points.push(to);
            self.current = to;
        }
    }

    /// Returns true if no edge was recorded yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn build(mut self) -> Path {
        self.end_sub_path();
        Path::from_parts(self.points, self.verbs)
    }

    fn push_line(&mut self, to: Point) {
        self.begin_if_needed();
        self.verbs.push(Verb::LineTo);
        self.points.push(to);
        self.current = to;
    }

    fn begin_if_needed(&mut self) {
        if !self.in_sub_path {
            self.verbs.push(Verb::Begin);
            self.points.push(self.current);
            self.in_sub_path = true;
        }
    }

    /// Ends the current sub-path. The next edge starts a new sub-path at the
    /// current position.
    pub fn end_sub_path(&mut self) {
        if self.in_sub_path {
            self.verbs.push(Verb::End);
            self.in_sub_path = false;
        }
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        PathBuilder::new()
    }
}

#[cfg(test)]
use crate::PathEvent;

#[cfg(test)]
fn edges(path: &Path) -> Vec<PathEvent> {
    path.iter().filter(|evt| evt.is_edge()).collect()
}

#[test]
fn curve_to_with_ctrl_on_anchor() {
    let mut builder = Path::builder();
    builder.curve_to(point(5.0, 5.0), point(5.0, 5.0));
    let path = builder.build();

    assert_eq!(
        edges(&path),
        vec![PathEvent::Line {
            from: point(0.0, 0.0),
            to: point(5.0, 5.0)
        }]
    );
}

#[test]
fn curve_to_back_to_current_point() {
    let mut builder = Path::builder();
    builder.move_to(point(1.0, 1.0));
    builder.curve_to(point(4.0, 3.0), point(1.0, 1.0));
    let path = builder.build();

    assert_eq!(
        edges(&path),
        vec![PathEvent::Line {
            from: point(1.0, 1.0),
            to: point(4.0, 3.0)
        }]
    );
}

#[test]
fn curve_to_with_ctrl_on_current_point() {
    let mut builder = Path::builder();
    builder.move_to(point(1.0, 1.0));
    builder.curve_to(point(1.0, 1.0), point(7.0, 2.0));
    let path = builder.build();

    assert_eq!(
        edges(&path),
        vec![PathEvent::Line {
            from: point(1.0, 1.0),
            to: point(7.0, 2.0)
        }]
    );
}

#[test]
fn curve_to_without_movement() {
    let mut builder = Path::builder();
    builder.move_to(point(1.0, 1.0));
    builder.curve_to(point(1.0, 1.0), point(1.0, 1.0));
    let path = builder.build();

    assert_eq!(
        edges(&path),
        vec![PathEvent::Line {
            from: point(1.0, 1.0),
            to: point(1.0, 1.0)
        }]
    );
}

#[test]
fn regular_curve_to() {
    let mut builder = Path::builder();
    builder.curve_to(point(5.0, 0.0), point(5.0, 5.0));
    let path = builder.build();

    assert_eq!(
        edges(&path),
        vec![PathEvent::Quadratic {
            from: point(0.0, 0.0),
            ctrl: point(5.0, 0.0),
            to: point(5.0, 5.0)
        }]
    );
}

#[test]
fn redundant_commands_are_dropped() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.line_to(point(0.0, 0.0));
    assert!(builder.is_empty());

    builder.line_to(point(3.0, 0.0));
    builder.line_to(point(3.0, 0.0));
    builder.move_to(point(3.0, 0.0));
    builder.line_to(point(3.0, 3.0));
    let path = builder.build();

    assert_eq!(path.sub_path_count(), 1);
    assert_eq!(path.edge_count(), 2);
}

#[test]
fn move_to_starts_a_new_sub_path() {
    let mut builder = Path::builder();
    builder.line_to(point(3.0, 0.0));
    builder.move_to(point(5.0, 5.0));
    builder.move_to(point(6.0, 5.0));
    builder.line_to(point(6.0, 6.0));
    assert_eq!(builder.current_position(), point(6.0, 6.0));
    let path = builder.build();

    let begins: Vec<Point> = path
        .iter()
        .filter_map(|evt| match evt {
            PathEvent::Begin { at } => Some(at),
            _ => None,
        })
        .collect();
    assert_eq!(begins, vec![point(0.0, 0.0), point(6.0, 5.0)]);
}
