//! Polygon triangulation.
//!
//! The fill tessellator does not triangulate polygons itself, it hands all
//! the contours of a fill to a [`Triangulator`](trait.Triangulator.html)
//! in a single call. Any function or closure with the right signature is a
//! triangulator, which makes it possible to dispatch the work to another
//! thread or process and to give up after a timeout by returning
//! `OracleError::Unavailable`.
//!
//! The default [`EarcutTriangulator`](struct.EarcutTriangulator.html) splits
//! the contours where they cross or overlap, keeps the boundaries of the
//! area filled according to the fill rule and runs ear clipping on each
//! outer boundary with its holes.

use crate::boundary::fill_polygons;
use crate::error::OracleError;
use crate::geom::Point as GenericPoint;
use crate::math::*;
use crate::path::FillRule;

use earcutr::earcut;

/// Triangulates a set of closed polygons according to a fill rule.
///
/// Contours are implicitly closed: the last point connects back to the
/// first one and should not repeat it.
pub trait Triangulator: Send + Sync {
    fn triangulate(
        &self,
        contours: &[Vec<Point>],
        rule: FillRule,
    ) -> Result<Vec<[Point; 3]>, OracleError>;
}

impl<F> Triangulator for F
where
    F: Fn(&[Vec<Point>], FillRule) -> Result<Vec<[Point; 3]>, OracleError> + Send + Sync,
{
    fn triangulate(
        &self,
        contours: &[Vec<Point>],
        rule: FillRule,
    ) -> Result<Vec<[Point; 3]>, OracleError> {
        self(contours, rule)
    }
}

/// Ear clipping triangulation on top of the `earcutr` crate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EarcutTriangulator;

impl EarcutTriangulator {
    pub fn new() -> Self {
        EarcutTriangulator
    }
}

impl Triangulator for EarcutTriangulator {
    fn triangulate(
        &self,
        contours: &[Vec<Point>],
        rule: FillRule,
    ) -> Result<Vec<[Point; 3]>, OracleError> {
        let contours: Vec<&[Point]> = contours
            .iter()
            .map(|c| normalize_ring(c))
            .filter(|c| c.len() >= 3 && signed_area(c).abs() > 1e-6)
            .collect();

        let mut triangles = Vec::new();
        for polygon in fill_polygons(&contours, rule)? {
            let mut coords: Vec<f64> = Vec::new();
            let mut vertices: Vec<Point> = Vec::new();
            let mut hole_starts: Vec<usize> = Vec::new();

            append_ring(&mut coords, &mut vertices, &polygon.outer);
            for hole in &polygon.holes {
                hole_starts.push(vertices.len());
                append_ring(&mut coords, &mut vertices, hole);
            }

            let indices = earcut(&coords, &hole_starts, 2)
                .map_err(|e| OracleError::Rejected(format!("{:?}", e)))?;

            if indices.len() % 3 != 0 {
                return Err(OracleError::InvalidOutput);
            }

            for tri in indices.chunks_exact(3) {
                let a = *vertices.get(tri[0]).ok_or(OracleError::InvalidOutput)?;
                let b = *vertices.get(tri[1]).ok_or(OracleError::InvalidOutput)?;
                let c = *vertices.get(tri[2]).ok_or(OracleError::InvalidOutput)?;
                triangles.push([a, b, c]);
            }
        }

        Ok(triangles)
    }
}

/// Drops the duplicated closing vertex if present.
fn normalize_ring(ring: &[Point]) -> &[Point] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && (*first - *last).square_length() < 1e-8 => {
            &ring[..ring.len() - 1]
        }
        _ => ring,
    }
}

fn append_ring(coords: &mut Vec<f64>, vertices: &mut Vec<Point>, ring: &[GenericPoint<f64>]) {
    for p in ring {
        coords.push(p.x);
        coords.push(p.y);
        vertices.push(p.to_f32());
    }
}

fn signed_area(polygon: &[Point]) -> f32 {
    crate::geom::utils::signed_area(polygon)
}

#[cfg(test)]
fn rect(x: f32, y: f32, w: f32, h: f32) -> Vec<Point> {
    vec![
        point(x, y),
        point(x + w, y),
        point(x + w, y + h),
        point(x, y + h),
    ]
}

#[cfg(test)]
fn area(triangles: &[[Point; 3]]) -> f32 {
    triangles
        .iter()
        .map(|[a, b, c]| (*b - *a).cross(*c - *a).abs() * 0.5)
        .sum()
}

#[test]
fn square() {
    let triangles = EarcutTriangulator
        .triangulate(&[rect(0.0, 0.0, 10.0, 10.0)], FillRule::EvenOdd)
        .unwrap();
    assert_eq!(triangles.len(), 2);
    assert_eq!(area(&triangles), 100.0);
}

#[test]
fn closing_point_is_ignored() {
    let mut ring = rect(0.0, 0.0, 10.0, 10.0);
    ring.push(point(0.0, 0.0));
    let triangles = EarcutTriangulator
        .triangulate(&[ring], FillRule::EvenOdd)
        .unwrap();
    assert_eq!(triangles.len(), 2);
}

#[test]
fn hole_even_odd() {
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let hole = rect(2.0, 2.0, 6.0, 6.0);
    let triangles = EarcutTriangulator
        .triangulate(&[outer, hole], FillRule::EvenOdd)
        .unwrap();
    assert!((area(&triangles) - 64.0).abs() < 0.01);
}

#[test]
fn non_zero_keeps_same_direction_overlap() {
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let inner = rect(2.0, 2.0, 6.0, 6.0);

    let even_odd = EarcutTriangulator
        .triangulate(&[outer.clone(), inner.clone()], FillRule::EvenOdd)
        .unwrap();
    assert!((area(&even_odd) - 64.0).abs() < 0.01);

    // Both contours wind the same way: the inner one is not a hole.
    let non_zero = EarcutTriangulator
        .triangulate(&[outer.clone(), inner], FillRule::NonZero)
        .unwrap();
    assert!((area(&non_zero) - 100.0).abs() < 0.01);

    // With opposite windings it is.
    let reversed: Vec<Point> = rect(2.0, 2.0, 6.0, 6.0).into_iter().rev().collect();
    let non_zero = EarcutTriangulator
        .triangulate(&[outer, reversed], FillRule::NonZero)
        .unwrap();
    assert!((area(&non_zero) - 64.0).abs() < 0.01);
}

#[test]
fn overlapping_contours() {
    let contours = [rect(0.0, 0.0, 10.0, 10.0), rect(3.0, 3.0, 10.0, 10.0)];

    let non_zero = EarcutTriangulator
        .triangulate(&contours, FillRule::NonZero)
        .unwrap();
    assert!((area(&non_zero) - 151.0).abs() < 0.01);

    let even_odd = EarcutTriangulator
        .triangulate(&contours, FillRule::EvenOdd)
        .unwrap();
    assert!((area(&even_odd) - 102.0).abs() < 0.01);
    // Nothing is produced in the overlap.
    let center = point(6.5, 6.5);
    for &[a, b, c] in &even_odd {
        let sides = [
            (b - a).cross(center - a),
            (c - b).cross(center - b),
            (a - c).cross(center - c),
        ];
        let inside = sides.iter().all(|&s| s > 0.0) || sides.iter().all(|&s| s < 0.0);
        assert!(!inside);
    }
}

#[test]
fn closures_are_triangulators() {
    let unavailable = |_: &[Vec<Point>], _: FillRule| -> Result<Vec<[Point; 3]>, OracleError> {
        Err(OracleError::Unavailable)
    };
    let oracle: &dyn Triangulator = &unavailable;
    assert_eq!(
        oracle.triangulate(&[rect(0.0, 0.0, 1.0, 1.0)], FillRule::NonZero),
        Err(OracleError::Unavailable)
    );
}
