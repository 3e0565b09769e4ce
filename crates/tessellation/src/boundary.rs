//! Boundaries of the filled area of overlapping contours.
//!
//! Ear clipping needs simple polygons and holes. The contours of a fill can
//! cross each other, overlap or touch, so they are first split at all of
//! their intersections. A piece of edge is kept when the fill rule gives a
//! different result on its two sides, and the kept pieces are chained into
//! rings that have the filled area on their left. Outer boundaries have a
//! positive area, holes a negative one.
//!
//! Computations are done in `f64`, the input being `f32` positions.

use crate::error::OracleError;
use crate::geom::utils::signed_area;
use crate::geom::{vector, Box2D, Point, Vector};
use crate::path::FillRule;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

type DPoint = Point<f64>;
type DVector = Vector<f64>;

// Relative tolerance on the position of a cut along an edge.
const PARAM_EPSILON: f64 = 1e-9;
// Relative tolerance on the sine of the angle between parallel edges.
const PARALLEL_EPSILON: f64 = 1e-12;
// Distance between a piece of edge and the points where its sides are
// tested, relative to the size of the fill.
const SIDE_OFFSET: f64 = 1e-6;

/// An outer boundary and the holes it contains.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Polygon {
    pub outer: Vec<DPoint>,
    pub holes: Vec<Vec<DPoint>>,
}

/// Computes the simple polygons covering the area filled by `contours`
/// according to `rule`.
pub(crate) fn fill_polygons(
    contours: &[&[Point<f32>]],
    rule: FillRule,
) -> Result<Vec<Polygon>, OracleError> {
    let rings: Vec<Vec<DPoint>> = contours
        .iter()
        .map(|contour| contour.iter().map(|p| p.to_f64()).collect())
        .collect();

    let mut edges = Vec::new();
    for ring in &rings {
        for (i, &from) in ring.iter().enumerate() {
            let to = ring[(i + 1) % ring.len()];
            if from != to {
                edges.push((from, to));
            }
        }
    }

    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let bounds = Box2D::from_points(edges.iter().map(|edge| edge.0));
    let extent = (bounds.max - bounds.min).length();

    let mut vertices = VertexSet::default();
    let pieces = split_edges(&edges, &mut vertices);

    let mut boundary = Vec::new();
    for (a, b) in pieces {
        let (from, to) = (vertices.positions[a], vertices.positions[b]);
        let d = to - from;
        let length = d.length();
        let side = vector(-d.y, d.x) / length * (extent * SIDE_OFFSET).min(length * 0.01);
        let mid = from.lerp(to, 0.5);

        match (is_filled_at(mid + side, &rings, rule), is_filled_at(mid - side, &rings, rule)) {
            (true, false) => boundary.push((a, b)),
            (false, true) => boundary.push((b, a)),
            _ => {}
        }
    }

    let mut outers: Vec<(Polygon, f64)> = Vec::new();
    let mut holes = Vec::new();
    for ring in chain_rings(&boundary, &vertices.positions)? {
        let area = signed_area(&ring);
        if area > 0.0 {
            outers.push((
                Polygon {
                    outer: ring,
                    holes: Vec::new(),
                },
                area,
            ));
        } else if area < 0.0 {
            holes.push(ring);
        }
    }

    for hole in holes {
        // Just outside of the hole, in the area filled around it.
        let p = beside_longest_edge(&hole, extent);
        let owner = outers
            .iter_mut()
            .filter(|(polygon, _)| point_in_polygon(p, &polygon.outer))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        match owner {
            Some((polygon, _)) => polygon.holes.push(hole),
            None => {
                return Err(OracleError::Rejected(format!(
                    "no boundary around the hole at {:?}",
                    p
                )))
            }
        }
    }

    Ok(outers.into_iter().map(|(polygon, _)| polygon).collect())
}

#[derive(Default)]
struct VertexSet {
    positions: Vec<DPoint>,
    ids: HashMap<(u64, u64), usize>,
}

impl VertexSet {
    fn id(&mut self, p: DPoint) -> usize {
        // Adding zero turns -0.0 into 0.0.
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        let positions = &mut self.positions;
        *self.ids.entry(key).or_insert_with(|| {
            positions.push(p);
            positions.len() - 1
        })
    }
}

/// Splits the edges where they cross or touch each other. Returns the
/// distinct pieces as pairs of vertex ids.
fn split_edges(edges: &[(DPoint, DPoint)], vertices: &mut VertexSet) -> Vec<(usize, usize)> {
    let boxes: Vec<Box2D<f64>> = edges
        .iter()
        .map(|&(from, to)| Box2D::from_points(&[from, to]))
        .collect();

    let mut cuts: Vec<Vec<DPoint>> = vec![Vec::new(); edges.len()];
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            let (a, b) = (&boxes[i], &boxes[j]);
            let disjoint =
                a.max.x < b.min.x || b.max.x < a.min.x || a.max.y < b.min.y || b.max.y < a.min.y;
            if !disjoint {
                cut_pair(i, j, edges, &mut cuts);
            }
        }
    }

    let mut pieces = Vec::new();
    let mut seen = HashSet::new();
    for (&(from, to), edge_cuts) in edges.iter().zip(cuts.iter_mut()) {
        let d = to - from;
        edge_cuts.push(from);
        edge_cuts.push(to);
        edge_cuts.sort_by(|p, q| {
            (*p - from)
                .dot(d)
                .partial_cmp(&(*q - from).dot(d))
                .unwrap_or(Ordering::Equal)
        });
        edge_cuts.dedup();

        for pair in edge_cuts.windows(2) {
            let (a, b) = (vertices.id(pair[0]), vertices.id(pair[1]));
            if a != b && seen.insert((a.min(b), a.max(b))) {
                pieces.push((a, b));
            }
        }
    }

    pieces
}

/// Records where edges `i` and `j` cut each other. The same position is
/// pushed to both edges so that their pieces share vertices.
fn cut_pair(i: usize, j: usize, edges: &[(DPoint, DPoint)], cuts: &mut [Vec<DPoint>]) {
    let (a1, b1) = edges[i];
    let (a2, b2) = edges[j];
    let d1 = b1 - a1;
    let d2 = b2 - a2;
    let offset = a2 - a1;
    let denom = d1.cross(d2);

    if denom.abs() > PARALLEL_EPSILON * d1.length() * d2.length() {
        let t = offset.cross(d2) / denom;
        let u = offset.cross(d1) / denom;
        let outside = |s: f64| s < -PARAM_EPSILON || s > 1.0 + PARAM_EPSILON;
        if outside(t) || outside(u) {
            return;
        }

        // Endpoints are kept exact, the crossing of two edges is computed.
        let p = if t <= PARAM_EPSILON {
            a1
        } else if t >= 1.0 - PARAM_EPSILON {
            b1
        } else if u <= PARAM_EPSILON {
            a2
        } else if u >= 1.0 - PARAM_EPSILON {
            b2
        } else {
            a1 + d1 * t
        };

        cuts[i].push(p);
        cuts[j].push(p);
        return;
    }

    // Parallel edges only cut each other where they overlap.
    if offset.cross(d1).abs() > PARALLEL_EPSILON * d1.length() * offset.length() {
        return;
    }

    for &p in &[a2, b2] {
        if strictly_inside(p, a1, d1) {
            cuts[i].push(p);
        }
    }
    for &p in &[a1, b1] {
        if strictly_inside(p, a2, d2) {
            cuts[j].push(p);
        }
    }
}

fn strictly_inside(p: DPoint, from: DPoint, d: DVector) -> bool {
    let t = (p - from).dot(d) / d.square_length();
    t > PARAM_EPSILON && t < 1.0 - PARAM_EPSILON
}

/// Chains directed edges into closed rings.
///
/// At a vertex with several outgoing edges, the one with the smallest
/// clockwise turn from the incoming edge is taken, which keeps rings that
/// only touch at a vertex apart.
fn chain_rings(
    edges: &[(usize, usize)],
    positions: &[DPoint],
) -> Result<Vec<Vec<DPoint>>, OracleError> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); positions.len()];
    for (index, &(from, _)) in edges.iter().enumerate() {
        outgoing[from].push(index);
    }

    let direction = |edge: usize| positions[edges[edge].1] - positions[edges[edge].0];

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }

        let start = edges[first].0;
        let mut ring = vec![positions[start]];
        let mut current = first;
        loop {
            used[current] = true;
            let (from, to) = edges[current];
            if to == start {
                break;
            }

            ring.push(positions[to]);
            let back = positions[from] - positions[to];
            current = outgoing[to]
                .iter()
                .copied()
                .filter(|&edge| !used[edge])
                .min_by(|&a, &b| {
                    clockwise_angle(back, direction(a))
                        .partial_cmp(&clockwise_angle(back, direction(b)))
                        .unwrap_or(Ordering::Equal)
                })
                .ok_or_else(|| {
                    OracleError::Rejected(format!("open boundary at {:?}", positions[to]))
                })?;
        }

        rings.push(ring);
    }

    Ok(rings)
}

/// Rotation from `from` to `to` in the clockwise direction, in `(0, 2π]`.
fn clockwise_angle(from: DVector, to: DVector) -> f64 {
    let angle = (from.y.atan2(from.x) - to.y.atan2(to.x)).rem_euclid(TAU);
    if angle <= 0.0 {
        TAU
    } else {
        angle
    }
}

/// A point on the left of the longest edge of a ring.
fn beside_longest_edge(ring: &[DPoint], extent: f64) -> DPoint {
    let n = ring.len();
    let (from, to) = (0..n)
        .map(|i| (ring[i], ring[(i + 1) % n]))
        .max_by(|a, b| {
            (a.1 - a.0)
                .square_length()
                .partial_cmp(&(b.1 - b.0).square_length())
                .unwrap_or(Ordering::Equal)
        })
        .unwrap_or((ring[0], ring[0]));

    let d = to - from;
    let length = d.length();
    if length == 0.0 {
        return from;
    }

    from.lerp(to, 0.5) + vector(-d.y, d.x) / length * (extent * SIDE_OFFSET).min(length * 0.01)
}

fn is_filled_at(p: DPoint, rings: &[Vec<DPoint>], rule: FillRule) -> bool {
    let winding: i32 = rings.iter().map(|ring| winding_number(p, ring)).sum();
    match rule {
        FillRule::EvenOdd => winding % 2 != 0,
        FillRule::NonZero => winding != 0,
    }
}

fn winding_number(p: DPoint, ring: &[DPoint]) -> i32 {
    let mut winding = 0;
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let side = (b - a).cross(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }

    winding
}

fn point_in_polygon(p: DPoint, ring: &[DPoint]) -> bool {
    winding_number(p, ring) != 0
}

#[cfg(test)]
use crate::geom::point;

#[cfg(test)]
fn rect(x: f32, y: f32, w: f32, h: f32) -> Vec<Point<f32>> {
    vec![
        point(x, y),
        point(x + w, y),
        point(x + w, y + h),
        point(x, y + h),
    ]
}

#[cfg(test)]
fn polygons(contours: &[Vec<Point<f32>>], rule: FillRule) -> Vec<Polygon> {
    let contours: Vec<&[Point<f32>]> = contours.iter().map(|c| &c[..]).collect();
    fill_polygons(&contours, rule).unwrap()
}

#[cfg(test)]
fn filled_area(polygon: &Polygon) -> f64 {
    signed_area(&polygon.outer) + polygon.holes.iter().map(|h| signed_area(h)).sum::<f64>()
}

#[test]
fn crossing_squares() {
    let squares = [rect(0.0, 0.0, 10.0, 10.0), rect(3.0, 3.0, 10.0, 10.0)];

    let union = polygons(&squares, FillRule::NonZero);
    assert_eq!(union.len(), 1);
    assert!(union[0].holes.is_empty());
    assert!((filled_area(&union[0]) - 151.0).abs() < 1e-6);
    let has_vertex = |polygon: &Polygon, x: f64, y: f64| {
        polygon
            .outer
            .iter()
            .any(|p| (*p - point(x, y)).length() < 1e-9)
    };
    assert!(has_vertex(&union[0], 10.0, 3.0));
    assert!(has_vertex(&union[0], 3.0, 10.0));

    // The overlap is cut out, leaving two pieces that touch at the corners
    // of the overlap.
    let pieces = polygons(&squares, FillRule::EvenOdd);
    assert_eq!(pieces.len(), 2);
    for piece in &pieces {
        assert!(piece.holes.is_empty());
        assert!((filled_area(piece) - 51.0).abs() < 1e-6);
    }
}

#[test]
fn self_intersecting_contour() {
    let bowtie = vec![
        point(0.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 10.0),
    ];

    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let lobes = polygons(&[bowtie.clone()], rule);
        assert_eq!(lobes.len(), 2);
        for lobe in &lobes {
            assert_eq!(lobe.outer.len(), 3);
            assert!((filled_area(lobe) - 25.0).abs() < 1e-6);
        }
    }
}

#[test]
fn nested_contours() {
    let contours = [
        rect(0.0, 0.0, 30.0, 30.0),
        rect(5.0, 5.0, 20.0, 20.0),
        rect(10.0, 10.0, 10.0, 10.0),
    ];

    let mut even_odd = polygons(&contours, FillRule::EvenOdd);
    even_odd.sort_by_key(|polygon| polygon.holes.len());
    assert_eq!(even_odd.len(), 2);
    assert!((filled_area(&even_odd[0]) - 100.0).abs() < 1e-6);
    assert_eq!(even_odd[1].holes.len(), 1);
    assert!((filled_area(&even_odd[1]) - 500.0).abs() < 1e-6);

    // All three wind the same way.
    let non_zero = polygons(&contours, FillRule::NonZero);
    assert_eq!(non_zero.len(), 1);
    assert!((filled_area(&non_zero[0]) - 900.0).abs() < 1e-6);
}

#[test]
fn shared_edges_are_not_boundaries() {
    let contours = [rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 10.0, 10.0)];

    let merged = polygons(&contours, FillRule::NonZero);
    assert_eq!(merged.len(), 1);
    assert!((filled_area(&merged[0]) - 200.0).abs() < 1e-6);

    // Partial overlap of collinear edges.
    let contours = [rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 5.0, 10.0, 10.0)];
    let merged = polygons(&contours, FillRule::NonZero);
    assert_eq!(merged.len(), 1);
    assert!((filled_area(&merged[0]) - 200.0).abs() < 1e-6);
    assert!(merged[0].outer.contains(&point(10.0, 5.0)));
    assert!(!merged[0].outer.contains(&point(10.0, 7.5)));
}

#[test]
fn empty_input() {
    assert!(polygons(&[], FillRule::EvenOdd).is_empty());
}
