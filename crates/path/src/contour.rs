//! Stitching of chains into contours.
//!
//! The chains of one style arrive in no particular order and in no particular
//! direction. The assembler grows a run from one chain, attaching any chain
//! whose endpoint coincides with the start of the run's head or the end of
//! the run's tail. The checks happen in this order for each candidate:
//!
//! 1. candidate start == head start: reverse the candidate and prepend it,
//! 2. candidate end == head start: prepend it,
//! 3. candidate end == tail end: reverse the candidate and append it,
//! 4. candidate start == tail end: append it.
//!
//! After each attachment the scan restarts from the first remaining chain.
//! When nothing attaches anymore the run is emitted as a contour and a new
//! run starts from the next remaining chain.
//!
//! Endpoints are compared exactly, in twips, before anything is flattened.

use crate::builder::PathBuilder;
use crate::chain::{ChainArena, ChainId, ChainSegment};

/// A run of chains linked head to tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    /// The chains in walking order.
    pub chains: Vec<ChainId>,
    /// Whether the start of the first chain is the end of the last one.
    pub closed: bool,
}

impl Contour {
    /// Calls `callback` on each edge of the contour, in walking order.
    pub fn for_each_segment<F>(&self, arena: &ChainArena, ratio: f32, callback: &mut F)
    where
        F: FnMut(ChainSegment),
    {
        for &id in &self.chains {
            arena[id].for_each_segment(ratio, callback);
        }
    }

    /// Replays the contour into a path builder.
    ///
    /// Gaps between chains, which only happen at morph ratios other than
    /// zero when the two morph states disagree, are bridged with lines.
    pub fn build_into(&self, arena: &ChainArena, ratio: f32, builder: &mut PathBuilder) {
        let mut started = false;
        self.for_each_segment(arena, ratio, &mut |segment| {
            if !started {
                builder.move_to(segment.from());
                started = true;
            } else if builder.current_position() != segment.from() {
                builder.line_to(segment.from());
            }

            match segment {
                ChainSegment::Line { to, .. } => builder.line_to(to),
                ChainSegment::Curve { ctrl, to, .. } => builder.curve_to(ctrl, to),
            }
        });
        builder.end_sub_path();
    }
}

/// Stitches the chains of one style into contours.
///
/// Empty chains are ignored. The links (`prev`/`next`) and `reversed` flags of
/// the chains are updated in the arena.
pub fn assemble_contours(arena: &mut ChainArena, chains: &[ChainId]) -> Vec<Contour> {
    let mut remaining: Vec<ChainId> = chains
        .iter()
        .copied()
        .filter(|&id| !arena[id].is_empty())
        .collect();

    for &id in &remaining {
        arena[id].prev = None;
        arena[id].next = None;
    }

    let mut contours = Vec::new();

    while !remaining.is_empty() {
        let first = remaining.remove(0);
        let mut head = first;
        let mut tail = first;

        loop {
            let head_start = arena[head].start();
            let tail_end = arena[tail].end();

            let mut attached = false;
            for i in 0..remaining.len() {
                let candidate = remaining[i];
                let start = arena[candidate].start();
                let end = arena[candidate].end();

                if start == head_start {
                    arena[candidate].reverse();
                    link(arena, candidate, head);
                    head = candidate;
                } else if end == head_start {
                    link(arena, candidate, head);
                    head = candidate;
                } else if end == tail_end {
                    arena[candidate].reverse();
                    link(arena, tail, candidate);
                    tail = candidate;
                } else if start == tail_end {
                    link(arena, tail, candidate);
                    tail = candidate;
                } else {
                    continue;
                }

                remaining.remove(i);
                attached = true;
                break;
            }

            if !attached {
                break;
            }
        }

        let closed = arena[head].start() == arena[tail].end();

        let mut ids = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            ids.push(id);
            current = arena[id].next;
        }

        contours.push(Contour { chains: ids, closed });
    }

    contours
}

fn link(arena: &mut ChainArena, before: ChainId, after: ChainId) {
    arena[before].next = Some(after);
    arena[after].prev = Some(before);
}

#[cfg(test)]
use crate::chain::Chain;
#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::twips::TwipPoint;

#[cfg(test)]
fn line_chain(arena: &mut ChainArena, points: &[(i32, i32)], reversed: bool) -> ChainId {
    let mut chain = Chain::new(TwipPoint::new(points[0].0, points[0].1), None, reversed);
    for p in &points[1..] {
        chain.line_to(TwipPoint::new(p.0, p.1), None);
    }
    arena.add(chain)
}

#[cfg(test)]
fn contour_points(arena: &ChainArena, contour: &Contour) -> Vec<(f32, f32)> {
    let mut points = Vec::new();
    contour.for_each_segment(arena, 0.0, &mut |segment| {
        if points.is_empty() {
            let from = segment.from();
            points.push((from.x, from.y));
        }
        let to = segment.to();
        points.push((to.x, to.y));
    });
    points
}

#[test]
fn square_from_scattered_edges() {
    let mut arena = ChainArena::new();
    // Four sides of a square, out of order and with mixed directions.
    let right = line_chain(&mut arena, &[(200, 0), (200, 200)], false);
    let left = line_chain(&mut arena, &[(0, 0), (0, 200)], false);
    let top = line_chain(&mut arena, &[(0, 0), (200, 0)], false);
    let bottom = line_chain(&mut arena, &[(200, 200), (0, 200)], false);

    let contours = assemble_contours(&mut arena, &[right, left, top, bottom]);
    assert_eq!(contours.len(), 1);
    assert!(contours[0].closed);
    assert_eq!(contours[0].chains.len(), 4);

    let points = contour_points(&arena, &contours[0]);
    assert_eq!(points.len(), 5);
    assert_eq!(points.first(), points.last());

    // Consecutive edges share their endpoints.
    let mut prev_end = None;
    for &id in &contours[0].chains {
        if let Some(end) = prev_end {
            assert_eq!(arena[id].start(), end);
        }
        prev_end = Some(arena[id].end());
    }
}

#[test]
fn tie_break_order() {
    let mut arena = ChainArena::new();
    let first = line_chain(&mut arena, &[(0, 0), (20, 0)], false);
    // Starts where the run starts: reversed and prepended.
    let a = line_chain(&mut arena, &[(0, 0), (0, 20)], false);
    // Ends where the run ends: reversed and appended.
    let b = line_chain(&mut arena, &[(40, 40), (20, 0)], false);

    let contours = assemble_contours(&mut arena, &[first, a, b]);
    assert_eq!(contours.len(), 1);
    assert!(!contours[0].closed);
    assert_eq!(contours[0].chains, vec![a, first, b]);
    assert!(arena[a].reversed);
    assert!(!arena[first].reversed);
    assert!(arena[b].reversed);

    assert_eq!(
        contour_points(&arena, &contours[0]),
        vec![(0.0, 1.0), (0.0, 0.0), (1.0, 0.0), (2.0, 2.0)]
    );
}

#[test]
fn scan_restarts_after_each_attachment() {
    let mut arena = ChainArena::new();
    let first = line_chain(&mut arena, &[(0, 0), (20, 0)], false);
    // Only reachable once `middle` is attached.
    let last = line_chain(&mut arena, &[(40, 0), (60, 0)], false);
    let middle = line_chain(&mut arena, &[(20, 0), (40, 0)], false);

    let contours = assemble_contours(&mut arena, &[first, last, middle]);
    assert_eq!(contours.len(), 1);
    assert_eq!(contours[0].chains, vec![first, middle, last]);
}

#[test]
fn disjoint_runs_become_separate_contours() {
    let mut arena = ChainArena::new();
    let a = line_chain(&mut arena, &[(0, 0), (20, 0), (20, 20), (0, 0)], false);
    let b = line_chain(&mut arena, &[(100, 100), (120, 100)], true);
    let empty = arena.add(Chain::new(TwipPoint::new(5, 5), None, false));

    let contours = assemble_contours(&mut arena, &[a, b, empty]);
    assert_eq!(contours.len(), 2);
    assert!(contours[0].closed);
    assert!(!contours[1].closed);
    assert_eq!(contours[1].chains, vec![b]);
}

#[test]
fn contour_to_path() {
    let mut arena = ChainArena::new();
    let mut curve = Chain::new(TwipPoint::new(0, 0), None, false);
    curve.curve_to(TwipPoint::new(100, 0), TwipPoint::new(100, 100), None);
    let curve = arena.add(curve);
    let back = line_chain(&mut arena, &[(0, 0), (100, 100)], true);

    let contours = assemble_contours(&mut arena, &[curve, back]);
    assert_eq!(contours.len(), 1);
    assert!(contours[0].closed);

    let mut builder = PathBuilder::new();
    contours[0].build_into(&arena, 0.0, &mut builder);
    let path = builder.build();
    assert_eq!(path.edge_count(), 2);
    assert_eq!(path.sub_path_count(), 1);
    assert_eq!(path.points()[0], point(0.0, 0.0));
}
