//! Chains of edges sharing one style, stored in an arena.
//!
//! A chain keeps its commands in record order. Reversing a chain only flips
//! its `reversed` flag, the buffers are never rewritten. Chains are linked
//! to their neighbours in a contour through `ChainId`s rather than
//! references, since the contour assembler splices them repeatedly.

use crate::math::Point;
use crate::twips::TwipPoint;

use std::ops::{Index, IndexMut};

/// Index of a chain in a [`ChainArena`](struct.ChainArena.html).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u32);

impl ChainId {
    #[inline]
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChainVerb {
    Line,
    Curve,
}

/// An edge of a chain, in pixels, in the chain's walking direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChainSegment {
    Line { from: Point, to: Point },
    Curve { from: Point, ctrl: Point, to: Point },
}

impl ChainSegment {
    pub fn from(&self) -> Point {
        match *self {
            ChainSegment::Line { from, .. } | ChainSegment::Curve { from, .. } => from,
        }
    }

    pub fn to(&self) -> Point {
        match *self {
            ChainSegment::Line { to, .. } | ChainSegment::Curve { to, .. } => to,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    verbs: Vec<ChainVerb>,
    points: Vec<TwipPoint>,
    morph_points: Option<Vec<TwipPoint>>,
    pub reversed: bool,
    pub prev: Option<ChainId>,
    pub next: Option<ChainId>,
}

impl Chain {
    /// A chain starting at `start`. `morph_start` is the position of the
    /// start at morph ratio 1, for morph shapes.
    pub fn new(start: TwipPoint, morph_start: Option<TwipPoint>, reversed: bool) -> Self {
        Chain {
            verbs: Vec::new(),
            points: vec![start],
            morph_points: morph_start.map(|p| vec![p]),
            reversed,
            prev: None,
            next: None,
        }
    }

    pub fn line_to(&mut self, to: TwipPoint, morph_to: Option<TwipPoint>) {
        self.verbs.push(ChainVerb::Line);
        self.points.push(to);
        if let Some(morph) = &mut self.morph_points {
            morph.push(morph_to.unwrap_or(to));
        }
    }

    pub fn curve_to(
        &mut self,
        ctrl: TwipPoint,
        to: TwipPoint,
        morph: Option<(TwipPoint, TwipPoint)>,
    ) {
        self.verbs.push(ChainVerb::Curve);
        self.points.push(ctrl);
        self.points.push(to);
        if let Some(morph_points) = &mut self.morph_points {
            let (morph_ctrl, morph_to) = morph.unwrap_or((ctrl, to));
            morph_points.push(morph_ctrl);
            morph_points.push(morph_to);
        }
    }

    /// Number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn has_morph(&self) -> bool {
        self.morph_points.is_some()
    }

    /// First point in walking order.
    #[inline]
    pub fn start(&self) -> TwipPoint {
        if self.reversed {
            self.last_point()
        } else {
            self.points[0]
        }
    }

    /// Last point in walking order.
    #[inline]
    pub fn end(&self) -> TwipPoint {
        if self.reversed {
            self.points[0]
        } else {
            self.last_point()
        }
    }

    #[inline]
    fn last_point(&self) -> TwipPoint {
        self.points[self.points.len() - 1]
    }

    #[inline]
    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Position of a stored point at a morph ratio, in pixels.
    ///
    /// `index` refers to storage order, not walking order.
    pub fn position(&self, index: usize, ratio: f32) -> Point {
        let start = self.points[index].to_pixels();
        match &self.morph_points {
            Some(morph) if ratio != 0.0 => {
                let end = morph[index].to_pixels();
                start.lerp(end, ratio)
            }
            _ => start,
        }
    }

    /// Calls `callback` on each edge in walking order.
    pub fn for_each_segment<F>(&self, ratio: f32, callback: &mut F)
    where
        F: FnMut(ChainSegment),
    {
        if self.reversed {
            let mut idx = self.points.len() - 1;
            for verb in self.verbs.iter().rev() {
                match verb {
                    ChainVerb::Line => {
                        callback(ChainSegment::Line {
                            from: self.position(idx, ratio),
                            to: self.position(idx - 1, ratio),
                        });
                        idx -= 1;
                    }
                    ChainVerb::Curve => {
                        callback(ChainSegment::Curve {
                            from: self.position(idx, ratio),
                            ctrl: self.position(idx - 1, ratio),
                            to: self.position(idx - 2, ratio),
                        });
                        idx -= 2;
                    }
                }
            }
        } else {
            let mut idx = 0;
            for verb in &self.verbs {
                match verb {
                    ChainVerb::Line => {
                        callback(ChainSegment::Line {
                            from: self.position(idx, ratio),
                            to: self.position(idx + 1, ratio),
                        });
                        idx += 1;
                    }
                    ChainVerb::Curve => {
                        callback(ChainSegment::Curve {
                            from: self.position(idx, ratio),
                            ctrl: self.position(idx + 1, ratio),
                            to: self.position(idx + 2, ratio),
                        });
                        idx += 2;
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn segments(&self, ratio: f32) -> Vec<ChainSegment> {
        let mut segments = Vec::with_capacity(self.len());
        self.for_each_segment(ratio, &mut |segment| segments.push(segment));
        segments
    }
}

/// Owns the chains of a shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainArena {
    chains: Vec<Chain>,
}

impl ChainArena {
    pub fn new() -> Self {
        ChainArena { chains: Vec::new() }
    }

    pub fn add(&mut self, chain: Chain) -> ChainId {
        let id = ChainId(self.chains.len() as u32);
        self.chains.push(chain);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Index<ChainId> for ChainArena {
    type Output = Chain;
    #[inline]
    fn index(&self, id: ChainId) -> &Chain {
        &self.chains[id.to_usize()]
    }
}

impl IndexMut<ChainId> for ChainArena {
    #[inline]
    fn index_mut(&mut self, id: ChainId) -> &mut Chain {
        &mut self.chains[id.to_usize()]
    }
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn tp(x: i32, y: i32) -> TwipPoint {
    TwipPoint::new(x, y)
}

#[test]
fn reversing_swaps_start_and_end() {
    let mut chain = Chain::new(tp(0, 0), None, false);
    chain.line_to(tp(20, 0), None);
    chain.curve_to(tp(40, 0), tp(40, 20), None);

    assert_eq!(chain.start(), tp(0, 0));
    assert_eq!(chain.end(), tp(40, 20));
    assert_eq!(chain.len(), 2);

    chain.reverse();
    assert_eq!(chain.start(), tp(40, 20));
    assert_eq!(chain.end(), tp(0, 0));

    assert_eq!(
        chain.segments(0.0),
        vec![
            ChainSegment::Curve {
                from: point(2.0, 1.0),
                ctrl: point(2.0, 0.0),
                to: point(1.0, 0.0),
            },
            ChainSegment::Line {
                from: point(1.0, 0.0),
                to: point(0.0, 0.0),
            },
        ]
    );
}

#[test]
fn morph_positions() {
    let mut chain = Chain::new(tp(0, 0), Some(tp(20, 20)), false);
    chain.line_to(tp(40, 0), Some(tp(80, 40)));

    assert!(chain.has_morph());
    assert_eq!(chain.position(1, 0.0), point(2.0, 0.0));
    assert_eq!(chain.position(1, 1.0), point(4.0, 2.0));
    assert_eq!(chain.position(1, 0.5), point(3.0, 1.0));
    assert_eq!(
        chain.segments(0.5),
        vec![ChainSegment::Line {
            from: point(0.5, 0.5),
            to: point(3.0, 1.0),
        }]
    );
}

#[test]
fn arena_indexing() {
    let mut arena = ChainArena::new();
    let a = arena.add(Chain::new(tp(0, 0), None, false));
    let b = arena.add(Chain::new(tp(1, 1), None, true));

    arena[a].next = Some(b);
    arena[b].prev = Some(a);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena[a].next, Some(b));
    assert!(arena[b].reversed);
    assert!(!arena.is_empty());
}
