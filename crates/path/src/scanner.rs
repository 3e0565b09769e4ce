//! Splitting shape records into per-style chains.
//!
//! The [`ShapeScanner`](struct.ShapeScanner.html) walks the records of a
//! shape in order, keeping track of the pen position and of the three
//! active style slots (`fill_style_0`, `fill_style_1` and `line_style`).
//! Each edge is appended to one open chain per non-empty slot. A style
//! change record closes the chains of the slots it changes, or all of them
//! when it moves the pen or installs a new style table.
//!
//! The resulting chains are grouped per style into
//! [`ContourSet`s](struct.ContourSet.html), in the order in which the styles
//! are first used, and can then be stitched with
//! [`assemble_contours`](../contour/fn.assemble_contours.html).
//!
//! ## Morph shapes
//!
//! When the shape has morph records, the n-th edge of the shape is paired
//! with the n-th edge of the morph records and the n-th move with the n-th
//! morph move. Each chain then carries the morph end state of its points.

use crate::chain::{Chain, ChainArena, ChainId};
use crate::contour::{assemble_contours, Contour};
use crate::records::{EdgeCommand, ShapeDefinition, ShapeRecord, StyleChange};
use crate::style::{FillStyle, StrokeStyle, StyleTable};
use crate::twips::TwipPoint;

use std::collections::HashMap;
use std::sync::Arc;

/// Identifies a style across the style tables of a shape.
///
/// `table` is 0 for the shape's own table and is incremented each time a
/// style change record installs a new table, so that indices of different
/// tables never alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StyleKey {
    pub table: u16,
    pub index: u32,
}

/// The chains of one style.
#[derive(Clone, Debug, PartialEq)]
pub struct ContourSet<Style> {
    pub key: StyleKey,
    pub style: Arc<Style>,
    pub chains: Vec<ChainId>,
}

impl<Style> ContourSet<Style> {
    /// Stitches the chains of this set into contours.
    pub fn assemble(&self, arena: &mut ChainArena) -> Vec<Contour> {
        assemble_contours(arena, &self.chains)
    }
}

/// The chains of a shape, grouped per style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeContours {
    pub arena: ChainArena,
    pub fills: Vec<ContourSet<FillStyle>>,
    pub strokes: Vec<ContourSet<StrokeStyle>>,
    /// True if the chains carry morph coordinates.
    pub is_morph: bool,
    /// True if the morph records did not match the shape records.
    pub morph_mismatch: bool,
}

impl ShapeContours {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.strokes.is_empty()
    }
}

// Indices into the slot arrays.
const FILL_0: usize = 0;
const FILL_1: usize = 1;
const LINE: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Segment {
    Line(TwipPoint),
    Curve(TwipPoint, TwipPoint),
}

impl Segment {
    fn to(self) -> TwipPoint {
        match self {
            Segment::Line(to) | Segment::Curve(_, to) => to,
        }
    }
}

/// The end state of the positional commands of a morph shape.
struct MorphStream {
    moves: Vec<TwipPoint>,
    edges: Vec<Segment>,
    next_move: usize,
    next_edge: usize,
    pen: TwipPoint,
    mismatch: bool,
}

impl MorphStream {
    fn new(records: &[ShapeRecord], expected_moves: usize, expected_edges: usize) -> Self {
        let mut moves = Vec::new();
        let mut edges = Vec::new();
        for record in records {
            match record {
                ShapeRecord::StyleChange(StyleChange {
                    move_to: Some(to), ..
                })
                | ShapeRecord::Edge(EdgeCommand::MoveTo(to)) => {
                    moves.push(*to);
                }
                ShapeRecord::Edge(EdgeCommand::LineTo(to)) => {
                    edges.push(Segment::Line(*to));
                }
                ShapeRecord::Edge(EdgeCommand::CurveTo { ctrl, to }) => {
                    edges.push(Segment::Curve(*ctrl, *to));
                }
                ShapeRecord::StyleChange(_) => {}
            }
        }

        let mismatch = moves.len() != expected_moves || edges.len() != expected_edges;
        if mismatch {
            log::warn!(
                "morph records do not match the shape: {} moves and {} edges, expected {} and {}",
                moves.len(),
                edges.len(),
                expected_moves,
                expected_edges,
            );
        }

        MorphStream {
            moves,
            edges,
            next_move: 0,
            next_edge: 0,
            pen: TwipPoint::ZERO,
            mismatch,
        }
    }

    fn move_to(&mut self, fallback: TwipPoint) -> TwipPoint {
        let to = pick(&self.moves, self.next_move).unwrap_or(fallback);
        self.next_move += 1;
        self.pen = to;
        to
    }

    /// Pairs the next edge with its morph edge, promoting lines to curves
    /// when the two kinds differ.
    fn edge(&mut self, from: TwipPoint, segment: Segment) -> (Segment, Segment) {
        let morph_from = self.pen;
        let morph = pick(&self.edges, self.next_edge).unwrap_or(segment);
        self.next_edge += 1;
        self.pen = morph.to();

        match (segment, morph) {
            (Segment::Line(to), Segment::Curve(..)) => {
                (Segment::Curve(from.midpoint(to), to), morph)
            }
            (Segment::Curve(..), Segment::Line(to)) => {
                (segment, Segment::Curve(morph_from.midpoint(to), to))
            }
            _ => (segment, morph),
        }
    }
}

// Past the end of the stream the last command is reused.
fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    items.get(index).or_else(|| items.last()).copied()
}

/// Turns the records of a shape into chains grouped per style.
pub struct ShapeScanner<'l> {
    table: &'l StyleTable,
    generation: u16,
    slots: [u32; 3],
    open: [Option<ChainId>; 3],
    pen: TwipPoint,
    morph: Option<MorphStream>,
    fill_sets: HashMap<StyleKey, usize>,
    stroke_sets: HashMap<StyleKey, usize>,
    output: ShapeContours,
}

impl<'l> ShapeScanner<'l> {
    pub fn scan(shape: &'l ShapeDefinition) -> ShapeContours {
        let morph = shape.morph_records.as_ref().map(|records| {
            let (moves, edges) = count_positional(&shape.records);
            MorphStream::new(records, moves, edges)
        });

        let mut scanner = ShapeScanner {
            table: &shape.styles,
            generation: 0,
            slots: [0; 3],
            open: [None; 3],
            pen: TwipPoint::ZERO,
            morph,
            fill_sets: HashMap::new(),
            stroke_sets: HashMap::new(),
            output: ShapeContours::default(),
        };

        for record in &shape.records {
            match record {
                ShapeRecord::StyleChange(change) => scanner.style_change(change),
                ShapeRecord::Edge(EdgeCommand::MoveTo(to)) => scanner.edge_move_to(*to),
                ShapeRecord::Edge(EdgeCommand::LineTo(to)) => {
                    scanner.edge(Segment::Line(*to));
                }
                ShapeRecord::Edge(EdgeCommand::CurveTo { ctrl, to }) => {
                    scanner.edge(Segment::Curve(*ctrl, *to));
                }
            }
        }

        scanner.finish()
    }

    fn style_change(&mut self, change: &'l StyleChange) {
        if change.move_to.is_some() || change.new_styles.is_some() {
            self.close_chains();
        }

        if let Some(table) = &change.new_styles {
            self.table = table;
            self.generation = self.generation.wrapping_add(1);
            self.slots = [0; 3];
            log::trace!("style table generation {}", self.generation);
        }

        if let Some(to) = change.move_to {
            self.move_pen(to);
        }

        if let Some(index) = change.fill_style_0 {
            let index = self.checked_fill(index);
            self.set_slot(FILL_0, index);
        }
        if let Some(index) = change.fill_style_1 {
            let index = self.checked_fill(index);
            self.set_slot(FILL_1, index);
        }
        if let Some(index) = change.line_style {
            let index = self.checked_line(index);
            self.set_slot(LINE, index);
        }
    }

    /// The open chain of a slot continues while its style stays the same.
    fn set_slot(&mut self, slot: usize, index: u32) {
        if self.slots[slot] != index {
            self.slots[slot] = index;
            self.open[slot] = None;
        }
    }

    fn checked_fill(&self, index: u32) -> u32 {
        if index != 0 && self.table.fill(index).is_none() {
            log::debug!(
                "fill style {} is out of range ({} fills), ignoring it",
                index,
                self.table.fills.len()
            );
            return 0;
        }

        index
    }

    fn checked_line(&self, index: u32) -> u32 {
        if index != 0 && self.table.line(index).is_none() {
            log::debug!(
                "line style {} is out of range ({} lines), ignoring it",
                index,
                self.table.lines.len()
            );
            return 0;
        }

        index
    }

    fn edge_move_to(&mut self, to: TwipPoint) {
        if self.open.iter().any(Option::is_some) {
            log::error!("move_to {:?} in the middle of a chain, skipping it", to);
            // Keep the morph moves aligned with the shape's.
            if let Some(morph) = &mut self.morph {
                morph.next_move += 1;
            }
            return;
        }

        self.move_pen(to);
    }

    fn move_pen(&mut self, to: TwipPoint) {
        self.pen = to;
        if let Some(morph) = &mut self.morph {
            morph.move_to(to);
        }
    }

    fn edge(&mut self, segment: Segment) {
        let from = self.pen;
        let morph_from = self.morph.as_ref().map(|morph| morph.pen);
        let (segment, morph) = match &mut self.morph {
            Some(stream) => {
                let (segment, morph) = stream.edge(from, segment);
                (segment, Some(morph))
            }
            None => (segment, None),
        };

        let fill_0 = self.slots[FILL_0];
        let fill_1 = self.slots[FILL_1];
        // An edge with the same fill on both sides is an interior seam.
        let seam = fill_0 == fill_1;

        if seam {
            self.open[FILL_0] = None;
            self.open[FILL_1] = None;
        } else {
            if fill_0 != 0 {
                self.append(FILL_0, from, morph_from, segment, morph);
            }
            if fill_1 != 0 {
                self.append(FILL_1, from, morph_from, segment, morph);
            }
        }
        if self.slots[LINE] != 0 {
            self.append(LINE, from, morph_from, segment, morph);
        }

        self.pen = segment.to();
    }

    fn append(
        &mut self,
        slot: usize,
        from: TwipPoint,
        morph_from: Option<TwipPoint>,
        segment: Segment,
        morph: Option<Segment>,
    ) {
        let id = match self.open[slot] {
            Some(id) => id,
            None => {
                let id = self
                    .output
                    .arena
                    .add(Chain::new(from, morph_from, slot == FILL_0));
                self.add_to_set(slot, id);
                self.open[slot] = Some(id);
                id
            }
        };

        let chain = &mut self.output.arena[id];
        match (segment, morph) {
            (Segment::Line(to), Some(Segment::Line(morph_to))) => chain.line_to(to, Some(morph_to)),
            (Segment::Line(to), _) => chain.line_to(to, None),
            (Segment::Curve(ctrl, to), Some(Segment::Curve(morph_ctrl, morph_to))) => {
                chain.curve_to(ctrl, to, Some((morph_ctrl, morph_to)))
            }
            (Segment::Curve(ctrl, to), _) => chain.curve_to(ctrl, to, None),
        }
    }

    fn add_to_set(&mut self, slot: usize, id: ChainId) {
        let key = StyleKey {
            table: self.generation,
            index: self.slots[slot],
        };

        if slot == LINE {
            let set = match self.stroke_sets.get(&key) {
                Some(&set) => set,
                None => match self.table.line(key.index) {
                    Some(style) => {
                        let set = self.output.strokes.len();
                        self.output.strokes.push(ContourSet {
                            key,
                            style: Arc::clone(style),
                            chains: Vec::new(),
                        });
                        self.stroke_sets.insert(key, set);
                        set
                    }
                    None => return,
                },
            };
            self.output.strokes[set].chains.push(id);
        } else {
            let set = match self.fill_sets.get(&key) {
                Some(&set) => set,
                None => match self.table.fill(key.index) {
                    Some(style) => {
                        let set = self.output.fills.len();
                        self.output.fills.push(ContourSet {
                            key,
                            style: Arc::clone(style),
                            chains: Vec::new(),
                        });
                        self.fill_sets.insert(key, set);
                        set
                    }
                    None => return,
                },
            };
            self.output.fills[set].chains.push(id);
        }
    }

    fn close_chains(&mut self) {
        self.open = [None; 3];
    }

    fn finish(mut self) -> ShapeContours {
        self.close_chains();
        if let Some(morph) = &self.morph {
            self.output.is_morph = true;
            self.output.morph_mismatch = morph.mismatch;
        }

        log::trace!(
            "scanned {} chains, {} fill sets, {} stroke sets",
            self.output.arena.len(),
            self.output.fills.len(),
            self.output.strokes.len()
        );

        self.output
    }
}

fn count_positional(records: &[ShapeRecord]) -> (usize, usize) {
    let mut moves = 0;
    let mut edges = 0;
    for record in records {
        match record {
            ShapeRecord::StyleChange(StyleChange {
                move_to: Some(..), ..
            })
            | ShapeRecord::Edge(EdgeCommand::MoveTo(..)) => moves += 1,
            ShapeRecord::Edge(..) => edges += 1,
            ShapeRecord::StyleChange(..) => {}
        }
    }

    (moves, edges)
}

#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::style::Color;

#[cfg(test)]
fn two_fills() -> (StyleTable, u32, u32) {
    let mut table = StyleTable::new();
    let red = table.add_fill(FillStyle::solid(Color::from_rgb(0xff0000, 255)));
    let blue = table.add_fill(FillStyle::solid(Color::from_rgb(0x0000ff, 255)));
    (table, red, blue)
}

#[cfg(test)]
fn square(x: i32, y: i32, size: i32) -> Vec<ShapeRecord> {
    vec![
        ShapeRecord::line_to(x + size, y),
        ShapeRecord::line_to(x + size, y + size),
        ShapeRecord::line_to(x, y + size),
        ShapeRecord::line_to(x, y),
    ]
}

#[test]
fn fill_sides() {
    let (table, red, blue) = two_fills();
    let mut records = vec![ShapeRecord::StyleChange(
        StyleChange::new()
            .with_move_to(TwipPoint::new(0, 0))
            .with_fill_style_0(red)
            .with_fill_style_1(blue),
    )];
    records.extend(square(0, 0, 200));

    let shape = ShapeDefinition::new(table, records);
    let mut contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.fills.len(), 2);
    assert!(contours.strokes.is_empty());
    assert_eq!(contours.fills[0].key, StyleKey { table: 0, index: red });
    assert_eq!(contours.fills[1].key, StyleKey { table: 0, index: blue });

    let red_chain = contours.fills[0].chains[0];
    let blue_chain = contours.fills[1].chains[0];
    assert!(contours.arena[red_chain].reversed);
    assert!(!contours.arena[blue_chain].reversed);
    assert_eq!(contours.arena[red_chain].len(), 4);

    let set = contours.fills[1].clone();
    let assembled = set.assemble(&mut contours.arena);
    assert_eq!(assembled.len(), 1);
    assert!(assembled[0].closed);
}

#[test]
fn same_fill_on_both_sides_is_a_seam() {
    let (table, red, _) = two_fills();
    let mut records = vec![ShapeRecord::StyleChange(
        StyleChange::new().with_fill_style_1(red),
    )];
    records.extend(square(0, 0, 200));
    // The seam splitting the square in two halves.
    records.push(ShapeRecord::StyleChange(
        StyleChange::new()
            .with_move_to(TwipPoint::new(100, 0))
            .with_fill_style_0(red)
            .with_fill_style_1(red),
    ));
    records.push(ShapeRecord::line_to(100, 200));

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.fills.len(), 1);
    assert_eq!(contours.fills[0].chains.len(), 1);
    assert_eq!(contours.arena.len(), 1);
}

#[test]
fn out_of_range_styles_are_ignored() {
    let (table, red, _) = two_fills();
    let mut records = vec![ShapeRecord::StyleChange(
        StyleChange::new()
            .with_fill_style_0(7)
            .with_fill_style_1(red)
            .with_line_style(3),
    )];
    records.extend(square(0, 0, 100));

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.fills.len(), 1);
    assert_eq!(contours.fills[0].key.index, red);
    assert!(contours.strokes.is_empty());
}

#[test]
fn move_to_inside_a_chain_is_skipped() {
    let (mut table, red, _) = two_fills();
    let line = table.add_line(StrokeStyle::new(1.0, Color::BLACK));
    let records = vec![
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_1(red).with_line_style(line)),
        ShapeRecord::line_to(100, 0),
        ShapeRecord::move_to(500, 500),
        ShapeRecord::line_to(100, 100),
    ];

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.strokes.len(), 1);
    let chain = &contours.arena[contours.strokes[0].chains[0]];
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.start(), TwipPoint::new(0, 0));
    assert_eq!(chain.end(), TwipPoint::new(100, 100));
}

#[test]
fn move_to_between_runs_places_the_pen() {
    let (table, red, _) = two_fills();
    let records = vec![
        ShapeRecord::move_to(40, 40),
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_1(red)),
        ShapeRecord::line_to(80, 40),
    ];

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);
    let chain = &contours.arena[contours.fills[0].chains[0]];
    assert_eq!(chain.start(), TwipPoint::new(40, 40));
}

#[test]
fn unchanged_slots_keep_their_chain() {
    let (mut table, red, blue) = two_fills();
    let line = table.add_line(StrokeStyle::new(1.0, Color::BLACK));
    let records = vec![
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_1(red).with_line_style(line)),
        ShapeRecord::line_to(100, 0),
        // Only the stroke changes.
        ShapeRecord::StyleChange(StyleChange::new().with_line_style(0)),
        ShapeRecord::line_to(100, 100),
        // Sets the fill it already has and starts a fill on the other side.
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_1(red).with_fill_style_0(blue)),
        ShapeRecord::line_to(0, 100),
        ShapeRecord::line_to(0, 0),
    ];

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.fills.len(), 2);
    assert_eq!(contours.fills[0].key.index, red);
    assert_eq!(contours.fills[0].chains.len(), 1);
    let chain = &contours.arena[contours.fills[0].chains[0]];
    assert_eq!(chain.len(), 4);
    assert_eq!(chain.start(), TwipPoint::new(0, 0));
    assert_eq!(chain.end(), TwipPoint::new(0, 0));

    let stroke = &contours.arena[contours.strokes[0].chains[0]];
    assert_eq!(stroke.len(), 1);

    let blue_chain = &contours.arena[contours.fills[1].chains[0]];
    assert_eq!(blue_chain.len(), 2);
    assert!(blue_chain.reversed);
    assert_eq!(blue_chain.start(), TwipPoint::new(0, 0));
    assert_eq!(blue_chain.end(), TwipPoint::new(100, 100));
}

#[test]
fn seams_break_the_fill_chain() {
    let (table, red, _) = two_fills();
    let records = vec![
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_1(red)),
        ShapeRecord::line_to(100, 0),
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_0(red)),
        ShapeRecord::line_to(100, 100),
        ShapeRecord::StyleChange(StyleChange::new().with_fill_style_0(0)),
        ShapeRecord::line_to(0, 100),
    ];

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    let chains = &contours.fills[0].chains;
    assert_eq!(chains.len(), 2);
    assert_eq!(contours.arena[chains[0]].end(), TwipPoint::new(100, 0));
    assert_eq!(contours.arena[chains[1]].start(), TwipPoint::new(100, 100));
}

#[test]
fn new_style_tables_do_not_alias() {
    let (table, red, _) = two_fills();
    let (other_table, other_red, _) = two_fills();
    assert_eq!(red, other_red);

    let mut records = vec![ShapeRecord::StyleChange(
        StyleChange::new().with_fill_style_1(red),
    )];
    records.extend(square(0, 0, 100));
    records.push(ShapeRecord::StyleChange(
        StyleChange::new()
            .with_new_styles(other_table)
            .with_move_to(TwipPoint::new(500, 0)),
    ));
    // The slots were reset by the new table.
    records.extend(square(500, 0, 100));
    records.push(ShapeRecord::StyleChange(
        StyleChange::new().with_fill_style_1(other_red),
    ));
    records.extend(square(500, 0, 100));

    let shape = ShapeDefinition::new(table, records);
    let contours = ShapeScanner::scan(&shape);

    assert_eq!(contours.fills.len(), 2);
    assert_eq!(contours.fills[0].key, StyleKey { table: 0, index: red });
    assert_eq!(contours.fills[1].key, StyleKey { table: 1, index: other_red });
    assert_eq!(contours.arena.len(), 2);
}

#[test]
fn morph_pairing() {
    let (table, red, _) = two_fills();
    let records = vec![
        ShapeRecord::StyleChange(
            StyleChange::new()
                .with_move_to(TwipPoint::new(0, 0))
                .with_fill_style_1(red),
        ),
        ShapeRecord::line_to(200, 0),
        ShapeRecord::curve_to(200, 200, 0, 200),
    ];
    let morph = vec![
        ShapeRecord::StyleChange(StyleChange::new().with_move_to(TwipPoint::new(20, 0))),
        ShapeRecord::curve_to(100, 100, 220, 0),
        ShapeRecord::line_to(20, 200),
    ];

    let shape = ShapeDefinition::new(table, records).with_morph_records(morph);
    let contours = ShapeScanner::scan(&shape);
    assert!(contours.is_morph);
    assert!(!contours.morph_mismatch);

    let chain = &contours.arena[contours.fills[0].chains[0]];
    assert!(chain.has_morph());
    let start = chain.segments(0.0);
    let end = chain.segments(1.0);
    assert_eq!(start.len(), 2);
    assert_eq!(end.len(), 2);

    // The line was promoted to a curve with its control point in the middle.
    match start[0] {
        crate::ChainSegment::Curve { ctrl, .. } => assert_eq!(ctrl, point(5.0, 0.0)),
        other => panic!("unexpected segment {:?}", other),
    }
    // And so was the morph line.
    match end[1] {
        crate::ChainSegment::Curve { from, ctrl, to } => {
            assert_eq!(from, point(11.0, 0.0));
            assert_eq!(to, point(1.0, 10.0));
            assert_eq!(ctrl, point(6.0, 5.0));
        }
        other => panic!("unexpected segment {:?}", other),
    }
}

#[test]
fn short_morph_reuses_the_last_command() {
    let (table, red, _) = two_fills();
    let mut records = vec![ShapeRecord::StyleChange(
        StyleChange::new().with_fill_style_1(red),
    )];
    records.extend(square(0, 0, 200));
    let morph = vec![ShapeRecord::line_to(400, 0)];

    let shape = ShapeDefinition::new(table, records).with_morph_records(morph);
    let contours = ShapeScanner::scan(&shape);
    assert!(contours.morph_mismatch);

    let chain = &contours.arena[contours.fills[0].chains[0]];
    for segment in chain.segments(1.0).iter().skip(1) {
        assert_eq!(segment.to(), point(20.0, 0.0));
    }
}
