//! The decoded form of a shape: style changes and edges, in twips.

use crate::style::StyleTable;
use crate::twips::TwipPoint;

/// A positional command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum EdgeCommand {
    MoveTo(TwipPoint),
    LineTo(TwipPoint),
    CurveTo { ctrl: TwipPoint, to: TwipPoint },
}

impl EdgeCommand {
    /// The position of the pen after this command.
    #[inline]
    pub fn to(&self) -> TwipPoint {
        match *self {
            EdgeCommand::MoveTo(to) | EdgeCommand::LineTo(to) | EdgeCommand::CurveTo { to, .. } => {
                to
            }
        }
    }

    #[inline]
    pub fn is_edge(&self) -> bool {
        match self {
            EdgeCommand::MoveTo(..) => false,
            _ => true,
        }
    }
}

/// Starts a new style run.
///
/// Style indices are 1-based indices into the active style table, `0` means
/// no style. `None` leaves the slot as it was.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StyleChange {
    pub move_to: Option<TwipPoint>,
    /// Fill on the side of the edges that the contour assembler walks
    /// backwards.
    pub fill_style_0: Option<u32>,
    /// Fill on the side of the edges that is walked in record order.
    pub fill_style_1: Option<u32>,
    pub line_style: Option<u32>,
    /// Replaces the active style table. Slots that are not set by this
    /// record are reset to 0.
    pub new_styles: Option<StyleTable>,
}

impl StyleChange {
    pub fn new() -> Self {
        StyleChange::default()
    }

    #[inline]
    pub fn with_move_to(mut self, to: TwipPoint) -> Self {
        self.move_to = Some(to);
        self
    }

    #[inline]
    pub fn with_fill_style_0(mut self, index: u32) -> Self {
        self.fill_style_0 = Some(index);
        self
    }

    #[inline]
    pub fn with_fill_style_1(mut self, index: u32) -> Self {
        self.fill_style_1 = Some(index);
        self
    }

    #[inline]
    pub fn with_line_style(mut self, index: u32) -> Self {
        self.line_style = Some(index);
        self
    }

    #[inline]
    pub fn with_new_styles(mut self, styles: StyleTable) -> Self {
        self.new_styles = Some(styles);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ShapeRecord {
    StyleChange(StyleChange),
    Edge(EdgeCommand),
}

impl ShapeRecord {
    #[inline]
    pub fn move_to(x: i32, y: i32) -> Self {
        ShapeRecord::Edge(EdgeCommand::MoveTo(TwipPoint::new(x, y)))
    }

    #[inline]
    pub fn line_to(x: i32, y: i32) -> Self {
        ShapeRecord::Edge(EdgeCommand::LineTo(TwipPoint::new(x, y)))
    }

    #[inline]
    pub fn curve_to(ctrl_x: i32, ctrl_y: i32, x: i32, y: i32) -> Self {
        ShapeRecord::Edge(EdgeCommand::CurveTo {
            ctrl: TwipPoint::new(ctrl_x, ctrl_y),
            to: TwipPoint::new(x, y),
        })
    }
}

/// A decoded shape, optionally with the end state of a morph.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ShapeDefinition {
    pub styles: StyleTable,
    pub records: Vec<ShapeRecord>,
    /// Same command kinds in the same order as `records`, giving the
    /// positions at morph ratio 1.
    pub morph_records: Option<Vec<ShapeRecord>>,
}

impl ShapeDefinition {
    pub fn new(styles: StyleTable, records: Vec<ShapeRecord>) -> Self {
        ShapeDefinition {
            styles,
            records,
            morph_records: None,
        }
    }

    #[inline]
    pub fn with_morph_records(mut self, records: Vec<ShapeRecord>) -> Self {
        self.morph_records = Some(records);
        self
    }

    #[inline]
    pub fn is_morph(&self) -> bool {
        self.morph_records.is_some()
    }
}
