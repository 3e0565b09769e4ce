use crate::math::Point;

/// Represents an event or edge of path.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PathEvent {
    Begin {
        at: Point,
    },
    Line {
        from: Point,
        to: Point,
    },
    Quadratic {
        from: Point,
        ctrl: Point,
        to: Point,
    },
    /// End of a sub-path.
    ///
    /// `close` is true when the last endpoint coincides with the first one.
    End {
        last: Point,
        first: Point,
        close: bool,
    },
}

impl PathEvent {
    pub fn is_edge(&self) -> bool {
        match self {
            PathEvent::Line { .. } | PathEvent::Quadratic { .. } => true,
            _ => false,
        }
    }

    pub fn from(&self) -> Point {
        match *self {
            PathEvent::Line { from, .. }
            | PathEvent::Quadratic { from, .. }
            | PathEvent::Begin { at: from }
            | PathEvent::End { last: from, .. } => from,
        }
    }

    pub fn to(&self) -> Point {
        match *self {
            PathEvent::Line { to, .. }
            | PathEvent::Quadratic { to, .. }
            | PathEvent::Begin { at: to }
            | PathEvent::End { first: to, .. } => to,
        }
    }
}
