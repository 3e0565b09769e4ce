use crate::scalar::Scalar;
use crate::{point, Box2D, Point, Vector};

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    pub from: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        self.from.lerp(self.to, t)
    }

    /// Swaps the endpoints.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    #[inline]
    pub fn to_vector(&self) -> Vector<S> {
        self.to - self.from
    }

    #[inline]
    pub fn length(&self) -> S {
        self.to_vector().length()
    }

    /// Returns true if both endpoints are at the same position.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// Returns the smallest rectangle that contains this segment.
    pub fn bounding_box(&self) -> Box2D<S> {
        Box2D {
            min: point(self.from.x.min(self.to.x), self.from.y.min(self.to.y)),
            max: point(self.from.x.max(self.to.x), self.from.y.max(self.to.y)),
        }
    }
}

#[test]
fn segment_basics() {
    let segment = LineSegment {
        from: point(2.0f32, 8.0),
        to: point(6.0, 5.0),
    };

    assert_eq!(segment.length(), 5.0);
    assert_eq!(segment.sample(0.5), point(4.0, 6.5));
    assert_eq!(segment.flip().to_vector(), crate::vector(-4.0, 3.0));
    assert_eq!(
        segment.bounding_box(),
        Box2D::new(point(2.0, 5.0), point(6.0, 8.0))
    );
    assert!(!segment.is_degenerate());
    assert!(LineSegment { from: segment.to, to: segment.to }.is_degenerate());
}
