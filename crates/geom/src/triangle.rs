use crate::scalar::Scalar;
use crate::{point, Box2D, Point};

/// A 2D triangle defined by three points `a`, `b` and `c`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Triangle<S> {
    pub a: Point<S>,
    pub b: Point<S>,
    pub c: Point<S>,
}

impl<S: Scalar> Triangle<S> {
    /// Signed area of the triangle.
    ///
    /// Positive when `a`, `b`, `c` turn counter-clockwise in a y-up space
    /// (clockwise on screen, where y points down).
    #[inline]
    pub fn signed_area(&self) -> S {
        (self.b - self.a).cross(self.c - self.a) * S::HALF
    }

    #[inline]
    pub fn area(&self) -> S {
        S::abs(self.signed_area())
    }

    /// Returns true if the three points are (almost) aligned.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        S::abs((self.b - self.a).cross(self.c - self.a)) <= S::EPSILON
    }

    /// Returns the smallest rectangle that contains this triangle.
    #[inline]
    pub fn bounding_box(&self) -> Box2D<S> {
        let min_x = self.a.x.min(self.b.x).min(self.c.x);
        let max_x = self.a.x.max(self.b.x).max(self.c.x);
        let min_y = self.a.y.min(self.b.y).min(self.c.y);
        let max_y = self.a.y.max(self.b.y).max(self.c.y);

        Box2D {
            min: point(min_x, min_y),
            max: point(max_x, max_y),
        }
    }

    /// Swaps `b` and `c`, reversing the orientation.
    #[inline]
    pub fn flip(&self) -> Self {
        Triangle {
            a: self.a,
            b: self.c,
            c: self.b,
        }
    }
}

#[test]
fn test_signed_area() {
    let t = Triangle {
        a: point(0.0f32, 0.0),
        b: point(10.0, 0.0),
        c: point(0.0, 10.0),
    };

    assert_eq!(t.signed_area(), 50.0);
    assert_eq!(t.flip().signed_area(), -50.0);
    assert_eq!(t.flip().area(), 50.0);
}

#[test]
fn test_degenerate() {
    let t = Triangle {
        a: point(0.0f32, 0.0),
        b: point(5.0, 5.0),
        c: point(10.0, 10.0),
    };

    assert!(t.is_degenerate());
    assert_eq!(
        t.bounding_box(),
        Box2D {
            min: point(0.0, 0.0),
            max: point(10.0, 10.0)
        }
    );
}
