use crate::scalar::Scalar;
use crate::{Point, Triangle, Vector};
#[cfg(test)]
use crate::point;

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * S::TWO * one_t * t + self.to.to_vector() * t2
    }

    #[inline]
    fn derivative_coefficients(&self, t: S) -> (S, S, S) {
        (S::TWO * t - S::TWO, -S::FOUR * t + S::TWO, S::TWO * t)
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: S) -> Vector<S> {
        let (c0, c1, c2) = self.derivative_coefficients(t);
        self.from.to_vector() * c0 + self.ctrl.to_vector() * c1 + self.to.to_vector() * c2
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (QuadraticBezierSegment<S>, QuadraticBezierSegment<S>) {
        let split_point = self.sample(t);

        (
            QuadraticBezierSegment {
                from: self.from,
                ctrl: self.from.lerp(self.ctrl, t),
                to: split_point,
            },
            QuadraticBezierSegment {
                from: split_point,
                ctrl: self.ctrl.lerp(self.to, t),
                to: self.to,
            },
        )
    }

    /// Builds the curve that starts at `from`, ends at `to` and passes through
    /// `mid` at t = 0.5.
    pub fn through_points(from: Point<S>, mid: Point<S>, to: Point<S>) -> Self {
        let ctrl = mid * S::TWO - (from.to_vector() + to.to_vector()) * S::HALF;
        QuadraticBezierSegment { from, ctrl, to }
    }

    /// The triangle formed by the three control points.
    ///
    /// It always contains the curve.
    #[inline]
    pub fn bounding_triangle(&self) -> Triangle<S> {
        Triangle {
            a: self.from,
            b: self.ctrl,
            c: self.to,
        }
    }

    /// Returns true if the curve is the segment from `from` to `to`, i.e.
    /// the control point lies on the baseline between both endpoints.
    ///
    /// The tolerance is relative to the length of the baseline. A control
    /// point beyond an endpoint makes the curve overshoot and turn back, which
    /// is not linear.
    pub fn is_linear(&self) -> bool {
        let baseline = self.to - self.from;
        let arm = self.ctrl - self.from;
        let square_length = baseline.square_length();
        if square_length == S::ZERO {
            return arm.square_length() == S::ZERO;
        }

        let tolerance = S::EPSILON * square_length;
        let along = arm.dot(baseline);

        S::abs(arm.cross(baseline)) <= tolerance
            && along >= -tolerance
            && along <= square_length + tolerance
    }

    /// Recursively split the curve in halves, calling `callback` on each leaf.
    ///
    /// `is_leaf` receives each candidate piece along with its recursion depth
    /// and decides whether to stop. Leaves are visited in curve order.
    pub fn for_each_subdivided<L, F>(&self, is_leaf: &L, callback: &mut F)
    where
        L: Fn(&Self, u32) -> bool,
        F: FnMut(&Self, u32),
    {
        self.subdivide(0, is_leaf, callback);
    }

    fn subdivide<L, F>(&self, depth: u32, is_leaf: &L, callback: &mut F)
    where
        L: Fn(&Self, u32) -> bool,
        F: FnMut(&Self, u32),
    {
        if is_leaf(self, depth) {
            callback(self, depth);
            return;
        }

        let (first, second) = self.split(S::HALF);
        first.subdivide(depth + 1, is_leaf, callback);
        second.subdivide(depth + 1, is_leaf, callback);
    }
}

#[test]
fn split_at_half() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(10.0, 20.0),
        to: point(20.0, 0.0),
    };

    let (a, b) = curve.split(0.5);
    assert_eq!(a.from, curve.from);
    assert_eq!(a.to, point(10.0, 10.0));
    assert_eq!(b.from, a.to);
    assert_eq!(b.to, curve.to);
    assert_eq!(a.ctrl, point(5.0, 10.0));
    assert_eq!(b.ctrl, point(15.0, 10.0));
}

#[test]
fn derivative_at_ends() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(10.0, 20.0),
        to: point(20.0, 0.0),
    };

    assert_eq!(curve.derivative(0.0), (curve.ctrl - curve.from) * 2.0);
    assert_eq!(curve.derivative(1.0), (curve.to - curve.ctrl) * 2.0);
}

#[test]
fn through_points_passes_through_mid() {
    let from = point(0.0f32, 0.0);
    let mid = point(5.0, 4.0);
    let to = point(10.0, 0.0);
    let curve = QuadraticBezierSegment::through_points(from, mid, to);

    assert_eq!(curve.ctrl, point(5.0, 8.0));
    assert_eq!(curve.sample(0.5), mid);
}

#[test]
fn subdivision_visits_leaves_in_order() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(10.0, 20.0),
        to: point(20.0, 0.0),
    };

    let mut leaves = Vec::new();
    curve.for_each_subdivided(&|_, depth| depth >= 2, &mut |piece, depth| {
        assert_eq!(depth, 2);
        leaves.push(*piece);
    });

    assert_eq!(leaves.len(), 4);
    assert_eq!(leaves[0].from, curve.from);
    assert_eq!(leaves[3].to, curve.to);
    for pair in leaves.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
}

#[test]
fn linear_curves() {
    let straight = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 5.0),
        to: point(10.0, 10.0),
    };
    assert!(straight.is_linear());

    let bent = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 0.0),
        to: point(5.0, 5.0),
    };
    assert!(!bent.is_linear());
    assert_eq!(bent.bounding_triangle().signed_area(), 12.5);

    // The tolerance follows the size of the curve.
    let tiny = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(0.005, 0.0001),
        to: point(0.01, 0.0),
    };
    assert!(!tiny.is_linear());
    let huge = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5000.0, 0.01),
        to: point(10000.0, 0.0),
    };
    assert!(huge.is_linear());

    // Collinear, but going past the end and back.
    let overshoot = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(20.0, 0.0),
        to: point(10.0, 0.0),
    };
    assert!(!overshoot.is_linear());
    let backwards = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(-5.0, 0.0),
        to: point(10.0, 0.0),
    };
    assert!(!backwards.is_linear());

    let point_like = QuadraticBezierSegment {
        from: point(1.0f32, 1.0),
        ctrl: point(1.0, 1.0),
        to: point(1.0, 1.0),
    };
    assert!(point_like.is_linear());
    assert!(!QuadraticBezierSegment { ctrl: point(2.0f32, 1.0), ..point_like }.is_linear());
}
