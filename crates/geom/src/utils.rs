//! Angle and area helpers shared by the flattener and the tessellators.

use crate::scalar::Scalar;
use crate::{Point, Vector};

/// Angle between vectors v1 and v2 (oriented clockwise assuming y points downwards).
/// The result is a number between 0 and 2*PI.
#[inline]
pub fn directed_angle<S: Scalar>(v1: Vector<S>, v2: Vector<S>) -> S {
    let angle = S::atan2(v2.y, v2.x) - S::atan2(v1.y, v1.x);

    if angle < S::ZERO {
        angle + S::TWO * S::PI()
    } else {
        angle
    }
}

/// Signed turn from direction `v1` to direction `v2`, in degrees, in `(-180, 180]`.
///
/// Zero-length vectors have no direction and produce a turn of zero.
#[inline]
pub fn turn_angle_degrees<S: Scalar>(v1: Vector<S>, v2: Vector<S>) -> S {
    if v1.square_length() == S::ZERO || v2.square_length() == S::ZERO {
        return S::ZERO;
    }

    S::atan2(v1.cross(v2), v1.dot(v2)).to_degrees()
}

/// Shoelace area of a polygon. The polygon is implicitly closed.
pub fn signed_area<S: Scalar>(points: &[Point<S>]) -> S {
    if points.len() < 3 {
        return S::ZERO;
    }

    let mut area = S::ZERO;
    let mut prev = points[points.len() - 1];
    for &p in points {
        area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }

    area * S::HALF
}

#[cfg(test)]
use crate::vector;

#[cfg(test)]
fn assert_almost_eq(a: f32, b: f32) {
    if (a - b).abs() > 0.001 {
        panic!("assert almost equal: {:?} != {:?}", a, b);
    }
}

#[test]
fn test_turn_angle() {
    assert_almost_eq(turn_angle_degrees(vector(1.0, 0.0), vector(0.0, 1.0)), 90.0);
    assert_almost_eq(turn_angle_degrees(vector(1.0, 0.0), vector(0.0, -1.0)), -90.0);
    assert_almost_eq(turn_angle_degrees(vector(1.0, 0.0), vector(2.0, 0.0)), 0.0);
    assert_almost_eq(turn_angle_degrees(vector(1.0, 0.0), vector(0.0, 0.0)), 0.0);
    assert_almost_eq(
        turn_angle_degrees::<f32>(vector(1.0, 0.0), vector(-1.0, 0.0)).abs(),
        180.0,
    );
}

#[test]
fn test_directed_angle() {
    use core::f32::consts::PI;
    assert_almost_eq(directed_angle(vector(1.0, 0.0), vector(0.0, 1.0)), PI * 0.5);
    assert_almost_eq(directed_angle(vector(0.0, 1.0), vector(1.0, 0.0)), PI * 1.5);
}

#[test]
fn test_polygon_orientation() {
    use crate::point;

    let square = [
        point(0.0f32, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    assert_almost_eq(signed_area(&square), 100.0);

    let mut reversed = square;
    reversed.reverse();
    assert_almost_eq(signed_area(&reversed), -100.0);

    // A closing duplicate does not change anything.
    let closed = [
        point(0.0f32, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
        point(0.0, 0.0),
    ];
    assert_almost_eq(signed_area(&closed), 100.0);
}
