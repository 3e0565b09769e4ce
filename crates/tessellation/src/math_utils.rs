//! Various math tools that are mostly useful for the tessellators.

use crate::math::*;

/// Compute a normal vector at a point P such that ```x ---e1----> P ---e2---> x```
///
/// The resulting vector is not normalized. The length is such that extruding the shape
/// would yield parallel segments exactly 1 unit away from their original, which is
/// the miter point of a joint of half-thickness 1.
/// The normal points towards the positive side of e1.
///
/// v1 and v2 are expected to be normalized.
pub fn compute_normal(v1: Vector, v2: Vector) -> Vector {
    let epsilon = 1e-4;

    let n1 = vector(-v1.y, v1.x);

    let v12 = v1 + v2;

    if v12.square_length() < epsilon {
        return vector(0.0, 0.0);
    }

    let tangent = v12.normalize();
    let n = vector(-tangent.y, tangent.x);

    let inv_len = n.dot(n1);

    if inv_len.abs() < epsilon {
        return n1;
    }

    n / inv_len
}

/// The normal of a direction, rotated by +90°.
#[inline]
pub fn normal(v: Vector) -> Vector {
    vector(-v.y, v.x)
}

/// Twice the signed area of the triangle.
#[inline]
pub fn orientation(a: Point, b: Point, c: Point) -> f32 {
    (b - a).cross(c - a)
}

/// Rotates `v` by `angle` radians.
#[inline]
pub fn rotate(v: Vector, angle: f32) -> Vector {
    let (sin, cos) = angle.sin_cos();
    vector(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[test]
fn test_compute_normal() {
    fn assert_almost_eq(a: Vector, b: Vector) {
        if (a - b).square_length() > 0.00001 {
            panic!("assert almost equal: {:?} != {:?}", a, b);
        }
    }

    assert_almost_eq(
        compute_normal(vector(1.0, 0.0), vector(0.0, 1.0)),
        vector(-1.0, 1.0),
    );
    assert_almost_eq(
        compute_normal(vector(1.0, 0.0), vector(0.0, -1.0)),
        vector(1.0, 1.0),
    );
    assert_almost_eq(
        compute_normal(vector(1.0, 0.0), vector(1.0, 0.0)),
        vector(0.0, 1.0),
    );
    assert_almost_eq(
        rotate(vector(1.0, 0.0), std::f32::consts::FRAC_PI_2),
        vector(0.0, 1.0),
    );
    assert!(orientation(point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0)) > 0.0);
}
