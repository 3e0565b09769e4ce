//! Fixed point coordinates used by shape records.

use crate::math::{point, Point};

use std::fmt;
use std::ops::{Add, Sub};

/// A distance in twips, 1/20 of a pixel.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Twips(pub i32);

impl Twips {
    pub const PER_PIXEL: i32 = 20;
    pub const ZERO: Self = Twips(0);

    #[inline]
    pub const fn new(value: i32) -> Self {
        Twips(value)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Rounds a pixel distance to the closest twip.
    #[inline]
    pub fn from_pixels(pixels: f32) -> Self {
        Twips((pixels * Self::PER_PIXEL as f32).round() as i32)
    }

    #[inline]
    pub fn to_pixels(self) -> f32 {
        self.0 as f32 / Self::PER_PIXEL as f32
    }
}

impl Add for Twips {
    type Output = Twips;
    #[inline]
    fn add(self, other: Twips) -> Twips {
        Twips(self.0 + other.0)
    }
}

impl Sub for Twips {
    type Output = Twips;
    #[inline]
    fn sub(self, other: Twips) -> Twips {
        Twips(self.0 - other.0)
    }
}

impl fmt::Debug for Twips {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}tw", self.0)
    }
}

/// A position in twips.
///
/// Comparisons are exact, which is what chain stitching relies on.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TwipPoint {
    pub x: Twips,
    pub y: Twips,
}

impl TwipPoint {
    pub const ZERO: Self = TwipPoint {
        x: Twips::ZERO,
        y: Twips::ZERO,
    };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        TwipPoint {
            x: Twips(x),
            y: Twips(y),
        }
    }

    #[inline]
    pub fn from_pixels(p: Point) -> Self {
        TwipPoint {
            x: Twips::from_pixels(p.x),
            y: Twips::from_pixels(p.y),
        }
    }

    #[inline]
    pub fn to_pixels(self) -> Point {
        point(self.x.to_pixels(), self.y.to_pixels())
    }

    /// Halfway between two points, rounded towards negative infinity.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        TwipPoint {
            x: Twips((self.x.0 + other.x.0).div_euclid(2)),
            y: Twips((self.y.0 + other.y.0).div_euclid(2)),
        }
    }
}

impl fmt::Debug for TwipPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})tw", self.x.0, self.y.0)
    }
}

#[test]
fn twips_to_pixels() {
    assert_eq!(Twips(20).to_pixels(), 1.0);
    assert_eq!(Twips(-10).to_pixels(), -0.5);
    assert_eq!(Twips::from_pixels(2.5), Twips(50));
    assert_eq!(TwipPoint::new(200, 40).to_pixels(), point(10.0, 2.0));
    assert_eq!(
        TwipPoint::from_pixels(point(1.0, -3.0)),
        TwipPoint::new(20, -60)
    );
}

#[test]
fn twip_midpoint() {
    assert_eq!(
        TwipPoint::new(0, 0).midpoint(TwipPoint::new(10, 21)),
        TwipPoint::new(5, 10)
    );
    assert_eq!(
        TwipPoint::new(-1, 0).midpoint(TwipPoint::new(0, 0)),
        TwipPoint::new(-1, 0)
    );
}
