// src/utils/fixed.rs
//! 16.16 fixed-point numbers for deterministic side tests.
//!
//! Map coordinates converted with [`Fixed::from_f64`] land on a 1/65536
//! lattice. Products are formed in wider integers, so side tests on
//! converted values are exact and identical on every machine.

use crate::utils::geometry::Point2D;
use crate::utils::util::clamp;

pub const FRACBITS: u32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(FRACUNIT);

    pub fn from_int(value: i32) -> Self {
        Fixed(value.wrapping_shl(FRACBITS))
    }

    /// Rounds to the nearest representable value, saturating at the i32
    /// range. NaN maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Fixed::ZERO;
        }
        let scaled = clamp(
            (value * FRACUNIT as f64).round(),
            i32::MIN as f64,
            i32::MAX as f64,
        );
        Fixed(scaled as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / FRACUNIT as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    pub fn new(x: Fixed, y: Fixed) -> Self {
        FixedPoint { x, y }
    }
}

impl From<Point2D> for FixedPoint {
    fn from(point: Point2D) -> Self {
        FixedPoint::new(Fixed::from_f64(point.x), Fixed::from_f64(point.y))
    }
}

impl From<FixedPoint> for Point2D {
    fn from(point: FixedPoint) -> Self {
        Point2D::new(point.x.to_f64(), point.y.to_f64())
    }
}
