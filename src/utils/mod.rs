// src/utils/mod.rs

pub mod fixed;
pub mod geometry;
pub mod util;

pub use fixed::{Fixed, FixedPoint};
pub use geometry::{BoundingBox, Line2D, Point2D, Vector2D};

/// Tolerance for floating-point side tests.
pub const EPSILON: f64 = 1e-6;
