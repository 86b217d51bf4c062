//! # Utility Module
//!
//! Miscellaneous numeric helpers.
//!
//! ## Example Function: `clamp`
//!
//! The `clamp` function restricts a value to lie within a specified range. If the value
//! is below the minimum, it returns the minimum; if it's above the maximum, it returns the
//! maximum; otherwise, it returns the value unchanged. NaN is passed through.

/// Clamps a value between a minimum and maximum.
///
/// # Examples
///
/// ```
/// use subspace_contacts::utils::util::clamp;
///
/// assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
/// assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
/// assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
/// ```
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Returns the pair `(max(a, b), min(c, d))`: the overlap of two vertical
/// spans given their bottoms (`a`, `b`) and tops (`c`, `d`).
pub fn span_overlap(bottom_a: f64, bottom_b: f64, top_a: f64, top_b: f64) -> (f64, f64) {
    (bottom_a.max(bottom_b), top_a.min(top_b))
}
