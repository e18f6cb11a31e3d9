//! Hashable float storage and number formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An `f64` stored as raw bits so trees can derive `Eq` and `Hash`.
///
/// Equality is bitwise: `NaN` equals itself and `0.0 != -0.0`. That is the
/// right notion for caching and round-trip checks, not for arithmetic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatBits(u64);

impl FloatBits {
    #[inline]
    pub fn new(value: f64) -> Self {
        FloatBits(value.to_bits())
    }

    #[inline]
    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl From<f64> for FloatBits {
    fn from(value: f64) -> Self {
        FloatBits::new(value)
    }
}

impl fmt::Debug for FloatBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.get()))
    }
}

/// Format a number the way the language prints it.
///
/// Integral values print without a fractional part (`3`, not `3.0`), very
/// large or very small magnitudes switch to exponent notation.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        return format!("{value:e}");
    }
    if value.fract() == 0.0 {
        if value == 0.0 {
            return "0".to_string();
        }
        return format!("{value:.0}");
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integral() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_fractional() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.001), "0.001");
    }

    #[test]
    fn test_format_extremes() {
        assert_eq!(format_number(1e25), "1e25");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_bits_equality() {
        assert_eq!(FloatBits::new(1.0), FloatBits::new(1.0));
        assert_ne!(FloatBits::new(0.0), FloatBits::new(-0.0));
        assert_eq!(FloatBits::new(f64::NAN), FloatBits::new(f64::NAN));
    }
}
