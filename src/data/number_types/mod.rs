//! # Number types
//!
//! All arithmetic in models and presolving is done with `Decimal` values, which are exact for the
//! numbers people tend to write down. Division can still produce a value that needs rounding, and
//! two values that should be equal might differ in their last digits. A `NumberContext` describes
//! the working precision used to compare and round such values.
use std::fmt;
use std::fmt::{Display, Formatter};

use rust_decimal::{Decimal, RoundingStrategy};

/// Working precision for comparisons and rounding.
///
/// Values are rounded to `precision` significant digits and to at most `scale` decimal places.
/// Comparisons consider two values equal when their difference is not larger than `epsilon`,
/// relative to the magnitude of the values when those are larger than one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NumberContext {
    precision: u32,
    scale: u32,
}

/// The largest number of decimal places a `Decimal` can hold.
const MAX_SCALE: u32 = 28;

impl NumberContext {
    /// Create a new context.
    ///
    /// # Arguments
    ///
    /// * `precision`: Number of significant digits, at least one.
    /// * `scale`: Number of decimal places, at most 28.
    pub const fn of(precision: u32, scale: u32) -> Self {
        assert!(precision > 0, "At least one significant digit is needed.");
        assert!(scale <= MAX_SCALE, "A decimal can't have more than 28 decimal places.");

        Self { precision, scale }
    }

    /// Number of significant digits.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Number of decimal places.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Smallest difference that is not considered noise.
    pub fn epsilon(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// Round a value to the working precision, midpoints away from zero.
    pub fn enforce(&self, value: Decimal) -> Decimal {
        self.round(value, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Round a derived lower bound to the working precision without making it tighter.
    pub fn loosen_lower(&self, value: Decimal) -> Decimal {
        self.round(value, RoundingStrategy::ToNegativeInfinity)
    }

    /// Round a derived upper bound to the working precision without making it tighter.
    pub fn loosen_upper(&self, value: Decimal) -> Decimal {
        self.round(value, RoundingStrategy::ToPositiveInfinity)
    }

    /// Largest integer not above the value, after rounding to the working precision.
    ///
    /// A value like `2.99999999999999` is seen as `3`, not as something just below it.
    pub fn floor(&self, value: Decimal) -> Decimal {
        self.enforce(value).floor()
    }

    /// Smallest integer not below the value, after rounding to the working precision.
    pub fn ceil(&self, value: Decimal) -> Decimal {
        self.enforce(value).ceil()
    }

    /// Whether a value is an integer at the working precision.
    pub fn is_integral(&self, value: Decimal) -> bool {
        self.enforce(value).fract().is_zero()
    }

    /// Whether a value can't be distinguished from zero.
    pub fn is_zero(&self, value: Decimal) -> bool {
        value.abs() <= self.epsilon()
    }

    /// Whether two values can't be distinguished from each other.
    ///
    /// Values whose difference doesn't fit in a decimal are far apart.
    pub fn is_equal(&self, left: Decimal, right: Decimal) -> bool {
        let magnitude = Decimal::ONE.max(left.abs()).max(right.abs());
        left.checked_sub(right).is_some_and(|difference| difference.abs() <= self.epsilon() * magnitude)
    }

    /// Whether two values can be distinguished from each other.
    pub fn is_different(&self, left: Decimal, right: Decimal) -> bool {
        !self.is_equal(left, right)
    }

    /// Whether `left` is smaller than `right` by more than the tolerance.
    pub fn is_less(&self, left: Decimal, right: Decimal) -> bool {
        left < right && self.is_different(left, right)
    }

    /// Whether `left` is at most `right`, up to the tolerance.
    pub fn is_less_or_equal(&self, left: Decimal, right: Decimal) -> bool {
        !self.is_less(right, left)
    }

    /// Whether `left` is at least `right`, up to the tolerance.
    pub fn is_greater_or_equal(&self, left: Decimal, right: Decimal) -> bool {
        !self.is_less(left, right)
    }

    /// A single level for a lower and upper bound that are equal at the working precision.
    ///
    /// Of the two raw values, the one closest to their rounded value is kept, such that no extra
    /// rounding error is introduced. Ties go to the lower bound.
    ///
    /// # Return value
    ///
    /// `None` if the bounds round to different values.
    pub fn common_level(&self, lower: Decimal, upper: Decimal) -> Option<Decimal> {
        let rounded = self.enforce(lower);
        if rounded != self.enforce(upper) {
            return None;
        }

        if (upper - rounded).abs() < (lower - rounded).abs() {
            Some(upper)
        } else {
            Some(lower)
        }
    }

    /// Round to the number of significant digits and then to the number of decimal places.
    ///
    /// Integer digits are never rounded away: values with more integer digits than the precision
    /// keep all of them.
    fn round(&self, value: Decimal, strategy: RoundingStrategy) -> Decimal {
        let digits = significant_digits(value);
        let scale = value.scale();

        let by_precision = if digits > self.precision {
            let excess = digits - self.precision;
            value.round_dp_with_strategy(scale.saturating_sub(excess), strategy)
        } else {
            value
        };

        by_precision.round_dp_with_strategy(self.scale, strategy)
    }
}

impl Default for NumberContext {
    /// Twelve significant digits, eight decimal places.
    fn default() -> Self {
        Self::of(12, 8)
    }
}

impl Display for NumberContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} digits, {} decimals", self.precision, self.scale)
    }
}

/// Number of digits in the mantissa of a decimal, zero for zero.
fn significant_digits(value: Decimal) -> u32 {
    value.mantissa().unsigned_abs().checked_ilog10().map_or(0, |digits| digits + 1)
}
