//! Inclusive integer ranges sampled from a [`Lcg48`] stream.

use delve_config::IntRange;

use crate::random::Lcg48;

/// An inclusive `[min, max]` integer range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    /// Lower bound (inclusive).
    pub min: i32,
    /// Upper bound (inclusive).
    pub max: i32,
}

impl Range {
    /// Creates a range covering `min..=max`.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// A range containing exactly one value.
    pub const fn single(value: i32) -> Self {
        Self::new(value, value)
    }

    /// Draws a value in `[min, max]`, consuming one bounded draw.
    ///
    /// An inverted range returns `min` and leaves the stream untouched.
    pub fn sample(&self, rng: &mut Lcg48) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min) + 1;
        if span <= 0 {
            return self.min;
        }
        rng.next_int_bounded(span.min(i64::from(i32::MAX)) as i32) + self.min
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Number of values in the range; 0 when inverted.
    pub fn len(&self) -> u32 {
        (i64::from(self.max) - i64::from(self.min) + 1).clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.is_inverted()
    }

    /// Returns `true` if `min > max`.
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

impl From<IntRange> for Range {
    fn from(range: IntRange) -> Self {
        Self::new(range.min, range.max)
    }
}
