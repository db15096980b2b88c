//! Deterministic 48-bit linear congruential random stream.
//!
//! Every carve decision is drawn from an [`Lcg48`] seeded from the world seed,
//! a chunk or origin derived value, and the carver's seed salt. The generator is
//! tiny, `Copy`-cheap to construct, and produces the same sequence on every
//! platform: integer draws are exact and the gaussian path uses `libm` rather
//! than the platform libc.

const MULTIPLIER: i64 = 0x5_DEEC_E66D;
const ADDEND: i64 = 0xB;
const MASK: i64 = (1 << 48) - 1;
const DOUBLE_UNIT: f64 = 1.0 / (1_u64 << 53) as f64;
const FLOAT_UNIT: f32 = 1.0 / (1_u32 << 24) as f32;

/// A seeded pseudo-random stream with a cached second gaussian.
///
/// Streams are owned by exactly one carve operation and never shared; clone one
/// if two consumers must observe the same sequence.
#[derive(Clone, Debug)]
pub struct Lcg48 {
    seed: i64,
    next_gaussian: Option<f64>,
}

impl Lcg48 {
    /// Creates a stream from a 64-bit seed. Only the low 48 bits matter.
    pub fn new(seed: i64) -> Self {
        Self {
            seed: scramble(seed),
            next_gaussian: None,
        }
    }

    /// Re-seeds the stream and discards any cached gaussian.
    pub fn set_seed(&mut self, seed: i64) {
        self.seed = scramble(seed);
        self.next_gaussian = None;
    }

    fn next_bits(&mut self, bits: u32) -> i32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        (self.seed >> (48 - bits)) as i32
    }

    /// Uniform over the full `i32` range.
    pub fn next_int(&mut self) -> i32 {
        self.next_bits(32)
    }

    /// Uniform in `[0, bound)`.
    ///
    /// A non-positive `bound` yields `0` without consuming the stream.
    pub fn next_int_bounded(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            return 0;
        }
        let mut r = self.next_bits(31);
        let m = bound - 1;
        if bound & m == 0 {
            return ((i64::from(bound) * i64::from(r)) >> 31) as i32;
        }
        let mut u = r;
        loop {
            r = u % bound;
            if u.wrapping_sub(r).wrapping_add(m) >= 0 {
                return r;
            }
            u = self.next_bits(31);
        }
    }

    /// Uniform over the full `i64` range (two 32-bit draws).
    pub fn next_long(&mut self) -> i64 {
        let hi = i64::from(self.next_bits(32));
        let lo = i64::from(self.next_bits(32));
        (hi << 32).wrapping_add(lo)
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_bits(1) != 0
    }

    /// Uniform in `[0, 1)` with 24 bits of precision.
    pub fn next_float(&mut self) -> f32 {
        self.next_bits(24) as f32 * FLOAT_UNIT
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_double(&mut self) -> f64 {
        let hi = i64::from(self.next_bits(26));
        let lo = i64::from(self.next_bits(27));
        ((hi << 27) + lo) as f64 * DOUBLE_UNIT
    }

    /// Standard normal draw using the polar method.
    ///
    /// Values are generated in pairs; the second is returned by the next call
    /// without touching the stream.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(cached) = self.next_gaussian.take() {
            return cached;
        }
        loop {
            let v1 = 2.0 * self.next_double() - 1.0;
            let v2 = 2.0 * self.next_double() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s < 1.0 && s != 0.0 {
                let multiplier = libm::sqrt(-2.0 * libm::log(s) / s);
                self.next_gaussian = Some(v2 * multiplier);
                return v1 * multiplier;
            }
        }
    }
}

fn scramble(seed: i64) -> i64 {
    (seed ^ MULTIPLIER) & MASK
}
