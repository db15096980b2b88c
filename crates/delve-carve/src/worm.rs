//! Worm path generator: a seeded random walk with periodic re-planning.
//!
//! A [`Worm`] owns its random stream and walks exactly `half_length` steps.
//! Each step may re-plan (a larger rotation scaled by `recalc_magnitude`, and
//! a fresh per-step drift), emits the ellipsoid radius for the current running
//! radius, random-walks the running radius within `[1, max_radius]`, applies
//! the per-step drift, and advances the position.

use std::iter::FusedIterator;

use glam::{DVec3, IVec3};

use crate::carver::CarverConfig;
use crate::math::{rotate_around_x, rotate_around_y, rotate_around_z, rotate_xyz};
use crate::point::WormPoint;
use crate::random::Lcg48;

/// One sample along a worm's path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WormStep {
    /// Position after this step.
    pub position: DVec3,
    /// Direction added to the position this step.
    pub direction: DVec3,
    /// Per-axis ellipsoid radius to carve at `position`.
    pub radius: IVec3,
}

/// State of one in-flight carve.
#[derive(Clone, Debug)]
pub struct Worm<'a> {
    config: &'a CarverConfig,
    rng: Lcg48,
    origin: DVec3,
    position: DVec3,
    direction: DVec3,
    running_radius: f64,
    max_radius: i32,
    radius: IVec3,
    half_length: u32,
    step_index: u32,
    next_recalc_at: i64,
    pending_rotation: [f64; 3],
    replans: u32,
}

impl<'a> Worm<'a> {
    /// Builds a worm from a stream that has already produced the length draw.
    pub(crate) fn new(
        config: &'a CarverConfig,
        mut rng: Lcg48,
        origin: DVec3,
        half_length: u32,
    ) -> Self {
        let running_radius = f64::from(config.radius_range.sample(&mut rng));
        let bias = config.start_bias;
        let x = (rng.next_double() - 0.5) * bias[0];
        let y = (rng.next_double() - 0.5) * bias[1];
        let z = (rng.next_double() - 0.5) * bias[2];
        let raw = DVec3::new(x, y, z);
        let length = raw.length();
        // An all-zero bias leaves a stationary worm.
        let direction = if length > 0.0 {
            raw / length * config.step_length
        } else {
            DVec3::ZERO
        };

        Self {
            config,
            rng,
            origin,
            position: origin,
            direction,
            running_radius,
            max_radius: config.radius_range.max,
            radius: IVec3::ZERO,
            half_length,
            step_index: 0,
            next_recalc_at: 0,
            pending_rotation: [0.0; 3],
            replans: 0,
        }
    }

    /// Advances one step, or returns `None` once `half_length` steps were taken.
    pub fn step(&mut self) -> Option<WormStep> {
        if self.is_exhausted() {
            return None;
        }

        if i64::from(self.step_index) >= self.next_recalc_at {
            self.replan();
        }
        self.step_index += 1;

        let multiplier = self.config.radius_multiplier;
        self.radius = IVec3::new(
            (self.running_radius * multiplier[0]) as i32,
            (self.running_radius * multiplier[1]) as i32,
            (self.running_radius * multiplier[2]) as i32,
        );

        self.running_radius += (self.rng.next_double() - 0.5) * self.config.mutate[3];
        self.running_radius = self
            .running_radius
            .min(f64::from(self.max_radius))
            .max(1.0);

        // Drift is scaled by `mutate` again here on top of the scale applied
        // when it was sampled.
        let mutate = self.config.mutate;
        self.direction = rotate_xyz(
            self.direction,
            [
                self.pending_rotation[0] * mutate[0],
                self.pending_rotation[1] * mutate[1],
                self.pending_rotation[2] * mutate[2],
            ],
        );
        self.position += self.direction;

        Some(WormStep {
            position: self.position,
            direction: self.direction,
            radius: self.radius,
        })
    }

    fn replan(&mut self) {
        let mutate = self.config.mutate;
        let magnitude = self.config.recalc_magnitude;

        let angle = self.rng.next_gaussian() * mutate[0] * magnitude;
        self.direction = rotate_around_x(self.direction, angle);
        let angle = self.rng.next_gaussian() * mutate[1] * magnitude;
        self.direction = rotate_around_y(self.direction, angle);
        let angle = self.rng.next_gaussian() * mutate[2] * magnitude;
        self.direction = rotate_around_z(self.direction, angle);

        self.pending_rotation = [
            self.rng.next_gaussian() * mutate[0],
            self.rng.next_gaussian() * mutate[1],
            self.rng.next_gaussian() * mutate[2],
        ];

        let interval = self.config.recalc_interval_range.sample(&mut self.rng);
        self.next_recalc_at += i64::from(interval);
        self.replans += 1;

        tracing::trace!(
            carver = %self.config.id,
            step = self.step_index,
            next = self.next_recalc_at,
            "worm re-planned"
        );
    }

    /// The carve point for the most recent step.
    pub fn point(&self) -> WormPoint {
        WormPoint {
            position: self.position,
            radius: self.radius,
            top_cut: self.config.top_cut,
            bottom_cut: self.config.bottom_cut,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.step_index >= self.half_length
    }

    /// Total number of steps this worm takes.
    pub fn half_length(&self) -> u32 {
        self.half_length
    }

    pub fn steps_taken(&self) -> u32 {
        self.step_index
    }

    pub fn remaining(&self) -> u32 {
        self.half_length - self.step_index
    }

    /// Number of re-plans performed so far.
    pub fn replans(&self) -> u32 {
        self.replans
    }

    /// Step index at which the next re-plan fires.
    pub fn next_recalc_at(&self) -> i64 {
        self.next_recalc_at
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// The scalar radius that feeds the next emitted radius.
    pub fn running_radius(&self) -> f64 {
        self.running_radius
    }

    pub fn max_radius(&self) -> i32 {
        self.max_radius
    }
}

impl Iterator for Worm<'_> {
    type Item = WormStep;

    fn next(&mut self) -> Option<WormStep> {
        self.step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Worm<'_> {}

impl FusedIterator for Worm<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::Carver;
    use crate::range::Range;

    fn straight() -> CarverConfig {
        let mut config =
            CarverConfig::new("straight", Range::new(0, 64), Range::single(2), Range::single(10));
        config.start_bias = [1.0, 0.0, 0.0];
        config
    }

    fn wandering() -> CarverConfig {
        let mut config =
            CarverConfig::new("wander", Range::new(0, 64), Range::new(2, 6), Range::new(60, 90));
        config.start_bias = [1.0, 0.4, 1.0];
        config.mutate = [4.0, 9.0, 4.0, 1.5];
        config.radius_multiplier = [1.0, 0.7, 1.3];
        config
    }

    #[test]
    fn test_straight_worm_scenario() {
        let carver = Carver::new(straight()).unwrap();
        let origin = DVec3::new(100.0, 40.0, -20.0);
        let mut worm = carver.create_worm(12345, origin);
        assert_eq!(worm.half_length(), 5);

        let start = worm.direction();
        assert_eq!(start.x.abs(), 2.0);
        assert_eq!(start.y, 0.0);
        assert_eq!(start.z, 0.0);

        let steps: Vec<WormStep> = worm.by_ref().collect();
        assert_eq!(steps.len(), 5);
        for step in &steps {
            assert_eq!(step.direction, start, "direction must not drift");
            assert_eq!(step.radius, IVec3::splat(2));
        }
        assert_eq!(worm.running_radius(), 2.0);
        assert_eq!(worm.position(), origin + start * 5.0);
        assert_eq!(steps[4].position, origin + start * 5.0);
    }

    #[test]
    fn test_deterministic_sequence() {
        let carver = Carver::new(wandering()).unwrap();
        let origin = DVec3::new(8.0, 30.0, 8.0);
        let a: Vec<WormStep> = carver.create_worm(-77, origin).collect();
        let b: Vec<WormStep> = carver.create_worm(-77, origin).collect();
        assert!(!a.is_empty());
        assert_eq!(a.len(), b.len());
        for (sa, sb) in a.iter().zip(&b) {
            assert_eq!(
                sa.position.to_array().map(f64::to_bits),
                sb.position.to_array().map(f64::to_bits)
            );
            assert_eq!(sa.radius, sb.radius);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let carver = Carver::new(wandering()).unwrap();
        let a: Vec<WormStep> = carver.create_worm(1, DVec3::ZERO).collect();
        let b: Vec<WormStep> = carver.create_worm(2, DVec3::ZERO).collect();
        assert_ne!(a.last().map(|s| s.position), b.last().map(|s| s.position));
    }

    #[test]
    fn test_seed_salt_changes_path() {
        let mut salted = wandering();
        salted.seed_salt += 1;
        let plain = Carver::new(wandering()).unwrap();
        let salted = Carver::new(salted).unwrap();
        let a: Vec<WormStep> = plain.create_worm(5, DVec3::ZERO).collect();
        let b: Vec<WormStep> = salted.create_worm(5, DVec3::ZERO).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_running_radius_stays_bounded() {
        let mut config = wandering();
        config.mutate[3] = 25.0;
        let carver = Carver::new(config).unwrap();
        for seed in 0..40 {
            let mut worm = carver.create_worm(seed, DVec3::ZERO);
            assert_eq!(worm.max_radius(), 6);
            while worm.step().is_some() {
                let r = worm.running_radius();
                assert!((1.0..=6.0).contains(&r), "seed {seed}: radius {r}");
            }
        }
    }

    #[test]
    fn test_radius_vector_truncates_scaled_radius() {
        let mut config = straight();
        config.radius_range = Range::single(3);
        config.radius_multiplier = [1.0, 0.5, 1.9];
        let carver = Carver::new(config).unwrap();
        let step = carver.create_worm(0, DVec3::ZERO).next().unwrap();
        assert_eq!(step.radius, IVec3::new(3, 1, 5));
    }

    #[test]
    fn test_step_count_then_exhausted() {
        let carver = Carver::new(wandering()).unwrap();
        let mut worm = carver.create_worm(9, DVec3::ZERO);
        let half_length = worm.half_length();
        assert_eq!(worm.len(), half_length as usize);
        for _ in 0..half_length {
            assert!(worm.step().is_some());
        }
        assert!(worm.is_exhausted());
        assert_eq!(worm.remaining(), 0);
        let position = worm.position();
        assert!(worm.step().is_none());
        assert!(worm.step().is_none());
        assert_eq!(worm.position(), position);
        assert_eq!(worm.steps_taken(), half_length);
    }

    #[test]
    fn test_zero_length_worm_is_exhausted() {
        let mut config = straight();
        config.length_range = Range::new(0, 1);
        let carver = Carver::new(config).unwrap();
        let mut worm = carver.create_worm(3, DVec3::ONE);
        assert_eq!(worm.half_length(), 0);
        assert!(worm.is_exhausted());
        assert!(worm.step().is_none());
        assert_eq!(worm.position(), DVec3::ONE);
    }

    #[test]
    fn test_first_step_replans() {
        let carver = Carver::new(wandering()).unwrap();
        let mut worm = carver.create_worm(4, DVec3::ZERO);
        assert_eq!(worm.next_recalc_at(), 0);
        worm.step();
        assert_eq!(worm.replans(), 1);
        assert!((8..=10).contains(&worm.next_recalc_at()));
    }

    #[test]
    fn test_replan_count_follows_interval_draws() {
        let carver = Carver::new(wandering()).unwrap();
        for seed in 0..20 {
            let mut worm = carver.create_worm(seed, DVec3::ZERO);
            let mut boundaries = 0;
            while !worm.is_exhausted() {
                if i64::from(worm.steps_taken()) >= worm.next_recalc_at() {
                    boundaries += 1;
                }
                worm.step();
            }
            assert_eq!(worm.replans(), boundaries);
            let steps = i64::from(worm.half_length());
            let replans = i64::from(worm.replans());
            assert!(replans >= (steps + 9) / 10 && replans <= (steps + 7) / 8);
        }
    }

    #[test]
    fn test_unit_interval_replans_every_step() {
        let mut config = wandering();
        config.recalc_interval_range = Range::single(1);
        let carver = Carver::new(config).unwrap();
        let mut worm = carver.create_worm(17, DVec3::ZERO);
        let half_length = worm.half_length();
        worm.by_ref().for_each(drop);
        assert_eq!(worm.replans(), half_length);
    }

    #[test]
    fn test_non_positive_interval_replans_every_step() {
        let mut config = wandering();
        config.recalc_interval_range = Range::new(-2, 0);
        let carver = Carver::new(config).unwrap();
        let mut worm = carver.create_worm(17, DVec3::ZERO);
        let half_length = worm.half_length();
        worm.by_ref().for_each(drop);
        assert_eq!(worm.replans(), half_length);
    }

    #[test]
    fn test_zero_start_bias_is_stationary() {
        let mut config = straight();
        config.start_bias = [0.0; 3];
        let carver = Carver::new(config).unwrap();
        let origin = DVec3::new(3.0, 4.0, 5.0);
        let last = carver.create_worm(0, origin).last().unwrap();
        assert_eq!(last.position, origin);
        assert_eq!(last.direction, DVec3::ZERO);
    }

    #[test]
    fn test_step_length_scales_direction() {
        let mut config = wandering();
        config.step_length = 3.5;
        let carver = Carver::new(config).unwrap();
        for step in carver.create_worm(21, DVec3::ZERO) {
            assert!((step.direction.length() - 3.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_point_carries_cuts() {
        let mut config = straight();
        config.top_cut = 2;
        config.bottom_cut = 1;
        let carver = Carver::new(config).unwrap();
        let mut worm = carver.create_worm(0, DVec3::ZERO);
        let step = worm.step().unwrap();
        let point = worm.point();
        assert_eq!(point.position, step.position);
        assert_eq!(point.radius, step.radius);
        assert_eq!((point.top_cut, point.bottom_cut), (2, 1));
    }

    fn bits(v: DVec3) -> [u64; 3] {
        v.to_array().map(f64::to_bits)
    }

    /// Replays the documented draw order by hand: length, radius, three
    /// direction doubles, then per step an optional re-plan (three rotation
    /// gaussians, three drift gaussians, one interval draw) followed by the
    /// radius-walk double and the drift rotation.
    #[test]
    fn test_rotation_sequence_matches_replayed_stream() {
        let mut config = wandering();
        config.recalc_interval_range = Range::single(3);
        let carver = Carver::new(config.clone()).unwrap();
        let seed = 2024;
        let origin = DVec3::new(8.0, 40.0, 8.0);
        let steps: Vec<WormStep> = carver.create_worm(seed, origin).take(4).collect();

        let m = config.mutate;
        let k = config.recalc_magnitude;
        let mut rng = Lcg48::new(seed.wrapping_add(config.seed_salt));
        config.length_range.sample(&mut rng);
        config.radius_range.sample(&mut rng);
        let b = config.start_bias;
        let raw = DVec3::new(
            (rng.next_double() - 0.5) * b[0],
            (rng.next_double() - 0.5) * b[1],
            (rng.next_double() - 0.5) * b[2],
        );
        let mut direction = raw / raw.length() * config.step_length;
        let mut position = origin;
        let mut pending = [0.0; 3];

        for (index, step) in steps.iter().enumerate() {
            if index % 3 == 0 {
                direction = rotate_around_x(direction, rng.next_gaussian() * m[0] * k);
                direction = rotate_around_y(direction, rng.next_gaussian() * m[1] * k);
                direction = rotate_around_z(direction, rng.next_gaussian() * m[2] * k);
                pending = [
                    rng.next_gaussian() * m[0],
                    rng.next_gaussian() * m[1],
                    rng.next_gaussian() * m[2],
                ];
                config.recalc_interval_range.sample(&mut rng);
            }
            rng.next_double();
            direction = rotate_xyz(
                direction,
                [pending[0] * m[0], pending[1] * m[1], pending[2] * m[2]],
            );
            position += direction;
            assert_eq!(bits(step.direction), bits(direction), "direction at step {index}");
            assert_eq!(bits(step.position), bits(position), "position at step {index}");
        }
    }

    #[test]
    fn test_drift_applies_mutate_twice() {
        let mut config = straight();
        config.start_bias = [1.0, 0.0, 0.0];
        config.mutate = [0.0, 2.0, 0.0, 0.0];
        config.recalc_magnitude = 0.0;
        config.recalc_interval_range = Range::single(100);
        let carver = Carver::new(config).unwrap();
        let mut worm = carver.create_worm(77, DVec3::ZERO);
        let before = worm.direction();
        worm.step();
        let after = worm.direction();

        // Only the per-step drift turns the worm here: the yaw between the two
        // directions is the drift gaussian times mutate[1] squared.
        let turned = libm::atan2(after.z, after.x) - libm::atan2(before.z, before.x);
        let mut rng = Lcg48::new(77_i64.wrapping_add(carver.config().seed_salt));
        rng.next_int_bounded(1);
        rng.next_int_bounded(1);
        for _ in 0..3 {
            rng.next_double();
        }
        for _ in 0..4 {
            rng.next_gaussian();
        }
        let drift = rng.next_gaussian() * 2.0 * 2.0;
        let expected = -drift.to_radians();
        let wrapped = (turned - expected + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU)
            - std::f64::consts::PI;
        assert!(wrapped.abs() < 1e-9, "turned {turned}, expected {expected}");
    }

    #[test]
    fn test_recalc_magnitude_changes_path() {
        let mut calm = wandering();
        calm.recalc_magnitude = 1.0;
        let mut wild = wandering();
        wild.recalc_magnitude = 6.0;
        let calm = Carver::new(calm).unwrap();
        let wild = Carver::new(wild).unwrap();
        let a = calm.create_worm(31, DVec3::ZERO).next().unwrap();
        let b = wild.create_worm(31, DVec3::ZERO).next().unwrap();
        assert_ne!(bits(a.direction), bits(b.direction));
        assert!((a.direction.length() - b.direction.length()).abs() < 1e-9);
    }
}

