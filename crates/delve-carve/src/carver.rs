//! Carver configuration, worm factory, and per-chunk admission gate.

use std::fmt;

use delve_config::CarverDefinition;
use glam::DVec3;

use crate::biome::{BiomeSource, CarvingBiome};
use crate::error::CarveError;
use crate::random::Lcg48;
use crate::range::Range;
use crate::worm::Worm;

/// Default length of a single worm step.
pub const DEFAULT_STEP_LENGTH: f64 = 2.0;
/// Default number of steps between direction re-plans.
pub const DEFAULT_RECALC_INTERVAL: Range = Range::new(8, 10);
/// Default multiplier on the re-plan rotation.
pub const DEFAULT_RECALC_MAGNITUDE: f64 = 3.0;

/// Authored identifier of a carver type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarverId(String);

impl CarverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seed salt derived from the identifier.
    ///
    /// 31-multiplier string hash over the UTF-8 bytes, wrapping in 32 bits,
    /// then sign-extended. Stable across runs and platforms.
    pub fn seed_salt(&self) -> i64 {
        let hash = self
            .0
            .bytes()
            .fold(0_i32, |h, b| h.wrapping_mul(31).wrapping_add(i32::from(b)));
        i64::from(hash)
    }
}

impl fmt::Display for CarverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CarverId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Immutable parameters shared by every worm a carver spawns.
#[derive(Clone, Debug, PartialEq)]
pub struct CarverConfig {
    /// Carver identifier.
    pub id: CarverId,
    /// Vertical band carving is invoked in.
    pub height_range: Range,
    /// Initial running radius; `max` caps the running radius.
    pub radius_range: Range,
    /// Sampled path length; worms step half of it.
    pub length_range: Range,
    /// Per-axis scale applied to the initial direction.
    pub start_bias: [f64; 3],
    /// Per-axis rotational drift in degrees (x, y, z) then radius drift.
    pub mutate: [f64; 4],
    /// Per-axis scale turning the running radius into an ellipsoid.
    pub radius_multiplier: [f64; 3],
    /// Mixed into every derived seed.
    pub seed_salt: i64,
    /// Voxels trimmed from the top of each carved ellipsoid.
    pub top_cut: i32,
    /// Voxels trimmed from the bottom of each carved ellipsoid.
    pub bottom_cut: i32,
    /// Magnitude of one direction vector.
    pub step_length: f64,
    /// Steps between direction re-plans.
    pub recalc_interval_range: Range,
    /// Multiplier applied only to the re-plan rotation.
    pub recalc_magnitude: f64,
}

impl CarverConfig {
    /// Creates a config with unit vectors, no drift, no cuts, and default
    /// stepping. The seed salt is derived from `id`.
    pub fn new(id: impl Into<CarverId>, height: Range, radius: Range, length: Range) -> Self {
        let id = id.into();
        let seed_salt = id.seed_salt();
        Self {
            id,
            height_range: height,
            radius_range: radius,
            length_range: length,
            start_bias: [1.0; 3],
            mutate: [0.0; 4],
            radius_multiplier: [1.0; 3],
            seed_salt,
            top_cut: 0,
            bottom_cut: 0,
            step_length: DEFAULT_STEP_LENGTH,
            recalc_interval_range: DEFAULT_RECALC_INTERVAL,
            recalc_magnitude: DEFAULT_RECALC_MAGNITUDE,
        }
    }

    /// Checks ranges are ordered, the radius can reach 1, and every float is
    /// finite.
    pub fn validate(&self) -> Result<(), CarveError> {
        let ranges = [
            ("height", self.height_range),
            ("radius", self.radius_range),
            ("length", self.length_range),
            ("recalc", self.recalc_interval_range),
        ];
        for (field, range) in ranges {
            if range.is_inverted() {
                return Err(CarveError::InvertedRange {
                    carver: self.id.to_string(),
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        // The running radius is clamped to `[1, max]`.
        if self.radius_range.max < 1 {
            return Err(CarveError::RadiusTooSmall {
                carver: self.id.to_string(),
                max: self.radius_range.max,
            });
        }

        let floats: [(&'static str, &[f64]); 5] = [
            ("start", &self.start_bias),
            ("mutate", &self.mutate),
            ("radius_multiplier", &self.radius_multiplier),
            ("step", std::slice::from_ref(&self.step_length)),
            ("recalc_magnitude", std::slice::from_ref(&self.recalc_magnitude)),
        ];
        for (field, values) in floats {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(CarveError::NonFinite {
                    carver: self.id.to_string(),
                    field,
                });
            }
        }
        Ok(())
    }
}

impl From<&CarverDefinition> for CarverConfig {
    fn from(def: &CarverDefinition) -> Self {
        let id = CarverId::new(def.id.clone());
        let seed_salt = def.seed_salt.unwrap_or_else(|| id.seed_salt());
        Self {
            id,
            height_range: def.height.into(),
            radius_range: def.radius.into(),
            length_range: def.length.into(),
            start_bias: def.start,
            mutate: def.mutate,
            radius_multiplier: def.radius_multiplier,
            seed_salt,
            top_cut: def.top_cut,
            bottom_cut: def.bottom_cut,
            step_length: def.step,
            recalc_interval_range: def.recalc.into(),
            recalc_magnitude: def.recalc_magnitude,
        }
    }
}

/// Spawns worms and decides which chunks take part in carving.
///
/// A `Carver` is read-only after construction and can be shared across
/// worker threads; every operation derives its own random stream.
#[derive(Clone, Debug)]
pub struct Carver {
    config: CarverConfig,
    carving_radius: i32,
}

impl Carver {
    /// Chunks searched in each direction for worm origins by default.
    pub const DEFAULT_CARVING_RADIUS: i32 = 4;

    /// Validates `config` and builds a carver.
    pub fn new(config: CarverConfig) -> Result<Self, CarveError> {
        config.validate()?;
        Ok(Self {
            config,
            carving_radius: Self::DEFAULT_CARVING_RADIUS,
        })
    }

    /// Builds a carver from an authored definition.
    pub fn from_definition(def: &CarverDefinition) -> Result<Self, CarveError> {
        Self::new(CarverConfig::from(def))
    }

    /// Overrides how far (in chunks) worm origins are searched from a carved chunk.
    pub fn with_carving_radius(mut self, radius: u32) -> Self {
        self.carving_radius = radius.min(i32::MAX as u32) as i32;
        self
    }

    pub fn config(&self) -> &CarverConfig {
        &self.config
    }

    pub fn id(&self) -> &CarverId {
        &self.config.id
    }

    /// The vertical band carving may be invoked in.
    pub fn height_range(&self) -> Range {
        self.config.height_range
    }

    pub fn carving_radius(&self) -> i32 {
        self.carving_radius
    }

    /// Creates the worm for one carve attempt at `origin`.
    ///
    /// The stream is seeded from `seed + seed_salt`; draws are consumed as
    /// length, radius, then the three direction components.
    pub fn create_worm(&self, seed: i64, origin: DVec3) -> Worm<'_> {
        let mut rng = Lcg48::new(seed.wrapping_add(self.config.seed_salt));
        let half_length = (self.config.length_range.sample(&mut rng) / 2).max(0) as u32;
        Worm::new(&self.config, rng, origin, half_length)
    }

    /// Decides whether the chunk at `(chunk_x, chunk_z)` is carved at all.
    ///
    /// Consumes one `next_long` from `random`; the roll comes from a
    /// substream salted with this carver's seed salt. A biome or chance the
    /// source does not know counts as 0 percent.
    pub fn is_chunk_admitted<B: BiomeSource>(
        &self,
        biomes: &B,
        chunk_x: i32,
        chunk_z: i32,
        random: &mut Lcg48,
    ) -> bool {
        let mut stream = Lcg48::new(random.next_long().wrapping_add(self.config.seed_salt));
        let roll = stream.next_int_bounded(100);

        let chance = biomes
            .biome_at(chunk_x << 4, chunk_z << 4)
            .and_then(|biome| biome.carve_chance(&self.config.id))
            .unwrap_or(0);

        let admitted = u32::try_from(roll).is_ok_and(|roll| roll < chance);
        tracing::trace!(
            carver = %self.config.id,
            chunk_x,
            chunk_z,
            roll,
            chance,
            admitted,
            "chunk admission"
        );
        admitted
    }
}

/// Seed for the chunk-local stream that picks worm origins.
///
/// `cx * a ^ cz * b ^ world_seed` where `a` and `b` are the first two longs of
/// a stream seeded with `world_seed`.
pub fn chunk_seed(chunk_x: i32, chunk_z: i32, world_seed: i64) -> i64 {
    let mut rng = Lcg48::new(world_seed);
    let a = rng.next_long();
    let b = rng.next_long();
    i64::from(chunk_x).wrapping_mul(a) ^ i64::from(chunk_z).wrapping_mul(b) ^ world_seed
}
