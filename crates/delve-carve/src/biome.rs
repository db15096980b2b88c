//! Biome capability used by chunk admission.
//!
//! Admission only needs one fact from a biome: how likely a given carver is to
//! run in it. [`CarvingBiome`] exposes exactly that, and [`BiomeSource`]
//! resolves the biome governing a block column.

use delve_config::BiomeDefinition;
use hashbrown::HashMap;

use crate::carver::CarverId;
use crate::random::Lcg48;

/// A biome that knows its carve chances.
pub trait CarvingBiome {
    /// Percentage (0-100) of chunks the carver runs in, or `None` if this biome
    /// has no entry for it.
    fn carve_chance(&self, carver: &CarverId) -> Option<u32>;
}

/// Resolves the biome at a block column.
pub trait BiomeSource {
    type Biome: CarvingBiome;

    /// Returns the biome at block column `(x, z)`, if any.
    fn biome_at(&self, x: i32, z: i32) -> Option<&Self::Biome>;
}

/// Table-backed carve chances for one biome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeCarveProfile {
    name: String,
    chances: HashMap<CarverId, u32>,
}

impl BiomeCarveProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chances: HashMap::new(),
        }
    }

    /// Sets the chance for `carver`, replacing any previous entry.
    pub fn with_chance(mut self, carver: impl Into<CarverId>, chance: u32) -> Self {
        self.chances.insert(carver.into(), chance);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CarvingBiome for BiomeCarveProfile {
    fn carve_chance(&self, carver: &CarverId) -> Option<u32> {
        self.chances.get(carver).copied()
    }
}

impl From<&BiomeDefinition> for BiomeCarveProfile {
    fn from(def: &BiomeDefinition) -> Self {
        def.carvers
            .iter()
            .fold(Self::new(def.name.clone()), |profile, (carver, &chance)| {
                profile.with_chance(carver.as_str(), chance)
            })
    }
}

/// Every column resolves to the same biome.
#[derive(Clone, Debug)]
pub struct UniformBiomeSource<B> {
    biome: B,
}

impl<B> UniformBiomeSource<B> {
    pub fn new(biome: B) -> Self {
        Self { biome }
    }
}

impl<B: CarvingBiome> BiomeSource for UniformBiomeSource<B> {
    type Biome = B;

    fn biome_at(&self, _x: i32, _z: i32) -> Option<&B> {
        Some(&self.biome)
    }
}

/// Assigns biomes to square cells of block columns, picked deterministically
/// from the world seed and the cell coordinate.
#[derive(Clone, Debug)]
pub struct CellBiomeSource {
    seed: i64,
    cell_size: i32,
    biomes: Vec<BiomeCarveProfile>,
}

impl CellBiomeSource {
    /// Creates a source with cells `cell_size` blocks wide. An empty biome list
    /// resolves every column to `None`.
    pub fn new(seed: i64, cell_size: i32, biomes: Vec<BiomeCarveProfile>) -> Self {
        Self {
            seed,
            cell_size: cell_size.max(1),
            biomes,
        }
    }

    /// Builds one profile per configured biome.
    pub fn from_definitions(seed: i64, cell_size: i32, defs: &[BiomeDefinition]) -> Self {
        Self::new(seed, cell_size, defs.iter().map(BiomeCarveProfile::from).collect())
    }

    fn cell_index(&self, x: i32, z: i32) -> usize {
        let cell_x = i64::from(x.div_euclid(self.cell_size));
        let cell_z = i64::from(z.div_euclid(self.cell_size));
        let mut rng = Lcg48::new(
            self.seed ^ cell_x.wrapping_mul(341_873_128_712) ^ cell_z.wrapping_mul(132_897_987_541),
        );
        rng.next_int_bounded(self.biomes.len() as i32) as usize
    }
}

impl BiomeSource for CellBiomeSource {
    type Biome = BiomeCarveProfile;

    fn biome_at(&self, x: i32, z: i32) -> Option<&BiomeCarveProfile> {
        if self.biomes.is_empty() {
            return None;
        }
        self.biomes.get(self.cell_index(x, z))
    }
}
