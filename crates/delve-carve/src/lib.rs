//! Worm-based cave and ravine carving: seeded path generation, per-chunk
//! admission against biome carve chances, and ellipsoid voxel removal.

mod biome;
mod carve;
mod carver;
mod error;
mod point;
mod random;
mod range;
mod worm;

pub mod math;

pub use biome::{BiomeCarveProfile, BiomeSource, CarvingBiome, CellBiomeSource, UniformBiomeSource};
pub use carve::{CarveSink, CarveStats};
pub use carver::{
    Carver, CarverConfig, CarverId, DEFAULT_RECALC_INTERVAL, DEFAULT_RECALC_MAGNITUDE,
    DEFAULT_STEP_LENGTH, chunk_seed,
};
pub use error::CarveError;
pub use point::{CarvingType, WormPoint};
pub use random::Lcg48;
pub use range::Range;
pub use worm::{Worm, WormStep};
