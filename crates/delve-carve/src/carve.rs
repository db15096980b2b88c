//! Chunk carve driver: finds admitted worm origins around a chunk and clears
//! every voxel their paths reach inside it.

use std::ops::AddAssign;

use delve_voxel::{ChunkColumn, VoxelTypeId};
use glam::{DVec3, IVec3};

use crate::biome::BiomeSource;
use crate::carver::{Carver, chunk_seed};
use crate::point::CarvingType;
use crate::random::Lcg48;

/// Receives carved voxels in chunk-local coordinates.
pub trait CarveSink {
    /// Applies one carved voxel. Returns `true` if the voxel changed.
    fn carve_voxel(&mut self, local: IVec3, kind: CarvingType) -> bool;
}

/// Center voxels become air; shell voxels are left alone.
impl CarveSink for ChunkColumn {
    fn carve_voxel(&mut self, local: IVec3, kind: CarvingType) -> bool {
        kind == CarvingType::Center && self.set(local.x, local.y, local.z, VoxelTypeId::AIR)
    }
}

/// Counters from carving one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Candidate origin chunks checked for admission.
    pub candidates: u32,
    /// Candidates that were admitted and spawned a worm.
    pub worms: u32,
    /// Worm steps taken.
    pub steps: u64,
    /// Voxels the sink reported as changed.
    pub voxels: u64,
}

impl AddAssign for CarveStats {
    fn add_assign(&mut self, other: Self) {
        self.candidates += other.candidates;
        self.worms += other.worms;
        self.steps += other.steps;
        self.voxels += other.voxels;
    }
}

impl Carver {
    /// Carves chunk `(chunk_x, chunk_z)`.
    ///
    /// Every chunk within the carving radius is a candidate origin. Each gets a
    /// stream seeded from [`chunk_seed`]; admitted candidates reseed it to pick
    /// an origin inside their own footprint and the height range, then walk a
    /// worm seeded with the same chunk seed. Only samples whose carve box reaches
    /// the target chunk touch the sink.
    pub fn carve_chunk<B, S>(
        &self,
        world_seed: i64,
        biomes: &B,
        chunk_x: i32,
        chunk_z: i32,
        sink: &mut S,
    ) -> CarveStats
    where
        B: BiomeSource,
        S: CarveSink + ?Sized,
    {
        let radius = self.carving_radius();
        let height = self.height_range();
        let mut stats = CarveStats::default();

        for cx in chunk_x - radius..=chunk_x + radius {
            for cz in chunk_z - radius..=chunk_z + radius {
                stats.candidates += 1;
                let seed = chunk_seed(cx, cz, world_seed);
                let mut random = Lcg48::new(seed);
                if !self.is_chunk_admitted(biomes, cx, cz, &mut random) {
                    continue;
                }

                random.set_seed(seed);
                let origin = DVec3::new(
                    f64::from((cx << 4) + random.next_int_bounded(16)),
                    f64::from(height.sample(&mut random)),
                    f64::from((cz << 4) + random.next_int_bounded(16)),
                );

                let mut worm = self.create_worm(seed, origin);
                stats.worms += 1;
                tracing::debug!(
                    carver = %self.id(),
                    cx,
                    cz,
                    origin = ?origin,
                    half_length = worm.half_length(),
                    "worm admitted"
                );
                while worm.step().is_some() {
                    stats.steps += 1;
                    let point = worm.point();
                    if point.touches_chunk(chunk_x, chunk_z) {
                        stats.voxels += point.carve(chunk_x, chunk_z, |local, kind| {
                            sink.carve_voxel(local, kind)
                        });
                    }
                }
            }
        }

        tracing::trace!(
            carver = %self.id(),
            chunk_x,
            chunk_z,
            worms = stats.worms,
            voxels = stats.voxels,
            "chunk carved"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeCarveProfile, UniformBiomeSource};
    use crate::carver::CarverConfig;
    use crate::range::Range;

    const STONE: VoxelTypeId = VoxelTypeId(1);

    fn cave() -> Carver {
        let mut config =
            CarverConfig::new("cave", Range::new(20, 60), Range::new(2, 4), Range::new(60, 100));
        config.start_bias = [1.0, 0.3, 1.0];
        config.mutate = [3.0, 8.0, 3.0, 0.6];
        Carver::new(config).unwrap().with_carving_radius(3)
    }

    fn biomes(chance: u32) -> UniformBiomeSource<BiomeCarveProfile> {
        UniformBiomeSource::new(BiomeCarveProfile::new("plains").with_chance("cave", chance))
    }

    fn stone_column() -> ChunkColumn {
        let mut column = ChunkColumn::new();
        column.fill_layers(0, 128, STONE);
        column.clear_dirty();
        column
    }

    #[derive(Default)]
    struct Recorder {
        voxels: Vec<(IVec3, CarvingType)>,
    }

    impl CarveSink for Recorder {
        fn carve_voxel(&mut self, local: IVec3, kind: CarvingType) -> bool {
            self.voxels.push((local, kind));
            kind == CarvingType::Center
        }
    }

    #[test]
    fn test_zero_chance_carves_nothing() {
        let mut column = stone_column();
        let stats = cave().carve_chunk(42, &biomes(0), 0, 0, &mut column);
        assert_eq!(stats.candidates, 49);
        assert_eq!(stats.worms, 0);
        assert_eq!(stats.voxels, 0);
        assert!(!column.is_dirty());
    }

    #[test]
    fn test_full_chance_spawns_worm_per_candidate() {
        let mut column = stone_column();
        let stats = cave().carve_chunk(42, &biomes(100), 0, 0, &mut column);
        assert_eq!(stats.worms, stats.candidates);
        assert!(stats.steps >= u64::from(stats.worms) * 30);
        assert_eq!(
            stats.voxels as usize,
            column.count(VoxelTypeId::AIR) - 128 * 16 * 16,
            "every reported change must be a stone voxel turned to air"
        );
    }

    #[test]
    fn test_some_chunk_gets_carved() {
        let carver = cave();
        let carved: u64 = (0..8)
            .map(|x| carver.carve_chunk(7, &biomes(100), x, -x, &mut stone_column()).voxels)
            .sum();
        assert!(carved > 0, "a fully admitted neighbourhood should carve something");
    }

    #[test]
    fn test_carving_is_deterministic() {
        let carver = cave();
        let mut a = stone_column();
        let mut b = stone_column();
        let stats_a = carver.carve_chunk(-3, &biomes(60), 2, -5, &mut a);
        let stats_b = carver.carve_chunk(-3, &biomes(60), 2, -5, &mut b);
        assert_eq!(stats_a, stats_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_independent_across_chunks() {
        let carver = cave();
        let chunks = [(0, 0), (1, 0), (-4, 9), (3, 3)];
        let forward: Vec<ChunkColumn> = chunks
            .iter()
            .map(|&(x, z)| {
                let mut column = stone_column();
                carver.carve_chunk(11, &biomes(50), x, z, &mut column);
                column
            })
            .collect();
        let mut backward: Vec<ChunkColumn> = chunks
            .iter()
            .rev()
            .map(|&(x, z)| {
                let mut column = stone_column();
                carver.carve_chunk(11, &biomes(50), x, z, &mut column);
                column
            })
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_neighbouring_chunks_share_worms() {
        let carver = cave();
        let mut left = Recorder::default();
        let mut right = Recorder::default();
        let a = carver.carve_chunk(5, &biomes(100), 0, 0, &mut left);
        let b = carver.carve_chunk(5, &biomes(100), 1, 0, &mut right);
        // Candidate windows overlap, so the same admitted worms walk both.
        assert_eq!(a.candidates, b.candidates);
        for (pos, _) in left.voxels.iter().chain(&right.voxels) {
            assert!((0..16).contains(&pos.x) && (0..16).contains(&pos.z));
        }
    }

    #[test]
    fn test_stats_add_assign() {
        let mut total = CarveStats::default();
        total += CarveStats {
            candidates: 2,
            worms: 1,
            steps: 30,
            voxels: 100,
        };
        total += CarveStats {
            candidates: 3,
            worms: 0,
            steps: 0,
            voxels: 0,
        };
        assert_eq!(total.candidates, 5);
        assert_eq!(total.steps, 30);
        assert_eq!(total.voxels, 100);
    }

    #[test]
    fn test_column_sink_only_clears_center() {
        let mut column = ChunkColumn::new_filled(STONE);
        assert!(!column.carve_voxel(IVec3::new(1, 1, 1), CarvingType::Wall));
        assert!(column.carve_voxel(IVec3::new(1, 1, 1), CarvingType::Center));
        assert!(!column.carve_voxel(IVec3::new(1, 1, 1), CarvingType::Center));
        assert_eq!(column.get(1, 1, 1), VoxelTypeId::AIR);
    }

    #[test]
    fn test_huge_radius_multiplier_carves_without_overflow() {
        let mut config =
            CarverConfig::new("wide", Range::new(20, 60), Range::new(2, 4), Range::new(20, 30));
        config.radius_multiplier = [20_000.0, 1.0, 1.0];
        let carver = Carver::new(config).unwrap().with_carving_radius(1);
        let biomes =
            UniformBiomeSource::new(BiomeCarveProfile::new("plains").with_chance("wide", 100));
        let mut column = stone_column();
        let stats = carver.carve_chunk(3, &biomes, 0, 0, &mut column);
        assert_eq!(stats.worms, 9);
        assert!(stats.voxels > 0);
        assert_eq!(stats.voxels as usize, column.count(VoxelTypeId::AIR) - 128 * 16 * 16);
    }
}

