//! Voxel storage for carving: compact voxel ids and fixed-size chunk columns.

pub mod column;

pub use column::{CHUNK_HEIGHT, CHUNK_WIDTH, COLUMN_VOLUME, ChunkColumn};

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VoxelTypeId(pub u16);

impl VoxelTypeId {
    /// Empty space. Zero so that zeroed storage is all air.
    pub const AIR: Self = Self(0);
}
