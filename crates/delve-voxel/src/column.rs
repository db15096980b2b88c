//! Chunk column with bounds-checked voxel access, dirty flag, and versioning.
//!
//! A [`ChunkColumn`] spans the full world height over a 16 x 16 footprint.
//! Coordinates are chunk-local `i32` values; out-of-bounds access is handled
//! gracefully without panics.

use crate::VoxelTypeId;

/// Horizontal edge length of a chunk column, in voxels.
pub const CHUNK_WIDTH: i32 = 16;
/// Vertical extent of a chunk column, in voxels.
pub const CHUNK_HEIGHT: i32 = 256;
/// Total voxels in a column.
pub const COLUMN_VOLUME: usize = (CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_WIDTH) as usize;

/// Dirty-flag bit: column changed since the flag was last cleared.
const DIRTY: u8 = 0b0000_0001;

/// A 16 x 256 x 16 voxel column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkColumn {
    voxels: Box<[VoxelTypeId]>,
    dirty: u8,
    /// Incremented on each mutation.
    version: u64,
}

impl ChunkColumn {
    /// Creates a column filled with air.
    pub fn new() -> Self {
        Self::new_filled(VoxelTypeId::AIR)
    }

    /// Creates a column filled with the given voxel type.
    pub fn new_filled(voxel: VoxelTypeId) -> Self {
        Self {
            voxels: vec![voxel; COLUMN_VOLUME].into_boxed_slice(),
            dirty: 0,
            version: 0,
        }
    }

    /// Returns `true` if `(x, y, z)` lies inside the column.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_WIDTH).contains(&z)
    }

    fn index(x: i32, y: i32, z: i32) -> usize {
        ((y * CHUNK_WIDTH + z) * CHUNK_WIDTH + x) as usize
    }

    /// Returns the voxel at `(x, y, z)`, or air when out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> VoxelTypeId {
        if !Self::in_bounds(x, y, z) {
            tracing::warn!("ChunkColumn::get out of bounds: ({}, {}, {})", x, y, z);
            return VoxelTypeId::AIR;
        }
        self.voxels[Self::index(x, y, z)]
    }

    /// Sets the voxel at `(x, y, z)`. Returns `true` if the stored value changed.
    ///
    /// No-op with a warning log if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, voxel: VoxelTypeId) -> bool {
        if !Self::in_bounds(x, y, z) {
            tracing::warn!("ChunkColumn::set out of bounds: ({}, {}, {})", x, y, z);
            return false;
        }
        let slot = &mut self.voxels[Self::index(x, y, z)];
        if *slot == voxel {
            return false;
        }
        *slot = voxel;
        self.dirty |= DIRTY;
        self.version += 1;
        true
    }

    /// Fills every voxel with `y` in `[min_y, max_y)` with the given type.
    pub fn fill_layers(&mut self, min_y: i32, max_y: i32, voxel: VoxelTypeId) {
        let min_y = min_y.clamp(0, CHUNK_HEIGHT);
        let max_y = max_y.clamp(min_y, CHUNK_HEIGHT);
        let start = Self::index(0, min_y, 0);
        let end = Self::index(0, max_y, 0);
        self.voxels[start..end].fill(voxel);
        self.dirty |= DIRTY;
        self.version += 1;
    }

    /// Counts voxels of the given type.
    pub fn count(&self, voxel: VoxelTypeId) -> usize {
        self.voxels.iter().filter(|&&v| v == voxel).count()
    }

    /// Returns `true` if the column changed since the dirty flag was cleared.
    pub fn is_dirty(&self) -> bool {
        self.dirty & DIRTY == DIRTY
    }

    pub fn clear_dirty(&mut self) {
        self.dirty &= !DIRTY;
    }

    /// Returns the current version counter.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for ChunkColumn {
    fn default() -> Self {
        Self::new()
    }
}
