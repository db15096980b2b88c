//! Ellipsoid carving around a single worm sample.

use std::ops::RangeInclusive;

use delve_voxel::{CHUNK_HEIGHT, CHUNK_WIDTH};
use glam::{DVec3, IVec3};

/// How a voxel relates to the carved ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarvingType {
    /// Inside the ellipsoid and within the vertical cuts.
    Center,
    /// In the shell just outside the ellipsoid.
    Wall,
    /// In the shell at or above the top cut.
    Top,
    /// In the shell at or below the bottom cut.
    Bottom,
}

/// A carve request: an ellipsoid with per-axis radii centred on `position`,
/// trimmed vertically by `top_cut` and `bottom_cut`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WormPoint {
    pub position: DVec3,
    pub radius: IVec3,
    pub top_cut: i32,
    pub bottom_cut: i32,
}

/// Squared ellipsoid distance; above 1 is outside.
///
/// A zero radius on an axis makes every offset on that axis NaN or infinite,
/// so nothing is carved.
fn ellipsoid(offset: [i64; 3], radius: IVec3) -> f64 {
    let term = |d: i64, r: i32| (d as f64).powi(2) / f64::from(r).powi(2);
    term(offset[0], radius.x) + term(offset[1], radius.y) + term(offset[2], radius.z)
}

/// World coordinates within `radius + 1` of `centre`, clipped to `[lo, hi]`.
fn span(centre: i32, radius: i32, lo: i32, hi: i32) -> RangeInclusive<i32> {
    let reach = i64::from(radius) + 1;
    let min = (i64::from(centre) - reach).max(i64::from(lo));
    let max = (i64::from(centre) + reach).min(i64::from(hi));
    if min > max {
        return RangeInclusive::new(1, 0);
    }
    // Both ends lie in `[lo, hi]` here.
    (min as i32)..=(max as i32)
}

impl WormPoint {
    /// The block containing `position`.
    pub fn block(&self) -> IVec3 {
        self.position.floor().as_ivec3()
    }

    /// Returns `true` if the carve box reaches into chunk `(chunk_x, chunk_z)`.
    pub fn touches_chunk(&self, chunk_x: i32, chunk_z: i32) -> bool {
        let block = self.block();
        let width = i64::from(CHUNK_WIDTH);
        let reach = |centre: i32, radius: i32, chunk: i32| {
            let reach = i64::from(radius) + 1;
            let min = (i64::from(centre) - reach).div_euclid(width);
            let max = (i64::from(centre) + reach).div_euclid(width);
            (min..=max).contains(&i64::from(chunk))
        };
        reach(block.x, self.radius.x, chunk_x) && reach(block.z, self.radius.z, chunk_z)
    }

    /// Visits every voxel of chunk `(chunk_x, chunk_z)` this point affects.
    ///
    /// `visit` receives chunk-local coordinates and returns whether it changed
    /// the voxel; the number of changes is returned.
    pub fn carve<F>(&self, chunk_x: i32, chunk_z: i32, mut visit: F) -> u64
    where
        F: FnMut(IVec3, CarvingType) -> bool,
    {
        let block = self.block();
        let radius = self.radius;
        let min_x = chunk_x.saturating_mul(CHUNK_WIDTH);
        let min_z = chunk_z.saturating_mul(CHUNK_WIDTH);
        let floor_y = -i64::from(radius.y) - 1 + i64::from(self.bottom_cut);
        let ceil_y = i64::from(radius.y) + 1 - i64::from(self.top_cut);
        let mut changed = 0;

        for wx in span(block.x, radius.x, min_x, min_x.saturating_add(CHUNK_WIDTH - 1)) {
            for wz in span(block.z, radius.z, min_z, min_z.saturating_add(CHUNK_WIDTH - 1)) {
                for wy in span(block.y, radius.y, 0, CHUNK_HEIGHT - 1) {
                    let x = i64::from(wx) - i64::from(block.x);
                    let y = i64::from(wy) - i64::from(block.y);
                    let z = i64::from(wz) - i64::from(block.z);
                    let eq = ellipsoid([x, y, z], radius);
                    let kind = if eq <= 1.0 && y >= floor_y && y <= ceil_y {
                        CarvingType::Center
                    } else if eq <= 1.5 {
                        if y <= floor_y {
                            CarvingType::Bottom
                        } else if y >= ceil_y {
                            CarvingType::Top
                        } else {
                            CarvingType::Wall
                        }
                    } else {
                        continue;
                    };
                    let local = IVec3::new(wx - min_x, wy, wz - min_z);
                    if visit(local, kind) {
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}
