//! Deterministic axis rotations for direction vectors.
//!
//! Angles are in degrees. Sine and cosine come from `libm` so a worm's path is
//! bit-identical on every platform.

use glam::DVec3;

/// Rotates `v` around the X axis by `degrees`.
#[inline]
pub fn rotate_around_x(v: DVec3, degrees: f64) -> DVec3 {
    let (sin, cos) = sin_cos(degrees);
    DVec3::new(v.x, cos * v.y - sin * v.z, sin * v.y + cos * v.z)
}

/// Rotates `v` around the Y axis by `degrees`.
#[inline]
pub fn rotate_around_y(v: DVec3, degrees: f64) -> DVec3 {
    let (sin, cos) = sin_cos(degrees);
    DVec3::new(cos * v.x + sin * v.z, v.y, -sin * v.x + cos * v.z)
}

/// Rotates `v` around the Z axis by `degrees`.
#[inline]
pub fn rotate_around_z(v: DVec3, degrees: f64) -> DVec3 {
    let (sin, cos) = sin_cos(degrees);
    DVec3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, v.z)
}

/// Applies X, then Y, then Z rotations.
#[inline]
pub fn rotate_xyz(v: DVec3, degrees: [f64; 3]) -> DVec3 {
    let v = rotate_around_x(v, degrees[0]);
    let v = rotate_around_y(v, degrees[1]);
    rotate_around_z(v, degrees[2])
}

#[inline]
fn sin_cos(degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (libm::sin(radians), libm::cos(radians))
}
