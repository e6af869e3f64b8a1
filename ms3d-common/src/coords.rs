//! Coordinate conversion between the source scene and MS3D
//!
//! Source scenes are Z-up, MS3D is Y-up:
//!
//! ```text
//!         Z              Y
//! source  |         MS3D |
//!         |____Y         |____X
//!        /              /
//!       X              Z
//! ```
//!
//! A source vector (X, Y, Z) becomes (Y, Z, X). Every position, normal, and
//! rotation written to a document goes through this module.

use glam::{EulerRot, Quat, Vec2, Vec3};

/// Round to the 6 decimals stored in MS3D ASCII documents.
///
/// Negative zero comes back as `0.0` so it never prints as `-0.000000`.
#[inline]
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0 + 0.0
}

/// Convert a source position or direction to MS3D axes: (X, Y, Z) -> (Y, Z, X).
#[inline]
pub fn to_target(v: Vec3) -> [f64; 3] {
    [v.y as f64, v.z as f64, v.x as f64]
}

/// Inverse of [`to_target`]: (Y, Z, X) -> (X, Y, Z).
#[inline]
pub fn from_target(v: [f64; 3]) -> [f64; 3] {
    [v[2], v[0], v[1]]
}

/// Convert a texture coordinate. MS3D has its V axis pointing down.
#[inline]
pub fn to_target_uv(uv: Vec2) -> [f64; 2] {
    [uv.x as f64, -(uv.y as f64)]
}

/// Decompose a source rotation into MS3D Euler angles, returned as (x, y, z).
///
/// The decomposition uses YZX order (Y applied first, X last), which already
/// lines up with the MS3D axes, so unlike positions the result is not permuted.
/// YZX extrinsic is the same rotation as XZY intrinsic, which is what glam
/// exposes.
pub fn to_target_euler(rotation: Quat) -> [f64; 3] {
    let (x, z, y) = rotation.normalize().to_euler(EulerRot::XZY);
    [x as f64, y as f64, z as f64]
}
