//! Deterministic smooth 3D noise.
//!
//! Used to derive the per-vertex start delay and the color mix factor during
//! a morph. The noise is hash-based value noise on an integer grid with
//! smoothstep-interpolated corners, so it is continuous everywhere (including
//! across cell boundaries) and identical across platforms.

use glam::Vec3;

/// Sample smooth noise at a point, scaled by a sampling frequency.
///
/// Returns a value in range [-1, 1]. Two samples with nearby inputs produce
/// nearby outputs; there are no discontinuities at integer coordinates.
pub fn sample(point: Vec3, frequency: f32, seed: u32) -> f32 {
    noise_3d(point.x * frequency, point.y * frequency, point.z * frequency, seed)
}

/// Sample smooth noise remapped to [0, 1].
pub fn sample_01(point: Vec3, frequency: f32, seed: u32) -> f32 {
    (sample(point, frequency, seed) + 1.0) * 0.5
}

/// Deterministic 3D value noise using a hash-based grid.
///
/// Returns a value in range [-1, 1].
fn noise_3d(x: f32, y: f32, z: f32, seed: u32) -> f32 {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    let iz = z.floor() as i32;

    let fx = x - x.floor();
    let fy = y - y.floor();
    let fz = z - z.floor();

    // Smoothstep interpolation weights
    let u = fx * fx * (3.0 - 2.0 * fx);
    let v = fy * fy * (3.0 - 2.0 * fy);
    let w = fz * fz * (3.0 - 2.0 * fz);

    // Hash corner values
    let n000 = hash_to_float(hash_3d(ix, iy, iz, seed));
    let n100 = hash_to_float(hash_3d(ix + 1, iy, iz, seed));
    let n010 = hash_to_float(hash_3d(ix, iy + 1, iz, seed));
    let n110 = hash_to_float(hash_3d(ix + 1, iy + 1, iz, seed));
    let n001 = hash_to_float(hash_3d(ix, iy, iz + 1, seed));
    let n101 = hash_to_float(hash_3d(ix + 1, iy, iz + 1, seed));
    let n011 = hash_to_float(hash_3d(ix, iy + 1, iz + 1, seed));
    let n111 = hash_to_float(hash_3d(ix + 1, iy + 1, iz + 1, seed));

    // Trilinear interpolation
    let nx00 = lerp(n000, n100, u);
    let nx10 = lerp(n010, n110, u);
    let nx01 = lerp(n001, n101, u);
    let nx11 = lerp(n011, n111, u);

    let nxy0 = lerp(nx00, nx10, v);
    let nxy1 = lerp(nx01, nx11, v);

    lerp(nxy0, nxy1, w)
}

/// Simple 3D hash function.
fn hash_3d(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x as u32).wrapping_mul(0x9e3779b9);
    h = h.wrapping_add(y as u32).wrapping_mul(0x85ebca6b);
    h = h.wrapping_add(z as u32).wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Convert hash to float in range [-1, 1].
fn hash_to_float(h: u32) -> f32 {
    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}

/// Linear interpolation.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
