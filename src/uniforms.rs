//! Morph configuration and the GPU uniform block.
//!
//! `MorphConfig` is the externally adjustable surface (point scale, per-vertex
//! animation length, noise frequency, endpoint colors); `MorphUniforms` is
//! its GPU-facing mirror, packed for a 16-byte-aligned uniform buffer. The
//! global progress scalar is driven by the morph controller and only read
//! through here.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Externally adjustable morph parameters. No persistence required; serde
/// support exists so drivers can load a config file or dump state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Global point scale applied on top of each vertex's size attribute.
    pub point_size: f32,
    /// Fraction of the global progress each vertex spends moving.
    /// The maximum delay is `1 - vertex_duration`, so every vertex finishes
    /// exactly when global progress reaches 1.
    pub vertex_duration: f32,
    /// Noise sampling frequency for per-vertex delay and color mix.
    pub frequency: f32,
    /// Endpoint color mixed in at noise 0.
    pub color_a: [f32; 3],
    /// Endpoint color mixed in at noise 1.
    pub color_b: [f32; 3],
    /// Wall-clock duration of a morph in seconds.
    pub morph_duration: f32,
    /// Seed for the delay/color noise field.
    pub noise_seed: u32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            point_size: 0.4,
            vertex_duration: 0.4,
            frequency: 0.2,
            color_a: [0.0, 1.0, 0.8],
            color_b: [0.6, 0.0, 1.0],
            morph_duration: crate::morph::DEFAULT_MORPH_DURATION,
            noise_seed: 0,
        }
    }
}

impl MorphConfig {
    /// Largest per-vertex delay compatible with `vertex_duration`.
    pub fn max_delay(&self) -> f32 {
        (1.0 - self.vertex_duration).max(0.0)
    }
}

/// Uniform block consumed by the point-rendering shader.
///
/// Total size: 48 bytes (three 16-byte blocks).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MorphUniforms {
    pub resolution: [f32; 2], // 8 bytes
    pub progress: f32,        // 4 bytes
    pub point_size: f32,      // 4 bytes

    pub color_a: [f32; 3],    // 12 bytes
    pub duration: f32,        // 4 bytes

    pub color_b: [f32; 3],    // 12 bytes
    pub frequency: f32,       // 4 bytes
}

impl MorphUniforms {
    /// Build the uniform block from the current config, viewport resolution
    /// and global progress.
    pub fn new(config: &MorphConfig, resolution: [f32; 2], progress: f32) -> Self {
        Self {
            resolution,
            progress,
            point_size: config.point_size,
            color_a: config.color_a,
            duration: config.vertex_duration,
            color_b: config.color_b,
            frequency: config.frequency,
        }
    }
}
