//! Per-vertex morph evaluation and GPU data generation.
//!
//! Each vertex computes its own local progress window from the one global
//! progress scalar: a noise-derived delay staggers when the vertex starts
//! moving, while every vertex finishes exactly when global progress reaches
//! 1. The same noise value drives the color mix between the two configured
//! endpoint colors.
//!
//! Rendering note: morphing vertices leave any bounding volume computed from
//! the resting shape, so consumers must render the stream with
//! bounding-volume culling disabled.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::noise;
use crate::shape_buffer::ShapeBuffer;
use crate::uniforms::MorphConfig;

/// Static per-vertex data for the morph vertex stream.
///
/// Rebuilt only when a morph rebinds its "from"/"to" buffers; the per-frame
/// interpolation happens in the shader (or in [`evaluate_buffer`] for CPU
/// consumers) from the global progress uniform.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MorphVertex {
    /// Position in the "from" shape buffer.
    pub from_position: [f32; 3],
    pub _pad: f32,
    /// Position in the "to" shape buffer.
    pub to_position: [f32; 3],
    /// Fixed random size scalar in [0, 1).
    pub size: f32,
}

impl MorphVertex {
    /// Vertex buffer layout for the morph stream (slot 0, per-vertex step).
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MorphVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // from_position: vec3<f32>
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // to_position: vec3<f32>
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // size: f32
                wgpu::VertexAttribute {
                    offset: 28,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// CPU-evaluated particle, one per vertex slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuParticle {
    /// Interpolated world position.
    pub position: [f32; 3],
    /// Final point scale (size attribute times the global point size).
    pub scale: f32,
    /// RGBA color mixed from the two endpoint colors by the noise factor.
    pub color: [f32; 4],
}

/// Build the static vertex stream for the current "from"/"to" binding.
///
/// Both buffers come from the same reconciled set, so their lengths match;
/// `sizes` holds one scalar per vertex slot.
pub fn build_morph_vertices(
    from: &ShapeBuffer,
    to: &ShapeBuffer,
    sizes: &[f32],
) -> Vec<MorphVertex> {
    debug_assert_eq!(from.len(), to.len());
    debug_assert_eq!(from.len(), sizes.len());

    from.positions()
        .iter()
        .zip(to.positions())
        .zip(sizes)
        .map(|((&f, &t), &size)| MorphVertex {
            from_position: f.to_array(),
            _pad: 0.0,
            to_position: t.to_array(),
            size,
        })
        .collect()
}

/// Noise factor in [0, 1] shared by a vertex's delay and color mix.
///
/// Two independent samples, one per endpoint position, are averaged so the
/// stagger tracks both the shape being left and the shape being formed.
pub fn vertex_noise(from: Vec3, to: Vec3, config: &MorphConfig) -> f32 {
    let n_from = noise::sample(from, config.frequency, config.noise_seed);
    let n_to = noise::sample(to, config.frequency, config.noise_seed.wrapping_add(1));
    ((n_from + n_to) * 0.5 + 1.0) * 0.5
}

/// Map the global progress scalar into a vertex's local window.
///
/// Local progress is 0 while `global <= delay`, 1 once
/// `global >= delay + duration`, and linear in between. The global endpoints
/// are pinned exactly so every vertex sits on its "from" position at
/// progress 0 and its "to" position at progress 1, regardless of delay.
pub fn local_progress(global: f32, delay: f32, duration: f32) -> f32 {
    if global <= 0.0 {
        return 0.0;
    }
    if global >= 1.0 {
        return 1.0;
    }
    ((global - delay) / duration.max(1e-6)).clamp(0.0, 1.0)
}

/// Evaluate the whole buffer at one global progress value.
///
/// All vertices observe the same `progress`; callers advance the morph
/// controller first and evaluate second within a frame.
pub fn evaluate_buffer(
    from: &ShapeBuffer,
    to: &ShapeBuffer,
    sizes: &[f32],
    config: &MorphConfig,
    progress: f32,
) -> Vec<GpuParticle> {
    debug_assert_eq!(from.len(), to.len());
    debug_assert_eq!(from.len(), sizes.len());

    let max_delay = config.max_delay();
    let color_a = Vec3::from_array(config.color_a);
    let color_b = Vec3::from_array(config.color_b);

    from.positions()
        .iter()
        .zip(to.positions())
        .zip(sizes)
        .map(|((&f, &t), &size)| {
            let n = vertex_noise(f, t, config);
            let delay = n * max_delay;
            let local = local_progress(progress, delay, config.vertex_duration);

            let position = f.lerp(t, local);
            let color = color_a.lerp(color_b, n);

            GpuParticle {
                position: position.to_array(),
                scale: size * config.point_size,
                color: [color.x, color.y, color.z, 1.0],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape_buffer::{random_sizes, ShapeSet};

    fn test_set() -> (ShapeSet, Vec<f32>) {
        let raw = vec![
            (0..50)
                .map(|i| Vec3::new(i as f32 * 0.1, 0.0, 1.0))
                .collect::<Vec<_>>(),
            (0..80)
                .map(|i| Vec3::new(-1.0, i as f32 * 0.1, -2.0))
                .collect::<Vec<_>>(),
        ];
        let set = ShapeSet::reconcile(&raw, 11).unwrap();
        let sizes = random_sizes(set.max_count(), 22);
        (set, sizes)
    }

    #[test]
    fn test_local_progress_window() {
        let duration = 0.4;
        for delay in [0.0, 0.2, 0.4, 0.6] {
            assert_eq!(local_progress(delay * 0.5, delay, duration), 0.0);
            assert_eq!(local_progress(delay + duration + 0.01, delay, duration), 1.0);
            let mid = local_progress(delay + duration * 0.5, delay, duration);
            assert!((mid - 0.5).abs() < 1e-5, "mid was {}", mid);
        }
    }

    #[test]
    fn test_local_progress_pinned_at_global_endpoints() {
        for delay in [0.0, 0.3, 0.6] {
            assert_eq!(local_progress(0.0, delay, 0.4), 0.0);
            assert_eq!(local_progress(1.0, delay, 0.4), 1.0);
        }
        // Degenerate duration still pins the endpoints
        assert_eq!(local_progress(0.0, 0.0, 0.0), 0.0);
        assert_eq!(local_progress(1.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn test_endpoints_exact_regardless_of_delay() {
        let (set, sizes) = test_set();
        let config = MorphConfig::default();
        let from = set.buffer(0).unwrap();
        let to = set.buffer(1).unwrap();

        let at_start = evaluate_buffer(from, to, &sizes, &config, 0.0);
        for (particle, &expected) in at_start.iter().zip(from.positions()) {
            assert_eq!(particle.position, expected.to_array());
        }

        let at_end = evaluate_buffer(from, to, &sizes, &config, 1.0);
        for (particle, &expected) in at_end.iter().zip(to.positions()) {
            assert_eq!(particle.position, expected.to_array());
        }
    }

    #[test]
    fn test_mid_morph_is_staggered() {
        let (set, sizes) = test_set();
        let config = MorphConfig::default();
        let from = set.buffer(0).unwrap();
        let to = set.buffer(1).unwrap();

        let mid = evaluate_buffer(from, to, &sizes, &config, 0.5);

        // With noise-driven delays, vertices should be at different points of
        // their local windows: not all at from, not all at to.
        let mut locals = Vec::new();
        for (i, (&f, &t)) in from.positions().iter().zip(to.positions()).enumerate() {
            let p = Vec3::from_array(mid[i].position);
            let span = (t - f).length();
            if span > 1e-6 {
                locals.push((p - f).length() / span);
            }
        }
        let min = locals.iter().cloned().fold(f32::MAX, f32::min);
        let max = locals.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.05, "no stagger: min={} max={}", min, max);
    }

    #[test]
    fn test_vertex_noise_in_unit_range() {
        let config = MorphConfig::default();
        for i in 0..100 {
            let f = Vec3::new(i as f32 * 0.17, -(i as f32) * 0.29, 0.4);
            let t = Vec3::new(-(i as f32) * 0.11, i as f32 * 0.07, -1.2);
            let n = vertex_noise(f, t, &config);
            assert!((0.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_scale_applies_global_point_size() {
        let (set, sizes) = test_set();
        let config = MorphConfig {
            point_size: 2.0,
            ..Default::default()
        };
        let particles = evaluate_buffer(
            set.buffer(0).unwrap(),
            set.buffer(1).unwrap(),
            &sizes,
            &config,
            0.0,
        );
        for (particle, &size) in particles.iter().zip(&sizes) {
            assert!((particle.scale - size * 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_morph_vertex_layout() {
        assert_eq!(std::mem::size_of::<MorphVertex>(), 32);

        let (set, sizes) = test_set();
        let vertices =
            build_morph_vertices(set.buffer(0).unwrap(), set.buffer(1).unwrap(), &sizes);
        assert_eq!(vertices.len(), set.max_count());
        assert_eq!(
            vertices[0].from_position,
            set.buffer(0).unwrap().position(0).to_array()
        );
    }
}
