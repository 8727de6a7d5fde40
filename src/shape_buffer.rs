//! Shape buffer reconciliation.
//!
//! Loaded meshes rarely share a vertex count, but the particle system renders
//! one fixed-size point cloud and morphs it between shapes. This module
//! reconciles N raw position arrays of differing lengths into N buffers of
//! identical length `max_count`, padding shorter shapes by resampling random
//! existing vertices of the same shape. Resampling (rather than zero-fill)
//! keeps the excess particles on the shape's surface instead of collapsing
//! them to the origin.

use glam::Vec3;
use log::{debug, info};

/// A fixed-length array of 3D points representing one loaded mesh, padded to
/// the common vertex count. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ShapeBuffer {
    positions: Vec<Vec3>,
}

impl ShapeBuffer {
    /// The padded vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Number of vertices (always the set's `max_count`).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the buffer is empty. Never true for reconciled buffers.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position at a vertex slot.
    pub fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }
}

/// The full collection of reconciled shape buffers, indexed 0..N-1.
///
/// Built once at load time and read-only afterwards; morphs only rebind
/// which buffers act as "from" and "to".
#[derive(Debug, Clone)]
pub struct ShapeSet {
    buffers: Vec<ShapeBuffer>,
    max_count: usize,
}

impl ShapeSet {
    /// Reconcile raw position arrays into equal-length shape buffers.
    ///
    /// Every output buffer has length `max_count = max(len(raw_i))`. Original
    /// vertices are copied unchanged; slots beyond a shape's own count are
    /// filled with uniformly random existing vertices of that shape.
    ///
    /// Returns an error if the input set is empty or any shape has no
    /// vertices; padding from an empty source is a precondition violation.
    pub fn reconcile(raw: &[Vec<Vec3>], seed: u64) -> Result<Self, String> {
        if raw.is_empty() {
            return Err("no shapes to reconcile".to_string());
        }
        for (i, shape) in raw.iter().enumerate() {
            if shape.is_empty() {
                return Err(format!("shape {} has no vertices", i));
            }
        }

        let max_count = raw.iter().map(|shape| shape.len()).max().unwrap_or(0);
        let mut rng = Xorshift64::new(seed);

        let mut buffers = Vec::with_capacity(raw.len());
        for (i, shape) in raw.iter().enumerate() {
            let mut positions = Vec::with_capacity(max_count);
            positions.extend_from_slice(shape);
            for _ in shape.len()..max_count {
                let r = (rng.next_f32() * shape.len() as f32) as usize;
                // next_f32 is in [0, 1) but guard the boundary anyway
                let r = r.min(shape.len() - 1);
                positions.push(shape[r]);
            }
            debug!(
                "shape {}: {} vertices, {} padded",
                i,
                shape.len(),
                max_count - shape.len()
            );
            buffers.push(ShapeBuffer { positions });
        }

        info!(
            "reconciled {} shapes to {} vertices each",
            buffers.len(),
            max_count
        );

        Ok(Self { buffers, max_count })
    }

    /// Number of shapes in the set.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the set holds no shapes. Never true after reconciliation.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// The common vertex count shared by all buffers.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Shape buffer at an index.
    pub fn buffer(&self, index: usize) -> Option<&ShapeBuffer> {
        self.buffers.get(index)
    }
}

/// Generate one random size scalar in [0, 1) per vertex slot.
///
/// Assigned once at load time; each particle keeps its size for the whole
/// session regardless of which shape it currently belongs to.
pub fn random_sizes(count: usize, seed: u64) -> Vec<f32> {
    let mut rng = Xorshift64::new(seed);
    (0..count).map(|_| rng.next_f32()).collect()
}

/// xorshift64 RNG for padding and size attributes.
///
/// Note: seed 0 is degenerate (produces all zeros), so it is replaced with a
/// default non-zero seed.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x5DEECE66D } else { seed };
        Self { state }
    }

    /// Next value in [0, 1).
    fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        // Take the high 24 bits so the quotient stays below 1.0
        ((self.state >> 40) as f32) / ((1u32 << 24) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(n: usize, offset: f32) -> Vec<Vec3> {
        (0..n)
            .map(|i| Vec3::new(i as f32 + offset, offset, -(i as f32)))
            .collect()
    }

    #[test]
    fn test_all_buffers_share_max_count() {
        let raw = vec![shape(1000, 0.0), shape(1500, 1.0), shape(800, 2.0), shape(1200, 3.0)];
        let set = ShapeSet::reconcile(&raw, 42).unwrap();

        assert_eq!(set.max_count(), 1500);
        assert_eq!(set.len(), 4);
        for i in 0..set.len() {
            assert_eq!(set.buffer(i).unwrap().len(), 1500);
        }
    }

    #[test]
    fn test_original_vertices_copied_unchanged() {
        let raw = vec![shape(10, 0.0), shape(25, 5.0)];
        let set = ShapeSet::reconcile(&raw, 1).unwrap();

        for (i, source) in raw.iter().enumerate() {
            let buffer = set.buffer(i).unwrap();
            for (j, &p) in source.iter().enumerate() {
                assert_eq!(buffer.position(j), p, "shape {} slot {}", i, j);
            }
        }
    }

    #[test]
    fn test_padding_reuses_source_geometry() {
        let raw = vec![shape(10, 0.0), shape(25, 5.0)];
        let set = ShapeSet::reconcile(&raw, 99).unwrap();

        let buffer = set.buffer(0).unwrap();
        for j in 10..set.max_count() {
            let padded = buffer.position(j);
            assert!(
                raw[0].contains(&padded),
                "padded slot {} is not a source vertex: {:?}",
                j,
                padded
            );
        }
    }

    #[test]
    fn test_inputs_not_mutated() {
        let raw = vec![shape(3, 0.0), shape(7, 1.0)];
        let before = raw.clone();
        let _set = ShapeSet::reconcile(&raw, 7).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_empty_shape_rejected() {
        let raw = vec![shape(5, 0.0), vec![]];
        assert!(ShapeSet::reconcile(&raw, 1).is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(ShapeSet::reconcile(&[], 1).is_err());
    }

    #[test]
    fn test_equal_counts_need_no_padding() {
        let raw = vec![shape(8, 0.0), shape(8, 1.0)];
        let set = ShapeSet::reconcile(&raw, 3).unwrap();
        assert_eq!(set.max_count(), 8);
        for (i, source) in raw.iter().enumerate() {
            assert_eq!(set.buffer(i).unwrap().positions(), source.as_slice());
        }
    }

    #[test]
    fn test_random_sizes_in_unit_range() {
        let sizes = random_sizes(1000, 42);
        assert_eq!(sizes.len(), 1000);
        for &s in &sizes {
            assert!((0.0..1.0).contains(&s), "size out of range: {}", s);
        }
        // Not all identical
        assert!(sizes.iter().any(|&s| (s - sizes[0]).abs() > 1e-3));
    }

    #[test]
    fn test_seed_zero_produces_valid_sizes() {
        let sizes = random_sizes(10, 0);
        assert!(sizes.iter().any(|&s| s > 1e-6));
    }
}
