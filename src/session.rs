//! Owned particle morph session.
//!
//! Ties the reconciled shape set, the per-vertex size attribute, the config
//! surface and the morph controller into one explicit value that drivers pass
//! by reference. There are no ambient globals; everything the control surface
//! and the rendering collaborator need goes through this type.

use glam::Vec3;
use log::info;

use crate::morph::MorphController;
use crate::particle_eval::{self, GpuParticle, MorphVertex};
use crate::shape_buffer::{random_sizes, ShapeSet};
use crate::uniforms::{MorphConfig, MorphUniforms};

/// One entry of the fixed morph trigger table exposed to the control
/// surface (e.g. one debug-panel button per shape).
#[derive(Debug, Clone)]
pub struct MorphTrigger {
    /// Shape index this trigger morphs to.
    pub index: usize,
    /// Display label for the control surface.
    pub label: String,
}

/// A live particle morph session over a set of loaded shapes.
pub struct MorphSession {
    shapes: ShapeSet,
    sizes: Vec<f32>,
    controller: MorphController,
    /// Externally adjustable parameters.
    pub config: MorphConfig,
    /// Viewport resolution in physical pixels, for the uniform block.
    pub resolution: [f32; 2],
}

impl MorphSession {
    /// Create a session over an already reconciled shape set.
    pub fn new(shapes: ShapeSet, config: MorphConfig) -> Self {
        let sizes = random_sizes(shapes.max_count(), shapes.max_count() as u64);
        let controller = MorphController::new(shapes.len(), config.morph_duration);
        info!(
            "session ready: {} shapes, {} particles",
            shapes.len(),
            shapes.max_count()
        );
        Self {
            shapes,
            sizes,
            controller,
            config,
            resolution: [1.0, 1.0],
        }
    }

    /// Reconcile raw position arrays and create a session over them.
    pub fn from_raw(raw: &[Vec<Vec3>], config: MorphConfig) -> Result<Self, String> {
        let seed = raw.iter().map(|shape| shape.len() as u64).sum::<u64>();
        let shapes = ShapeSet::reconcile(raw, seed)?;
        Ok(Self::new(shapes, config))
    }

    /// Start a morph to the shape at `target_index` at wall-clock time `now`.
    ///
    /// Out-of-range targets are rejected with no state change. Re-triggering
    /// mid-morph replaces the in-flight animation.
    pub fn morph(&mut self, target_index: usize, now: f32) -> Result<(), String> {
        self.controller.morph(target_index, now)
    }

    /// Advance the in-flight morph to wall-clock time `now`.
    ///
    /// Call once per frame, before [`evaluate`](Self::evaluate), so every
    /// vertex in the frame observes the same progress value.
    pub fn advance(&mut self, now: f32) {
        self.controller.advance(now);
    }

    /// Evaluate every particle at the current global progress.
    pub fn evaluate(&self) -> Vec<GpuParticle> {
        let from = self
            .shapes
            .buffer(self.controller.from_index())
            .expect("from binding is validated at morph time");
        let to = self
            .shapes
            .buffer(self.controller.target_index())
            .expect("target binding is validated at morph time");
        particle_eval::evaluate_buffer(from, to, &self.sizes, &self.config, self.progress())
    }

    /// Static vertex stream for the current "from"/"to" binding, for GPU
    /// consumers that interpolate in the shader. Needs rebuilding only after
    /// a morph trigger rebinds the buffers.
    pub fn morph_vertices(&self) -> Vec<MorphVertex> {
        let from = self
            .shapes
            .buffer(self.controller.from_index())
            .expect("from binding is validated at morph time");
        let to = self
            .shapes
            .buffer(self.controller.target_index())
            .expect("target binding is validated at morph time");
        particle_eval::build_morph_vertices(from, to, &self.sizes)
    }

    /// Uniform block for the current frame.
    pub fn uniforms(&self) -> MorphUniforms {
        MorphUniforms::new(&self.config, self.resolution, self.progress())
    }

    /// Fixed trigger table, one entry per loaded shape.
    pub fn triggers(&self) -> Vec<MorphTrigger> {
        (0..self.shapes.len())
            .map(|index| MorphTrigger {
                index,
                label: format!("shape {}", index),
            })
            .collect()
    }

    /// Observable global progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.controller.progress()
    }

    /// Index of the shape the cloud rests at (or departed from).
    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }

    /// Whether a morph animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    /// Number of loaded shapes.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of particles (the common vertex count).
    pub fn particle_count(&self) -> usize {
        self.shapes.max_count()
    }

    /// Per-vertex size attribute, assigned once at load time.
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Update the viewport resolution (physical pixels).
    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_shapes() -> Vec<Vec<Vec3>> {
        vec![
            (0..30).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
            (0..45).map(|i| Vec3::new(0.0, i as f32, 0.0)).collect(),
            (0..20).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect(),
        ]
    }

    #[test]
    fn test_session_setup() {
        let session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        assert_eq!(session.shape_count(), 3);
        assert_eq!(session.particle_count(), 45);
        assert_eq!(session.sizes().len(), 45);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn test_trigger_table_is_fixed_and_indexed() {
        let session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        let triggers = session.triggers();
        assert_eq!(triggers.len(), 3);
        for (i, trigger) in triggers.iter().enumerate() {
            assert_eq!(trigger.index, i);
        }
    }

    #[test]
    fn test_frame_loop_reaches_target() {
        let mut session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        session.morph(1, 0.0).unwrap();

        // 60 fps frame loop past the 3 s morph duration
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        while session.is_animating() {
            now += dt;
            session.advance(now);
        }

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.progress(), 1.0);

        let particles = session.evaluate();
        let shapes = raw_shapes();
        for (particle, &expected) in particles.iter().zip(shapes[1].iter()) {
            assert_eq!(particle.position, expected.to_array());
        }
    }

    #[test]
    fn test_invalid_target_leaves_session_untouched() {
        let mut session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        assert!(session.morph(7, 0.0).is_err());
        assert!(!session.is_animating());
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn test_uniforms_track_progress_and_resolution() {
        let mut session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        session.set_resolution(1920.0, 1080.0);
        session.morph(2, 0.0).unwrap();
        session.advance(1.5);

        let uniforms = session.uniforms();
        assert_eq!(uniforms.resolution, [1920.0, 1080.0]);
        assert!((uniforms.progress - 0.5).abs() < 1e-6);
        assert_eq!(uniforms.point_size, session.config.point_size);
    }

    #[test]
    fn test_morph_vertices_follow_binding() {
        let mut session = MorphSession::from_raw(&raw_shapes(), MorphConfig::default()).unwrap();
        session.morph(2, 0.0).unwrap();

        let vertices = session.morph_vertices();
        assert_eq!(vertices.len(), session.particle_count());
        // First 20 target slots are original vertices of shape 2
        assert_eq!(vertices[5].to_position, [0.0, 0.0, 5.0]);
        // Source is shape 0
        assert_eq!(vertices[5].from_position, [5.0, 0.0, 0.0]);
    }
}
