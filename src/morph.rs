//! Morph controller: timed transitions between shape buffers.
//!
//! The controller owns the current shape index and a single global progress
//! scalar in [0, 1]. Triggering a morph rebinds the "from"/"to" buffer
//! indices, resets progress and starts a linear timed animation; the
//! per-vertex stagger is applied downstream from this one scalar, not here.
//!
//! Progress is advanced by an external tick (`advance(now)`) and queried,
//! never blocked on. All vertices evaluated within a frame observe the same
//! progress value.

use log::{debug, warn};

/// Default wall-clock duration of a morph, in seconds.
pub const DEFAULT_MORPH_DURATION: f32 = 3.0;

/// An in-flight timed progress animation.
///
/// Linear easing from 0 at `start` to 1 at `start + duration`. Triggering a
/// new morph replaces the whole value, so stale animations can never apply:
/// at most one driver exists at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressAnimation {
    start: f32,
    duration: f32,
}

impl ProgressAnimation {
    fn new(start: f32, duration: f32) -> Self {
        Self { start, duration }
    }

    /// Progress value at a point in time, clamped to [0, 1].
    fn value_at(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }
}

/// State machine driving the morph of the particle cloud.
///
/// Conceptually two states: idle (progress clamped at 0 or 1, no motion) and
/// animating (progress moving 0 to 1 under the timed driver).
#[derive(Debug, Clone)]
pub struct MorphController {
    shape_count: usize,
    /// Index of the shape the cloud currently rests at (or departed from).
    current_index: usize,
    /// Index of the shape bound as the morph source.
    from_index: usize,
    /// Index of the shape bound as the morph target.
    target_index: usize,
    progress: f32,
    morph_duration: f32,
    animation: Option<ProgressAnimation>,
}

impl MorphController {
    /// Create a controller over a set of `shape_count` shapes, resting at
    /// shape 0 with progress 0.
    pub fn new(shape_count: usize, morph_duration: f32) -> Self {
        Self {
            shape_count,
            current_index: 0,
            from_index: 0,
            target_index: 0,
            progress: 0.0,
            morph_duration,
            animation: None,
        }
    }

    /// Start a morph from the current shape to `target_index`.
    ///
    /// Rejects out-of-range targets without touching any state. Re-triggering
    /// while a morph is in flight is legal: the previous animation is
    /// replaced and progress restarts from 0, with the shape the cloud most
    /// recently arrived at as the new source.
    pub fn morph(&mut self, target_index: usize, now: f32) -> Result<(), String> {
        if target_index >= self.shape_count {
            let msg = format!(
                "morph target {} out of range (have {} shapes)",
                target_index, self.shape_count
            );
            warn!("{}", msg);
            return Err(msg);
        }

        self.from_index = self.current_index;
        self.target_index = target_index;
        self.progress = 0.0;
        self.animation = Some(ProgressAnimation::new(now, self.morph_duration));

        debug!(
            "morph started: {} -> {} over {}s",
            self.from_index, self.target_index, self.morph_duration
        );
        Ok(())
    }

    /// Advance the in-flight animation to wall-clock time `now`.
    ///
    /// On completion (progress reaches 1) the target becomes the current
    /// shape, so the next morph departs from the shape just arrived at.
    pub fn advance(&mut self, now: f32) {
        if let Some(animation) = self.animation {
            self.progress = animation.value_at(now);
            if self.progress >= 1.0 {
                self.current_index = self.target_index;
                self.animation = None;
                debug!("morph complete: resting at shape {}", self.current_index);
            }
        }
    }

    /// Global progress scalar in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Index of the shape the cloud rests at (or departed from).
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index of the buffer bound as the morph source.
    pub fn from_index(&self) -> usize {
        self.from_index
    }

    /// Index of the buffer bound as the morph target.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Whether a timed animation is currently in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }
}
