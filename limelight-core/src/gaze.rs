//! Gaze / hover layer — who the watcher is looking at.
//!
//! The tracker recomputes the hover set at a bounded rate
//! (`sample_interval_seconds`), holding the previous set between samples, and
//! reports enter/exit edges exactly once per continuous hover session.
//! Downstream accumulation always integrates with real `dt`, so throttled
//! sampling delays edges but never distorts rates.
//!
//! An actor hovers when it is within `max_distance` of the watcher and its
//! angular offset from the watcher's forward direction is within the
//! configured cone half-angle.

use ordered_float::OrderedFloat;
use std::collections::HashSet;
use tracing::trace;

use crate::config::GazeConfig;
use crate::types::{ActorId, Pose, Vec3};

/// Angular offset in degrees between the watcher's forward direction and the
/// direction to `position`. Returns 180.0 for degenerate (coincident) points
/// so callers treat them as maximally off-axis only when the forward vector
/// itself is unusable.
#[must_use]
pub fn angular_offset_deg(watcher: &Pose, position: Vec3) -> f32 {
    let Some(to) = position.sub(watcher.position).normalized() else {
        // Standing exactly on the watcher: dead ahead by convention.
        return 0.0;
    };
    let Some(forward) = watcher.forward.normalized() else {
        return 180.0;
    };
    forward.dot(to).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Whether `position` lies inside the watcher's gaze cone and radius.
#[must_use]
pub fn in_gaze_cone(watcher: &Pose, position: Vec3, config: &GazeConfig) -> bool {
    let distance = watcher.position.distance(position);
    if distance > config.max_distance {
        return false;
    }
    angular_offset_deg(watcher, position) <= config.cone_half_angle_deg
}

/// Pick the engagement focus: the nearest candidate inside the cone,
/// breaking distance ties by angular closeness.
#[must_use]
pub fn select_focus(
    watcher: &Pose,
    candidates: impl Iterator<Item = (ActorId, Vec3)>,
    config: &GazeConfig,
) -> Option<ActorId> {
    candidates
        .filter(|(_, position)| in_gaze_cone(watcher, *position, config))
        .min_by_key(|(_, position)| {
            (
                OrderedFloat(watcher.position.distance(*position)),
                OrderedFloat(angular_offset_deg(watcher, *position)),
            )
        })
        .map(|(id, _)| id)
}

/// Throttled hover-state tracker with edge reporting.
#[derive(Debug, Default)]
pub struct GazeTracker {
    hover: HashSet<ActorId>,
    since_last_sample: f64,
    sampled_once: bool,
}

impl GazeTracker {
    /// Create a tracker with an empty hover set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds, resampling the hover set when due.
    ///
    /// Returns the edge transitions `(actor, gazed)` that occurred, each
    /// exactly once per continuous hover session.
    pub fn tick(
        &mut self,
        watcher: &Pose,
        actors: impl Iterator<Item = (ActorId, Vec3)>,
        dt: f64,
        config: &GazeConfig,
    ) -> Vec<(ActorId, bool)> {
        self.since_last_sample += dt;
        let due = !self.sampled_once || self.since_last_sample >= config.sample_interval_seconds;
        if !due {
            return Vec::new();
        }
        self.sampled_once = true;
        self.since_last_sample = 0.0;

        let fresh: HashSet<ActorId> = actors
            .filter(|(_, position)| in_gaze_cone(watcher, *position, config))
            .map(|(id, _)| id)
            .collect();

        let mut edges = Vec::new();
        for &id in &fresh {
            if !self.hover.contains(&id) {
                trace!(actor = %id, "hover enter");
                edges.push((id, true));
            }
        }
        for &id in &self.hover {
            if !fresh.contains(&id) {
                trace!(actor = %id, "hover exit");
                edges.push((id, false));
            }
        }
        self.hover = fresh;
        edges
    }

    /// Whether the watcher's gaze currently rests on `id`.
    #[must_use]
    pub fn is_gazed(&self, id: ActorId) -> bool {
        self.hover.contains(&id)
    }

    /// Drop an actor from the hover set without emitting an exit edge
    /// (used when the actor is unregistered mid-session).
    pub fn forget(&mut self, id: ActorId) {
        self.hover.remove(&id);
    }
}
