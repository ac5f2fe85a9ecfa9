//! The engine context — registry, tick pipeline, and public surface.
//!
//! One [`Engine`] owns all per-actor state and runs the strict per-frame
//! pipeline: gaze/hover facts are resolved first, then the intensity
//! accumulator, then the transition sequencer, then lifecycle promotion,
//! then follower repositioning. The engine is an explicit context object
//! passed by reference — there are no global singletons, so tests (and
//! hosts) can run multiple isolated instances.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::accumulator;
use crate::actor::{ActorLifecycleState, ActorRecord, ActorSpec};
use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventQueue};
use crate::gaze::{self, GazeTracker};
use crate::lifecycle::LifecycleController;
use crate::profile::ProfileSet;
use crate::roster::FollowerRoster;
use crate::sequence::{self, Sequence, SequenceLibrary};
use crate::types::{ActorId, EmotionKind, Pose, SimTime, Vec3};

/// The gaze-driven emotion simulation core.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    archetypes: HashMap<String, ProfileSet>,
    sequences: SequenceLibrary,
    actors: HashMap<ActorId, ActorRecord>,
    gaze: GazeTracker,
    lifecycle: LifecycleController,
    roster: FollowerRoster,
    queue: EventQueue,
    watcher_pose: Pose,
    watcher_emotion: EmotionKind,
    intensity_multiplier: f32,
    now: SimTime,
}

impl Engine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            archetypes: HashMap::new(),
            sequences: SequenceLibrary::new(),
            actors: HashMap::new(),
            gaze: GazeTracker::new(),
            lifecycle: LifecycleController::new(),
            roster: FollowerRoster::new(),
            queue: EventQueue::new(),
            watcher_pose: Pose::default(),
            watcher_emotion: EmotionKind::Neutral,
            intensity_multiplier: 1.0,
            now: SimTime::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Register an archetype's authored emotion profiles. Actors reference
    /// archetypes by name at registration.
    pub fn add_archetype(&mut self, name: impl Into<String>, profiles: ProfileSet) {
        self.archetypes.insert(name.into(), profiles);
    }

    /// Register a sequence in the library.
    pub fn register_sequence(&mut self, sequence: Sequence) {
        self.sequences.register(sequence);
    }

    /// Map an emotion kind to a sequence auto-started when a trigger fires
    /// at sequence-eligible intensity.
    pub fn set_auto_sequence(&mut self, kind: EmotionKind, sequence_name: impl Into<String>) {
        self.sequences.set_auto_start(kind, sequence_name);
    }

    /// Register an actor with the engine. Profiles are resolved once, here:
    /// authored where the archetype provides them, synthesized otherwise.
    pub fn register_actor(&mut self, spec: ActorSpec) -> ActorId {
        let profile_set = match spec.archetype.as_deref() {
            Some(name) => match self.archetypes.get(name) {
                Some(set) => set.clone(),
                None => {
                    warn!(archetype = name, "unknown archetype, using synthesized profiles");
                    ProfileSet::new()
                }
            },
            None => ProfileSet::new(),
        };
        let table = profile_set.resolve(&self.config.emotion);
        let id = ActorId::new();
        info!(actor = %id, archetype = ?spec.archetype, "actor registered");
        self.actors.insert(id, ActorRecord::new(id, &spec, table));
        id
    }

    /// Remove an actor from the engine entirely. Idempotent; any engagement,
    /// hover state, or follower slot it held is released.
    pub fn unregister_actor(&mut self, id: ActorId) {
        if self.actors.remove(&id).is_some() {
            info!(actor = %id, "actor unregistered");
        }
        self.lifecycle.forget(id);
        self.gaze.forget(id);
        self.roster.unregister(id, &mut self.queue);
    }

    // -----------------------------------------------------------------------
    // Per-frame inputs
    // -----------------------------------------------------------------------

    /// Update the watcher's pose for this frame.
    pub fn set_watcher_pose(&mut self, pose: Pose) {
        self.watcher_pose = pose;
    }

    /// Update the watcher's currently expressed emotion (drives the
    /// emotion-match interaction bonus).
    pub fn set_watcher_emotion(&mut self, kind: EmotionKind) {
        self.watcher_emotion = kind;
    }

    /// Move an actor (host-side movement or collision results). Ignored for
    /// unknown ids.
    pub fn set_actor_pose(&mut self, id: ActorId, pose: Pose) {
        if let Some(record) = self.actors.get_mut(&id) {
            record.pose = pose;
        }
    }

    /// Set the fever-mode buildup multiplier. Values below zero are clamped
    /// to zero.
    pub fn set_intensity_multiplier(&mut self, multiplier: f32) {
        self.intensity_multiplier = multiplier.max(0.0);
    }

    /// Out-of-band emotion kind setter.
    ///
    /// Resets intensity and the trigger latch (a kind change outside
    /// sequence progression) and emits `EmotionKindChanged`. An active
    /// sequence is *not* aborted: it waits until the actor's kind matches
    /// its cursor rule again. Ignored for unknown or following actors.
    pub fn set_actor_emotion(&mut self, id: ActorId, kind: EmotionKind) {
        let Some(record) = self.actors.get_mut(&id) else {
            debug!(actor = %id, "emotion set for unknown actor, ignoring");
            return;
        };
        if !record.ticks_emotion() || record.runtime.current_kind == kind {
            return;
        }
        let old = record.runtime.current_kind;
        record.runtime.current_kind = kind;
        record.runtime.reset_accumulation();
        self.queue.emit(EngineEvent::EmotionKindChanged {
            actor: id,
            old,
            new: kind,
        });
    }

    // -----------------------------------------------------------------------
    // Sequences & challenges
    // -----------------------------------------------------------------------

    /// Start a named sequence on an actor. Unknown actors, unknown sequence
    /// names, and zero-rule sequences are logged no-ops.
    pub fn start_sequence(&mut self, id: ActorId, name: &str) -> bool {
        let Some(record) = self.actors.get_mut(&id) else {
            debug!(actor = %id, "sequence start for unknown actor, ignoring");
            return false;
        };
        if !record.ticks_emotion() {
            return false;
        }
        sequence::start(record, &self.sequences, name, &mut self.queue)
    }

    /// Stop an actor's active sequence. Idempotent and always safe.
    pub fn stop_sequence(&mut self, id: ActorId) {
        if let Some(record) = self.actors.get_mut(&id) {
            sequence::stop(record);
        }
    }

    /// Report a challenge outcome from the external minigame runner.
    pub fn resolve_challenge(&mut self, id: ActorId, success: bool) {
        let promoted =
            self.lifecycle
                .resolve_challenge(id, success, &mut self.actors, &mut self.queue);
        if let Some(id) = promoted {
            self.hand_to_roster(id);
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    ///
    /// Pipeline order is strict: gaze → accumulator → sequencer → lifecycle
    /// → roster. `dt <= 0` is a no-op.
    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.now = self.now.advanced(dt);

        // 1. Gaze/hover facts.
        let gaze_targets: Vec<(ActorId, Vec3)> = self
            .actors
            .values()
            .filter(|r| r.ticks_emotion())
            .map(|r| (r.id, r.pose.position))
            .collect();
        let edges = self.gaze.tick(
            &self.watcher_pose,
            gaze_targets.into_iter(),
            dt,
            &self.config.gaze,
        );
        for (id, gazed) in edges {
            if let Some(record) = self.actors.get_mut(&id) {
                record.gazed = gazed;
            }
            self.queue
                .emit(EngineEvent::GazeStatusChanged { actor: id, gazed });
        }

        // 2. Intensity accumulation (+ sequence auto-start on fresh triggers).
        for record in self.actors.values_mut() {
            if !record.ticks_emotion() {
                continue;
            }
            let gazed = record.gazed;
            let fired = accumulator::tick(
                record,
                gazed,
                dt,
                self.intensity_multiplier,
                &self.config.emotion,
                self.now,
                &mut self.queue,
            );
            if fired {
                sequence::maybe_auto_start(
                    record,
                    &self.sequences,
                    &self.config.emotion,
                    &mut self.queue,
                );
            }
        }

        // 3. Scripted transitions.
        for record in self.actors.values_mut() {
            if record.ticks_emotion() {
                sequence::tick(record, &self.sequences, dt, &mut self.queue);
            }
        }

        // 4. Lifecycle promotion.
        let focus = gaze::select_focus(
            &self.watcher_pose,
            self.actors
                .values()
                .filter(|r| {
                    matches!(
                        r.lifecycle,
                        ActorLifecycleState::Ambient | ActorLifecycleState::Engaged
                    )
                })
                .map(|r| (r.id, r.pose.position)),
            &self.config.gaze,
        );
        let promoted = self.lifecycle.tick(
            focus,
            self.watcher_emotion,
            &mut self.actors,
            dt,
            &self.config.lifecycle,
            &mut self.queue,
        );
        for id in promoted {
            self.hand_to_roster(id);
        }

        // 5. Follower repositioning.
        self.roster.tick(
            &self.watcher_pose,
            &mut self.actors,
            dt,
            &self.config.roster,
            &mut self.queue,
        );
    }

    fn hand_to_roster(&mut self, id: ActorId) {
        // Following actors leave the gaze and emotion layers permanently.
        // The hover session ends here, so listeners get its exit edge now
        // rather than never.
        if self.gaze.is_gazed(id) {
            self.gaze.forget(id);
            self.queue
                .emit(EngineEvent::GazeStatusChanged { actor: id, gazed: false });
        }
        if let Some(record) = self.actors.get_mut(&id) {
            record.gazed = false;
        }
        if let Some(record) = self.actors.get(&id) {
            self.roster.register(record, &mut self.queue);
        }
    }

    // -----------------------------------------------------------------------
    // Outputs & snapshots
    // -----------------------------------------------------------------------

    /// Remove and return all events emitted since the last drain, in
    /// emission order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.queue.drain()
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// An actor's current emotion kind.
    #[must_use]
    pub fn emotion_of(&self, id: ActorId) -> Option<EmotionKind> {
        self.actors.get(&id).map(|r| r.runtime.current_kind)
    }

    /// An actor's current intensity.
    #[must_use]
    pub fn intensity_of(&self, id: ActorId) -> Option<f32> {
        self.actors.get(&id).map(|r| r.runtime.intensity)
    }

    /// An actor's current lifecycle state.
    #[must_use]
    pub fn lifecycle_of(&self, id: ActorId) -> Option<ActorLifecycleState> {
        self.actors.get(&id).map(|r| r.lifecycle)
    }

    /// An actor's current pose.
    #[must_use]
    pub fn pose_of(&self, id: ActorId) -> Option<Pose> {
        self.actors.get(&id).map(|r| r.pose)
    }

    /// Whether the watcher's gaze currently rests on the actor.
    #[must_use]
    pub fn is_gazed(&self, id: ActorId) -> bool {
        self.gaze.is_gazed(id)
    }

    /// The actor currently engaged with the watcher.
    #[must_use]
    pub fn engaged_actor(&self) -> Option<ActorId> {
        self.lifecycle.engaged()
    }

    /// Number of registered actors (including followers).
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of actors currently following the watcher.
    #[must_use]
    pub fn follower_count(&self) -> usize {
        self.roster.count()
    }

    /// Sum of follower point values.
    #[must_use]
    pub fn follower_point_total(&self) -> u32 {
        self.roster.point_total()
    }

    /// Whether the actor is in the trailing formation.
    #[must_use]
    pub fn is_following(&self, id: ActorId) -> bool {
        self.roster.contains(id)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
