//! Per-actor records owned by the engine registry.
//!
//! All mutable per-actor state lives here, owned exclusively by the actor's
//! [`ActorRecord`] — the tick pipeline mutates records in place and no state
//! is shared between actors, so the whole engine needs no synchronization.

use serde::{Deserialize, Serialize};

use crate::profile::ResolvedProfileTable;
use crate::types::{ActorId, EmotionKind, Pose};

/// Lifecycle states an actor moves through while being watched.
///
/// `Following` is terminal: there is no path back to `Ambient` once an actor
/// joins the trailing formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorLifecycleState {
    /// Not currently selected by the watcher.
    #[default]
    Ambient,
    /// The single actor the watcher is currently interacting with.
    Engaged,
    /// A challenge-tagged actor whose intensity gate opened; interaction
    /// time accrual is suspended until the challenge resolves.
    AwaitingChallenge,
    /// Promotion granted; immediately becomes `Following`.
    WonOver,
    /// Registered with the follower roster; emotion ticking has stopped.
    Following,
}

/// Host-provided description of an actor at registration time.
#[derive(Debug, Clone)]
pub struct ActorSpec {
    /// Archetype name whose [`ProfileSet`](crate::profile::ProfileSet)
    /// supplies authored emotion profiles. Unknown or absent names degrade
    /// to synthesized defaults.
    pub archetype: Option<String>,
    /// Whether this actor must pass a minigame challenge to be won over.
    pub requires_challenge: bool,
    /// Score contribution once the actor is following.
    pub point_value: u32,
    /// Initial world pose.
    pub pose: Pose,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            archetype: None,
            requires_challenge: false,
            point_value: 1,
            pose: Pose::default(),
        }
    }
}

/// A sequence currently driving an actor's emotion transitions.
#[derive(Debug, Clone)]
pub struct ActiveSequence {
    /// Name of the running sequence in the library.
    pub name: String,
    /// Index of the rule currently awaiting its gate.
    pub cursor: usize,
    /// Seconds spent in the current semantic state.
    pub time_in_state: f64,
}

/// Mutable emotion state ticked by the accumulator and sequencer.
#[derive(Debug, Clone, Default)]
pub struct ActorEmotionRuntime {
    /// The actor's current semantic emotion.
    pub current_kind: EmotionKind,
    /// Accumulated intensity in [0, 1].
    pub intensity: f32,
    /// Continuous seconds under gaze; reset to zero the moment gaze is lost.
    pub gaze_dwell_seconds: f64,
    /// Debounce latch: set when a trigger fires, cleared by hysteresis.
    pub is_triggered: bool,
    /// Seconds spent idle (un-gazed, un-triggered, sequence-free) toward the
    /// forget reset.
    pub idle_seconds: f64,
    /// The scripted sequence currently in control, if any.
    pub active_sequence: Option<ActiveSequence>,
}

impl ActorEmotionRuntime {
    /// Reset intensity and the trigger latch to defaults.
    ///
    /// Called whenever `current_kind` changes *outside* sequence
    /// progression; sequence advances deliberately keep intensity.
    pub fn reset_accumulation(&mut self) {
        self.intensity = 0.0;
        self.is_triggered = false;
        self.idle_seconds = 0.0;
    }
}

/// Everything the engine tracks for one registered actor.
#[derive(Debug, Clone)]
pub struct ActorRecord {
    /// The actor's identity.
    pub id: ActorId,
    /// Current world pose (host-updated; roster-updated once following).
    pub pose: Pose,
    /// Whether promotion requires a challenge.
    pub requires_challenge: bool,
    /// Score contribution once following.
    pub point_value: u32,
    /// Per-kind profiles resolved once at registration.
    pub profiles: ResolvedProfileTable,
    /// Mutable emotion state.
    pub runtime: ActorEmotionRuntime,
    /// Current lifecycle state.
    pub lifecycle: ActorLifecycleState,
    /// Whether the watcher's gaze currently rests on this actor.
    pub gazed: bool,
}

impl ActorRecord {
    /// Build a fresh record from a spec and its resolved profiles.
    #[must_use]
    pub fn new(id: ActorId, spec: &ActorSpec, profiles: ResolvedProfileTable) -> Self {
        Self {
            id,
            pose: spec.pose,
            requires_challenge: spec.requires_challenge,
            point_value: spec.point_value,
            profiles,
            runtime: ActorEmotionRuntime::default(),
            lifecycle: ActorLifecycleState::default(),
            gazed: false,
        }
    }

    /// Whether this actor still participates in emotion ticking.
    ///
    /// Following actors belong to the roster and no longer accumulate.
    #[must_use]
    pub fn ticks_emotion(&self) -> bool {
        self.lifecycle != ActorLifecycleState::Following
    }
}
