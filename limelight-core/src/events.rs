//! Engine output events.
//!
//! Presentation layers (UI, audio, haptics, scoring) consume the engine
//! through a single drained queue rather than registered callbacks: the
//! engine pushes [`EngineEvent`]s during [`tick`](crate::engine::Engine::tick)
//! and the host drains them afterwards, in emission order. This keeps the
//! core free of listener types and makes per-frame ordering observable in
//! tests.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, EmotionKind, SimTime};

/// Immutable record of a threshold-crossing emotion reaction.
///
/// Produced once per trigger, never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionEvent {
    /// The actor whose emotion fired.
    pub actor: ActorId,
    /// The emotion kind at the time of firing.
    pub kind: EmotionKind,
    /// Intensity at the time of firing.
    pub intensity: f32,
    /// Simulation time of the firing.
    pub timestamp: SimTime,
}

/// Everything the engine reports to the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An actor's intensity crossed its trigger threshold.
    EmotionTriggered(EmotionEvent),
    /// An actor's emotion kind changed (idle reset, sequence advance, or
    /// out-of-band setter).
    EmotionKindChanged {
        /// The actor that changed.
        actor: ActorId,
        /// Kind before the change.
        old: EmotionKind,
        /// Kind after the change.
        new: EmotionKind,
    },
    /// An actor entered or left the watcher's gaze (edge-reported exactly
    /// once per continuous hover session).
    GazeStatusChanged {
        /// The actor whose hover state flipped.
        actor: ActorId,
        /// `true` on hover enter, `false` on hover exit.
        gazed: bool,
    },
    /// A non-looping sequence ran off the end of its rule list and froze.
    SequenceFinished {
        /// The actor whose sequence completed.
        actor: ActorId,
        /// Name of the completed sequence.
        sequence: String,
        /// Kind the actor froze at.
        final_kind: EmotionKind,
    },
    /// A challenge-tagged Engaged actor reached the challenge intensity
    /// threshold; the external minigame runner should start a challenge and
    /// answer via [`resolve_challenge`](crate::engine::Engine::resolve_challenge).
    ChallengeReady {
        /// The actor awaiting a challenge.
        actor: ActorId,
        /// Intensity at the moment the gate opened.
        intensity: f32,
    },
    /// An actor was won over and handed to the follower roster.
    ActorWonOver {
        /// The promoted actor.
        actor: ActorId,
    },
    /// The follower roster changed size.
    FollowerCountChanged {
        /// Number of currently registered followers.
        count: usize,
        /// Sum of the point values of all registered followers.
        point_total: u32,
    },
}

/// Ordered per-tick event queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<EngineEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Remove and return all queued events in emission order.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
