//! Actor lifecycle promotion — Ambient through Following.
//!
//! At most one actor is Engaged with the watcher at a time; switching the
//! engaged actor resets the interaction timer with no partial credit.
//! Regular actors promote on sustained interaction time, accrued faster
//! while the watcher's expressed emotion matches the actor's. Challenge-
//! tagged actors instead open a challenge gate at an intensity threshold and
//! promote only on challenge success; accrual is suspended while a challenge
//! is pending. `WonOver` is transited instantly into `Following`, which is
//! terminal for this engine.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::actor::{ActorLifecycleState, ActorRecord};
use crate::config::LifecycleConfig;
use crate::events::{EngineEvent, EventQueue};
use crate::types::{ActorId, EmotionKind};

/// Tracks the single engaged actor and its interaction timer.
#[derive(Debug, Default)]
pub struct LifecycleController {
    engaged: Option<ActorId>,
    interaction_seconds: f64,
}

impl LifecycleController {
    /// Create a controller with no engaged actor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor currently engaged with the watcher, if any.
    #[must_use]
    pub fn engaged(&self) -> Option<ActorId> {
        self.engaged
    }

    /// Accrued interaction seconds for the engaged actor.
    #[must_use]
    pub fn interaction_seconds(&self) -> f64 {
        self.interaction_seconds
    }

    /// Drop any bookkeeping for an unregistered actor.
    pub fn forget(&mut self, id: ActorId) {
        if self.engaged == Some(id) {
            self.engaged = None;
            self.interaction_seconds = 0.0;
        }
    }

    /// Advance lifecycle state by `dt` seconds.
    ///
    /// `focus` is the engagement selection for this frame (nearest eligible
    /// actor in the gaze cone). Returns the actors promoted to `Following`
    /// this tick, in promotion order, for roster handoff.
    pub fn tick(
        &mut self,
        focus: Option<ActorId>,
        watcher_emotion: EmotionKind,
        actors: &mut HashMap<ActorId, ActorRecord>,
        dt: f64,
        config: &LifecycleConfig,
        queue: &mut EventQueue,
    ) -> Vec<ActorId> {
        let mut promoted = Vec::new();
        if dt <= 0.0 {
            return promoted;
        }

        // Prune a stale engaged reference (actor removed mid-session).
        if let Some(id) = self.engaged
            && !actors.contains_key(&id)
        {
            self.engaged = None;
            self.interaction_seconds = 0.0;
        }

        // An actor awaiting a challenge stays pinned as engaged until the
        // challenge resolves; focus changes are deferred, not honored.
        let challenge_pinned = self
            .engaged
            .and_then(|id| actors.get(&id))
            .is_some_and(|r| r.lifecycle == ActorLifecycleState::AwaitingChallenge);

        if !challenge_pinned && focus != self.engaged {
            if let Some(old) = self.engaged
                && let Some(record) = actors.get_mut(&old)
                && record.lifecycle == ActorLifecycleState::Engaged
            {
                record.lifecycle = ActorLifecycleState::Ambient;
                debug!(actor = %old, "disengaged");
            }
            // Timer resets for both the old and the new actor.
            self.interaction_seconds = 0.0;
            self.engaged = None;

            if let Some(new) = focus
                && let Some(record) = actors.get_mut(&new)
                && record.lifecycle == ActorLifecycleState::Ambient
            {
                record.lifecycle = ActorLifecycleState::Engaged;
                self.engaged = Some(new);
                debug!(actor = %new, "engaged");
            }
        }

        let Some(id) = self.engaged else {
            return promoted;
        };
        let Some(record) = actors.get_mut(&id) else {
            return promoted;
        };

        match record.lifecycle {
            ActorLifecycleState::Engaged if record.requires_challenge => {
                // Challenge actors promote only through the minigame; the
                // gate opens once intensity is high enough.
                if record.runtime.intensity >= config.challenge_intensity_threshold {
                    record.lifecycle = ActorLifecycleState::AwaitingChallenge;
                    info!(actor = %id, intensity = record.runtime.intensity, "challenge gate opened");
                    queue.emit(EngineEvent::ChallengeReady {
                        actor: id,
                        intensity: record.runtime.intensity,
                    });
                }
            }
            ActorLifecycleState::Engaged => {
                let rate = if watcher_emotion == record.runtime.current_kind {
                    config.match_rate_multiplier
                } else {
                    1.0
                };
                self.interaction_seconds += dt * rate;
                if self.interaction_seconds >= config.required_interaction_seconds {
                    promote(record, queue);
                    promoted.push(id);
                    self.engaged = None;
                    self.interaction_seconds = 0.0;
                }
            }
            // AwaitingChallenge: accrual suspended until resolution.
            // Other states cannot be engaged; nothing to do.
            _ => {}
        }

        promoted
    }

    /// Report the outcome of a challenge for `id`.
    ///
    /// Success promotes the actor to `Following` (returned as `Some`);
    /// failure returns it to `Engaged` with its timer intact. Reports for
    /// actors not awaiting a challenge are defensively ignored.
    pub fn resolve_challenge(
        &mut self,
        id: ActorId,
        success: bool,
        actors: &mut HashMap<ActorId, ActorRecord>,
        queue: &mut EventQueue,
    ) -> Option<ActorId> {
        let Some(record) = actors.get_mut(&id) else {
            debug!(actor = %id, "challenge result for unknown actor, ignoring");
            return None;
        };
        if record.lifecycle != ActorLifecycleState::AwaitingChallenge {
            debug!(actor = %id, state = ?record.lifecycle, "challenge result without pending challenge, ignoring");
            return None;
        }

        if success {
            promote(record, queue);
            if self.engaged == Some(id) {
                self.engaged = None;
                self.interaction_seconds = 0.0;
            }
            Some(id)
        } else {
            record.lifecycle = ActorLifecycleState::Engaged;
            debug!(actor = %id, "challenge failed, interaction resumes");
            None
        }
    }
}

/// WonOver transits instantly into Following — irreversible, so the
/// intermediate state is never observable.
fn promote(record: &mut ActorRecord, queue: &mut EventQueue) {
    record.lifecycle = ActorLifecycleState::Following;
    record.runtime.active_sequence = None;
    info!(actor = %record.id, "actor won over");
    queue.emit(EngineEvent::ActorWonOver { actor: record.id });
}
