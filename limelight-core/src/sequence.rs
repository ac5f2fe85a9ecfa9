//! Scripted emotion sequences — gated multi-step transitions.
//!
//! A [`Sequence`] is a named, ordered list of [`TransitionRule`]s layered on
//! top of the intensity accumulator. The cursor's rule becomes eligible only
//! when the actor's current kind matches the rule's `from` kind *and* both
//! the intensity and minimum-duration gates are simultaneously satisfied.
//!
//! An actor's kind can change out from under an active sequence (idle reset
//! or the out-of-band setter). The sequence is not aborted by that: it simply
//! waits until `current_kind` matches `rules[cursor].from` again.
//! [`stop`] is the explicit abort path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::actor::{ActiveSequence, ActorRecord};
use crate::config::EmotionConfig;
use crate::events::{EngineEvent, EventQueue};
use crate::types::EmotionKind;

/// One gated transition inside a sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Kind the actor must currently be in.
    pub from: EmotionKind,
    /// Kind the actor moves to when the gates open.
    pub to: EmotionKind,
    /// Intensity gate in [0, 1].
    pub required_intensity: f32,
    /// Minimum seconds in the current state before the rule may fire.
    pub min_duration_seconds: f64,
}

impl TransitionRule {
    /// Construct a rule with gates clamped into their legal ranges.
    #[must_use]
    pub fn new(
        from: EmotionKind,
        to: EmotionKind,
        required_intensity: f32,
        min_duration_seconds: f64,
    ) -> Self {
        Self {
            from,
            to,
            required_intensity: required_intensity.clamp(0.0, 1.0),
            min_duration_seconds: min_duration_seconds.max(0.0),
        }
    }
}

/// A named, ordered, optionally looping list of transition rules.
///
/// A sequence with zero rules is inert: it can be registered, but starting
/// it is a no-op and it never advances or errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Library key and event label.
    pub name: String,
    /// Ordered rules; the cursor walks this list.
    pub rules: Vec<TransitionRule>,
    /// Whether the cursor wraps to 0 after the last rule fires.
    pub looped: bool,
}

impl Sequence {
    /// Construct a sequence.
    #[must_use]
    pub fn new(name: impl Into<String>, rules: Vec<TransitionRule>, looped: bool) -> Self {
        Self {
            name: name.into(),
            rules,
            looped,
        }
    }
}

/// Registry of sequences plus the per-kind auto-start table.
#[derive(Debug, Clone, Default)]
pub struct SequenceLibrary {
    sequences: HashMap<String, Sequence>,
    auto_start: HashMap<EmotionKind, String>,
}

impl SequenceLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence under its own name, replacing any previous entry.
    pub fn register(&mut self, sequence: Sequence) {
        self.sequences.insert(sequence.name.clone(), sequence);
    }

    /// Map an emotion kind to the sequence auto-started when a trigger fires
    /// at sequence-eligible intensity in that kind.
    pub fn set_auto_start(&mut self, kind: EmotionKind, sequence_name: impl Into<String>) {
        self.auto_start.insert(kind, sequence_name.into());
    }

    /// Look up a sequence by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name)
    }

    /// Auto-start sequence name for a kind, if one is registered.
    #[must_use]
    pub fn auto_start_for(&self, kind: EmotionKind) -> Option<&str> {
        self.auto_start.get(&kind).map(String::as_str)
    }
}

/// Start a sequence on an actor.
///
/// Any already-active sequence is stopped first. Unknown names and zero-rule
/// sequences are rejected as logged no-ops. On success the actor's kind is
/// forced to `rules[0].from`; intensity is deliberately *not* reset, since
/// rule 0's intensity gate still has to be met.
///
/// Returns `true` if the sequence became active.
pub fn start(
    record: &mut ActorRecord,
    library: &SequenceLibrary,
    name: &str,
    queue: &mut EventQueue,
) -> bool {
    let Some(sequence) = library.get(name) else {
        debug!(actor = %record.id, sequence = name, "unknown sequence, ignoring start");
        return false;
    };
    let Some(first_rule) = sequence.rules.first() else {
        debug!(actor = %record.id, sequence = name, "empty sequence, ignoring start");
        return false;
    };

    stop(record);

    let old = record.runtime.current_kind;
    if old != first_rule.from {
        record.runtime.current_kind = first_rule.from;
        queue.emit(EngineEvent::EmotionKindChanged {
            actor: record.id,
            old,
            new: first_rule.from,
        });
    }
    record.runtime.active_sequence = Some(ActiveSequence {
        name: name.to_string(),
        cursor: 0,
        time_in_state: 0.0,
    });
    debug!(actor = %record.id, sequence = name, "sequence started");
    true
}

/// Stop the actor's active sequence, if any.
///
/// Idempotent and always safe: the actor's kind freezes at whatever it
/// currently is.
pub fn stop(record: &mut ActorRecord) {
    if record.runtime.active_sequence.take().is_some() {
        debug!(actor = %record.id, "sequence stopped");
    }
}

/// Advance the actor's active sequence by `dt` seconds.
pub fn tick(
    record: &mut ActorRecord,
    library: &SequenceLibrary,
    dt: f64,
    queue: &mut EventQueue,
) {
    if dt <= 0.0 {
        return;
    }
    let Some(active) = record.runtime.active_sequence.as_mut() else {
        return;
    };

    let Some(sequence) = library.get(&active.name) else {
        // The library no longer knows this sequence; treat as stopped.
        debug!(actor = %record.id, sequence = %active.name, "sequence vanished, stopping");
        record.runtime.active_sequence = None;
        return;
    };

    active.time_in_state += dt;

    let Some(rule) = sequence.rules.get(active.cursor) else {
        // Cursor out of range is an invalid-state request; recover by
        // deactivating rather than failing.
        record.runtime.active_sequence = None;
        return;
    };

    let eligible = record.runtime.current_kind == rule.from
        && record.runtime.intensity >= rule.required_intensity
        && active.time_in_state >= rule.min_duration_seconds;
    if !eligible {
        return;
    }

    let old = record.runtime.current_kind;
    let new = rule.to;
    active.time_in_state = 0.0;
    active.cursor += 1;

    let finished = active.cursor >= sequence.rules.len();
    if finished {
        if sequence.looped {
            active.cursor = 0;
        } else {
            let name = active.name.clone();
            record.runtime.active_sequence = None;
            queue.emit(EngineEvent::SequenceFinished {
                actor: record.id,
                sequence: name,
                final_kind: new,
            });
        }
    }

    // Sequence progression changes kind without resetting accumulation.
    record.runtime.current_kind = new;
    if old != new {
        queue.emit(EngineEvent::EmotionKindChanged {
            actor: record.id,
            old,
            new,
        });
    }
}

/// Auto-start policy: after a trigger fires, start the kind's mapped
/// sequence if intensity is sequence-eligible and nothing is running.
pub fn maybe_auto_start(
    record: &mut ActorRecord,
    library: &SequenceLibrary,
    emotion_config: &EmotionConfig,
    queue: &mut EventQueue,
) {
    if record.runtime.active_sequence.is_some() {
        return;
    }
    if record.runtime.intensity < emotion_config.sequence_auto_threshold {
        return;
    }
    let Some(name) = library.auto_start_for(record.runtime.current_kind) else {
        return;
    };
    let name = name.to_string();
    start(record, library, &name, queue);
}
