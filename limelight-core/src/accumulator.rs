//! Emotion intensity accumulation — the gaze-driven scalar core.
//!
//! Per tick, each actor's intensity rises while gazed at and decays
//! otherwise, clamped to [0, 1] after every update. A threshold crossing
//! fires exactly one [`EmotionEvent`] per continuous gaze session; the latch
//! re-arms only once intensity falls below `threshold * hysteresis_ratio`,
//! which keeps a value hovering near the threshold from chattering.
//!
//! All rates are multiplied by the actual elapsed `dt`, so the accumulator
//! never assumes it is called at a fixed frame rate.

use tracing::debug;

use crate::actor::ActorRecord;
use crate::config::EmotionConfig;
use crate::events::{EmotionEvent, EngineEvent, EventQueue};
use crate::types::{EmotionKind, SimTime};

/// Advance one actor's intensity by `dt` seconds.
///
/// `global_multiplier` is the fever-mode scalar applied uniformly to
/// buildup. Returns `true` when the trigger fired this tick, so the engine
/// can consult the sequence auto-start table.
pub fn tick(
    record: &mut ActorRecord,
    is_gazed: bool,
    dt: f64,
    global_multiplier: f32,
    emotion_config: &EmotionConfig,
    now: SimTime,
    queue: &mut EventQueue,
) -> bool {
    if dt <= 0.0 {
        return false;
    }

    let profile = *record.profiles.for_kind(record.runtime.current_kind).profile();
    let runtime = &mut record.runtime;
    let dt_f32 = dt as f32;

    if is_gazed {
        runtime.gaze_dwell_seconds += dt;
        runtime.idle_seconds = 0.0;
        runtime.intensity +=
            profile.buildup_rate * profile.gaze_sensitivity * global_multiplier * dt_f32;
    } else {
        runtime.intensity -= profile.decay_rate * dt_f32;
        // Dwell is a discrete counter, not an accumulator: it does not decay,
        // it vanishes the moment gaze is lost.
        runtime.gaze_dwell_seconds = 0.0;
    }
    runtime.intensity = runtime.intensity.clamp(0.0, 1.0);

    let mut fired = false;
    if !runtime.is_triggered
        && runtime.intensity >= profile.trigger_threshold
        && runtime.gaze_dwell_seconds >= profile.min_dwell_seconds
    {
        runtime.is_triggered = true;
        fired = true;
        debug!(
            actor = %record.id,
            kind = %runtime.current_kind,
            intensity = runtime.intensity,
            "emotion trigger fired"
        );
        queue.emit(EngineEvent::EmotionTriggered(EmotionEvent {
            actor: record.id,
            kind: runtime.current_kind,
            intensity: runtime.intensity,
            timestamp: now,
        }));
    }

    // Hysteresis: the latch holds until intensity drops well below the
    // threshold, then a future gaze session may trigger again.
    if runtime.is_triggered
        && runtime.intensity < profile.trigger_threshold * emotion_config.hysteresis_ratio
    {
        runtime.is_triggered = false;
    }

    // Idle forget: an un-gazed, un-triggered, sequence-free actor drifts
    // back to Neutral after the configured timeout.
    if !is_gazed && !runtime.is_triggered && runtime.active_sequence.is_none() {
        runtime.idle_seconds += dt;
        if runtime.idle_seconds >= emotion_config.forget_seconds
            && runtime.current_kind != EmotionKind::Neutral
        {
            let old = runtime.current_kind;
            runtime.current_kind = EmotionKind::Neutral;
            runtime.reset_accumulation();
            queue.emit(EngineEvent::EmotionKindChanged {
                actor: record.id,
                old,
                new: EmotionKind::Neutral,
            });
        }
    }

    fired
}
