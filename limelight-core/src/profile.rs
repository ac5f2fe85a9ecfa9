//! Emotion profiles — per-kind tuning data for the intensity accumulator.
//!
//! Profiles are a *soft* dependency: when an archetype authors no profile
//! for a kind, the engine synthesizes a neutral default from
//! [`EmotionConfig`](crate::config::EmotionConfig) instead of failing.
//! Resolution happens once at actor registration, producing a
//! [`ResolvedProfile`] per kind — the engine never re-synthesizes mid-tick.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::EmotionConfig;
use crate::types::EmotionKind;

/// Display cue color, linear RGB in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueColor {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl CueColor {
    /// Neutral gray cue used for synthesized profiles.
    pub const NEUTRAL: Self = Self {
        r: 0.5,
        g: 0.5,
        b: 0.5,
    };
}

impl Default for CueColor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Tuning for one emotion kind on one actor archetype.
///
/// Rates and thresholds live in [0, 1] (per second for the rates);
/// sensitivity is any non-negative multiplier. All values are clamped on
/// construction and on deserialization-adjacent paths via [`sanitized`].
///
/// [`sanitized`]: EmotionProfile::sanitized
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmotionProfile {
    /// Intensity gained per second of gaze, before sensitivity and the
    /// global multiplier.
    pub buildup_rate: f32,
    /// Intensity lost per second without gaze.
    pub decay_rate: f32,
    /// Multiplier on buildup while gazed at (>= 0).
    pub gaze_sensitivity: f32,
    /// Intensity at which a reaction fires.
    pub trigger_threshold: f32,
    /// Continuous gaze seconds required before the first trigger is eligible.
    pub min_dwell_seconds: f64,
    /// Presentation-layer cue color for this emotion.
    #[serde(default)]
    pub cue: CueColor,
}

impl EmotionProfile {
    /// Construct a profile with all invariants enforced.
    #[must_use]
    pub fn new(
        buildup_rate: f32,
        decay_rate: f32,
        gaze_sensitivity: f32,
        trigger_threshold: f32,
        min_dwell_seconds: f64,
    ) -> Self {
        Self {
            buildup_rate,
            decay_rate,
            gaze_sensitivity,
            trigger_threshold,
            min_dwell_seconds,
            cue: CueColor::default(),
        }
        .sanitized()
    }

    /// Copy with rates and thresholds clamped into their legal ranges.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.buildup_rate = self.buildup_rate.clamp(0.0, 1.0);
        self.decay_rate = self.decay_rate.clamp(0.0, 1.0);
        self.gaze_sensitivity = self.gaze_sensitivity.max(0.0);
        self.trigger_threshold = self.trigger_threshold.clamp(0.0, 1.0);
        self.min_dwell_seconds = self.min_dwell_seconds.max(0.0);
        self
    }

    /// Synthesize the default profile used when nothing is authored.
    #[must_use]
    pub fn synthesized(emotion_config: &EmotionConfig) -> Self {
        Self {
            buildup_rate: emotion_config.default_buildup_rate,
            decay_rate: emotion_config.default_decay_rate,
            gaze_sensitivity: 1.0,
            trigger_threshold: emotion_config.default_trigger_threshold,
            min_dwell_seconds: emotion_config.default_min_dwell_seconds,
            cue: CueColor::NEUTRAL,
        }
        .sanitized()
    }
}

/// A profile resolved for an actor at registration time.
///
/// The tag records provenance so tooling can tell authored tuning from
/// engine fallback; tick code treats both identically.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedProfile {
    /// Authored in the actor's archetype [`ProfileSet`].
    Authored(EmotionProfile),
    /// Synthesized from [`EmotionConfig`] defaults.
    Synthesized(EmotionProfile),
}

impl ResolvedProfile {
    /// The underlying profile values.
    #[must_use]
    pub fn profile(&self) -> &EmotionProfile {
        match self {
            Self::Authored(p) | Self::Synthesized(p) => p,
        }
    }

    /// Whether this profile was authored rather than synthesized.
    #[must_use]
    pub fn is_authored(&self) -> bool {
        matches!(self, Self::Authored(_))
    }
}

/// Authored profiles for one actor archetype, keyed by emotion kind.
///
/// Sparse by design: kinds without an entry fall back to synthesized
/// defaults at resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSet {
    /// Per-kind authored profiles.
    #[serde(default)]
    pub profiles: HashMap<EmotionKind, EmotionProfile>,
}

impl ProfileSet {
    /// Create an empty profile set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Author a profile for a kind, replacing any existing entry.
    pub fn insert(&mut self, kind: EmotionKind, profile: EmotionProfile) {
        self.profiles.insert(kind, profile.sanitized());
    }

    /// Resolve the full per-kind table for an actor.
    ///
    /// Every one of the eight kinds gets an entry: authored where present,
    /// synthesized otherwise.
    #[must_use]
    pub fn resolve(&self, emotion_config: &EmotionConfig) -> ResolvedProfileTable {
        let mut table = HashMap::with_capacity(EmotionKind::ALL.len());
        for kind in EmotionKind::ALL {
            let resolved = match self.profiles.get(&kind) {
                Some(profile) => ResolvedProfile::Authored(profile.sanitized()),
                None => ResolvedProfile::Synthesized(EmotionProfile::synthesized(emotion_config)),
            };
            table.insert(kind, resolved);
        }
        ResolvedProfileTable { table }
    }
}

/// The complete per-kind profile table attached to a registered actor.
#[derive(Debug, Clone)]
pub struct ResolvedProfileTable {
    table: HashMap<EmotionKind, ResolvedProfile>,
}

impl ResolvedProfileTable {
    /// Profile for a kind. Resolution covers every kind, so this never
    /// misses for the closed [`EmotionKind`] set.
    #[must_use]
    pub fn for_kind(&self, kind: EmotionKind) -> &ResolvedProfile {
        self.table
            .get(&kind)
            .unwrap_or_else(|| unreachable!("resolution covers all emotion kinds"))
    }
}
