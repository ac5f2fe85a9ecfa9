//! Configuration for the limelight engine.
//!
//! Maps directly to `limelight.toml`. Every field has a serde default so a
//! partial file (or an empty one) yields a fully tuned engine.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gaze / hover sampling settings.
    #[serde(default)]
    pub gaze: GazeConfig,
    /// Emotion accumulator tuning.
    #[serde(default)]
    pub emotion: EmotionConfig,
    /// Lifecycle promotion tuning.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Follower formation tuning.
    #[serde(default)]
    pub roster: RosterConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `EngineError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::EngineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Gaze / hover layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeConfig {
    /// Maximum distance at which an actor can be gazed at or engaged.
    #[serde(default = "default_6_0")]
    pub max_distance: f32,
    /// Half-angle of the gaze cone around the watcher's forward direction,
    /// in degrees.
    #[serde(default = "default_60_0")]
    pub cone_half_angle_deg: f32,
    /// Seconds between hover recomputations. Between samples the last hover
    /// set is held, so raycast batching never distorts accumulation rates.
    #[serde(default = "default_0_1")]
    pub sample_interval_seconds: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            max_distance: 6.0,
            cone_half_angle_deg: 60.0,
            sample_interval_seconds: 0.1,
        }
    }
}

/// Emotion accumulator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Seconds an actor must be un-gazed, un-triggered, and sequence-free
    /// before its kind resets to Neutral.
    #[serde(default = "default_4_0")]
    pub forget_seconds: f64,
    /// Fraction of the trigger threshold intensity must fall below before
    /// the trigger latch re-arms.
    #[serde(default = "default_0_5")]
    pub hysteresis_ratio: f32,
    /// Intensity (above the trigger threshold) at which a registered
    /// auto-start sequence may begin.
    #[serde(default = "default_0_9")]
    pub sequence_auto_threshold: f32,
    /// Buildup rate used when no authored profile exists for a kind.
    #[serde(default = "default_0_25")]
    pub default_buildup_rate: f32,
    /// Decay rate used when no authored profile exists for a kind.
    #[serde(default = "default_0_15")]
    pub default_decay_rate: f32,
    /// Trigger threshold used when no authored profile exists for a kind.
    #[serde(default = "default_0_6")]
    pub default_trigger_threshold: f32,
    /// Minimum gaze dwell used when no authored profile exists for a kind.
    #[serde(default = "default_1_0_f64")]
    pub default_min_dwell_seconds: f64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            forget_seconds: 4.0,
            hysteresis_ratio: 0.5,
            sequence_auto_threshold: 0.9,
            default_buildup_rate: 0.25,
            default_decay_rate: 0.15,
            default_trigger_threshold: 0.6,
            default_min_dwell_seconds: 1.0,
        }
    }
}

/// Lifecycle promotion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Continuous interaction seconds required to win over a regular actor.
    #[serde(default = "default_8_0")]
    pub required_interaction_seconds: f64,
    /// Accrual-rate multiplier (> 1) applied while the watcher's expressed
    /// emotion matches the actor's current emotion. Elapsed time counts this
    /// much faster, so matched interaction wins the actor over sooner.
    #[serde(default = "default_2_0_f64")]
    pub match_rate_multiplier: f64,
    /// Intensity a challenge-tagged actor must reach before a challenge may
    /// start.
    #[serde(default = "default_0_7")]
    pub challenge_intensity_threshold: f32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            required_interaction_seconds: 8.0,
            match_rate_multiplier: 2.0,
            challenge_intensity_threshold: 0.7,
        }
    }
}

/// Follower formation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Trailing distance between consecutive formation ranks, in world units.
    #[serde(default = "default_1_5")]
    pub spacing: f32,
    /// Maximum follower movement speed, world units per second.
    #[serde(default = "default_3_5")]
    pub follow_speed: f32,
    /// Maximum follower turn rate, degrees per second.
    #[serde(default = "default_180_0")]
    pub turn_rate_deg_per_sec: f32,
    /// Height drift below the pinned height that triggers a snap back.
    #[serde(default = "default_0_05")]
    pub height_tolerance: f32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            spacing: 1.5,
            follow_speed: 3.5,
            turn_rate_deg_per_sec: 180.0,
            height_tolerance: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_0_05() -> f32 { 0.05 }
fn default_0_1() -> f64 { 0.1 }
fn default_0_15() -> f32 { 0.15 }
fn default_0_25() -> f32 { 0.25 }
fn default_0_5() -> f32 { 0.5 }
fn default_0_6() -> f32 { 0.6 }
fn default_0_7() -> f32 { 0.7 }
fn default_0_9() -> f32 { 0.9 }
fn default_1_0_f64() -> f64 { 1.0 }
fn default_1_5() -> f32 { 1.5 }
fn default_2_0_f64() -> f64 { 2.0 }
fn default_3_5() -> f32 { 3.5 }
fn default_4_0() -> f64 { 4.0 }
fn default_6_0() -> f32 { 6.0 }
fn default_8_0() -> f64 { 8.0 }
fn default_60_0() -> f32 { 60.0 }
fn default_180_0() -> f32 { 180.0 }
