//! Core type definitions for the limelight engine.
//!
//! Identity, time, spatial math, and the closed emotion vocabulary shared by
//! every other module.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for an actor tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Simulation time in seconds since the engine was created.
///
/// The engine is purely tick-driven: time only advances when
/// [`tick`](crate::engine::Engine::tick) is called, so `SimTime` is
/// deterministic under replay and unaffected by wall-clock pauses.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct SimTime(pub f64);

impl SimTime {
    /// Advance by `dt` seconds.
    #[must_use]
    pub fn advanced(self, dt: f64) -> Self {
        Self(self.0 + dt)
    }

    /// Seconds elapsed since `earlier`. Saturates at zero.
    #[must_use]
    pub fn since(self, earlier: Self) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 3D vector / position in world units. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate (height).
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Construct from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise addition.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise subtraction (`self - other`).
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Uniform scale.
    #[must_use]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for near-zero vectors.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < f32::EPSILON {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    /// Copy with the height component zeroed (projection onto the ground plane).
    #[must_use]
    pub fn flattened(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Position plus facing direction for the watcher or an actor.
///
/// `forward` is kept normalized by the engine; constructing one by hand with
/// a non-unit forward is tolerated (consumers normalize defensively).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position.
    pub position: Vec3,
    /// Facing direction (unit-length by convention).
    pub forward: Vec3,
}

impl Pose {
    /// Construct a pose, normalizing `forward` when possible.
    #[must_use]
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalized().unwrap_or(Vec3::new(0.0, 0.0, 1.0)),
        }
    }

    /// Pose at a position facing +Z.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::new(0.0, 0.0, 1.0))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Emotion vocabulary
// ---------------------------------------------------------------------------

/// The closed set of emotion kinds an actor can express.
///
/// Ordering is insertion order only; there is no numeric meaning beyond
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    /// Baseline state; also the idle-reset target.
    #[default]
    Neutral,
    /// Pleased, warm.
    Happy,
    /// Curious, attentive.
    Interested,
    /// Hostile, irritated.
    Angry,
    /// Dejected, withdrawn.
    Sad,
    /// Startled.
    Surprised,
    /// Flustered, self-conscious.
    Embarrassed,
    /// Afraid, avoidant.
    Scared,
}

impl EmotionKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Neutral,
        Self::Happy,
        Self::Interested,
        Self::Angry,
        Self::Sad,
        Self::Surprised,
        Self::Embarrassed,
        Self::Scared,
    ];
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Interested => "interested",
            Self::Angry => "angry",
            Self::Sad => "sad",
            Self::Surprised => "surprised",
            Self::Embarrassed => "embarrassed",
            Self::Scared => "scared",
        };
        write!(f, "{name}")
    }
}
