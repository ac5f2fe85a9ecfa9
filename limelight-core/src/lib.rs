//! # Limelight Core Library
//!
//! Game-agnostic emotion simulation for gaze-driven characters.
//!
//! Every registered actor carries an emotion runtime that reacts to a single
//! watcher's attention: intensity builds while the watcher's gaze rests on
//! the actor and decays when it wanders, thresholds fire one-shot trigger
//! events, and scripted sequences walk actors through authored emotional
//! arcs. Sustained interaction promotes actors through a lifecycle —
//! ambient, engaged, optionally challenge-gated, and finally won over — at
//! which point they join a trailing follower formation behind the watcher.
//!
//! The crate is a pure simulation core: hosts feed in poses and time deltas
//! each frame via [`Engine::tick`] and drain typed [`EngineEvent`]s back out.
//! No rendering, input, or audio concerns live here.
//!
//! ## Performance Contract
//!
//! All operations in this crate are designed for real-time game use:
//! - Full engine tick (50 actors): < 50μs
//! - Gaze pass (200 actors): < 20μs
//! - Follower formation tick (40 followers): < 10μs

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod actor;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod gaze;
pub mod lifecycle;
pub mod profile;
pub mod roster;
pub mod sequence;
pub mod types;

pub use actor::{ActorLifecycleState, ActorSpec};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use events::{EmotionEvent, EngineEvent};
pub use profile::{CueColor, EmotionProfile, ProfileSet};
pub use sequence::{Sequence, TransitionRule};
pub use types::*;
