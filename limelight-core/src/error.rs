//! Error types for the limelight engine.
//!
//! Runtime faults (missing profiles, stale actor references, out-of-range
//! sequence cursors) are deliberately *not* errors — they degrade locally to
//! safe defaults or no-ops. `EngineError` only covers configuration loading,
//! where failing loudly at startup is the right behavior.

use thiserror::Error;

/// Top-level error type for engine setup operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error (reading a config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
