//! Configuration errors
//!
//! The per-frame simulation never fails; only building a scene from
//! configuration can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration that must be finite and non-negative was not
    #[error("{name} must be a finite, non-negative duration (got {value})")]
    InvalidDuration { name: &'static str, value: f32 },

    /// A scalar that must be finite was NaN or infinite
    #[error("{name} must be finite (got {value})")]
    NotFinite { name: &'static str, value: f32 },

    /// A `[min, max]` range with `min > max`
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    /// A particle or shell pool configured with zero capacity
    #[error("{name} pool must hold at least one element")]
    EmptyPool { name: &'static str },

    /// Malformed JSON configuration
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),
}
