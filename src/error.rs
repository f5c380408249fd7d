//! Error type for synthesizer construction.
//!
//! Errors only surface while building envelopes, instruments and the engine.
//! The render path never fails: numeric faults degrade to silence instead.

use thiserror::Error;

/// Errors raised when a configuration is rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// An envelope duration was zero, negative or not finite.
    #[error("{name} time must be a positive number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    /// A level was outside `[0, 1]` or not finite.
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidLevel { name: &'static str, value: f64 },

    /// An instrument was built without any partials.
    #[error("instrument recipe has no partials")]
    EmptyRecipe,

    /// A partial carried a non-finite or negative multiplier, or a non-finite gain.
    #[error("partial {index} is invalid: {reason}")]
    InvalidPartial { index: usize, reason: &'static str },

    /// The absolute gains of all partials sum to zero.
    #[error("instrument recipe is silent: partial gains sum to zero")]
    SilentRecipe,

    /// The sample rate was zero.
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,

    /// The headroom gain was negative or not finite.
    #[error("headroom gain must be a finite non-negative number, got {0}")]
    InvalidHeadroom(f64),

    /// The tuning base frequency was not a positive finite number.
    #[error("base frequency must be a positive number of Hz, got {0}")]
    InvalidBaseFrequency(f64),

    /// A preset name did not match any built-in instrument.
    #[error("unknown instrument preset: '{0}'")]
    UnknownPreset(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SynthError>;
