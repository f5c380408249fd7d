//! Engine configuration.

use crate::engine::MixPolicy;
use crate::error::{Result, SynthError};
use crate::music::{DEFAULT_NOTE_CAPACITY, Tuning};

/// Sample rate used when none is given.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Settings fixed for the lifetime of a [`Synth`](crate::Synth).
///
/// # Examples
///
/// ```
/// use polysynth::{MixPolicy, SynthConfig, Tuning};
///
/// let config = SynthConfig::default()
///     .with_sample_rate(48_000)
///     .with_mix(MixPolicy::Normalize)
///     .with_tuning(Tuning::new(110.0).unwrap());
///
/// assert_eq!(config.sample_rate, 48_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub mix: MixPolicy,
    pub tuning: Tuning,
    /// Notes preallocated in the registry so pressing keys rarely allocates.
    pub note_capacity: usize,
}

impl SynthConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_mix(mut self, mix: MixPolicy) -> Self {
        self.mix = mix;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_note_capacity(mut self, note_capacity: usize) -> Self {
        self.note_capacity = note_capacity;
        self
    }

    /// Checks the values that cannot be caught by the type system.
    ///
    /// # Errors
    ///
    /// - [`SynthError::InvalidSampleRate`] if the sample rate is zero
    /// - [`SynthError::InvalidHeadroom`] if a headroom gain is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate);
        }
        if let MixPolicy::Headroom(gain) = self.mix
            && !(gain.is_finite() && gain >= 0.0)
        {
            return Err(SynthError::InvalidHeadroom(gain));
        }
        Ok(())
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            mix: MixPolicy::default(),
            tuning: Tuning::default(),
            note_capacity: DEFAULT_NOTE_CAPACITY,
        }
    }
}
