//! Key identifiers and the tuning that turns them into pitch.

use std::fmt;

use crate::error::{Result, SynthError};

/// Frequency of C3 in Hz, the default bottom key of the keyboard.
pub const C3_HZ: f64 = 130.813;

/// Identifier of a key on the keyboard.
///
/// Identifiers are semitone offsets above the tuning's base frequency, so
/// `NoteId(12)` sounds one octave above `NoteId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u32);

impl From<u32> for NoteId {
    fn from(id: u32) -> Self {
        NoteId(id)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Equal-tempered tuning anchored at a base frequency.
///
/// # Examples
///
/// ```
/// use polysynth::{NoteId, Tuning};
///
/// let tuning = Tuning::default(); // C3 at key 0
/// assert!((tuning.frequency(NoteId(0)) - 130.813).abs() < 1e-9);
/// assert!((tuning.frequency(NoteId(12)) - 261.626).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    base_frequency: f64,
}

impl Tuning {
    /// Creates a tuning with key 0 at `base_frequency` Hz.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::InvalidBaseFrequency`] unless the frequency is a
    /// positive finite number.
    pub fn new(base_frequency: f64) -> Result<Self> {
        if base_frequency.is_finite() && base_frequency > 0.0 {
            Ok(Self { base_frequency })
        } else {
            Err(SynthError::InvalidBaseFrequency(base_frequency))
        }
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Returns the frequency in Hz of the given key: `base · 2^(id / 12)`.
    pub fn frequency(&self, id: NoteId) -> f64 {
        self.base_frequency * 2.0_f64.powf(f64::from(id.0) / 12.0)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_frequency: C3_HZ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_c3() {
        assert_eq!(Tuning::default().base_frequency(), C3_HZ);
    }

    #[test]
    fn test_octaves_double() {
        let tuning = Tuning::new(110.0).unwrap();
        assert!((tuning.frequency(NoteId(0)) - 110.0).abs() < 1e-9);
        assert!((tuning.frequency(NoteId(12)) - 220.0).abs() < 1e-9);
        assert!((tuning.frequency(NoteId(24)) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_semitone_ratio() {
        let tuning = Tuning::default();
        let ratio = tuning.frequency(NoteId(1)) / tuning.frequency(NoteId(0));
        assert!((ratio - 2.0_f64.powf(1.0 / 12.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(Tuning::new(0.0).is_err());
        assert!(Tuning::new(-440.0).is_err());
        assert!(Tuning::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_note_id_from_u32() {
        let id: NoteId = 7u32.into();
        assert_eq!(id, NoteId(7));
        assert_eq!(id.to_string(), "#7");
    }
}
