//! Summing live notes into one sample.

use crate::instruments::Sound;
use crate::music::Note;

/// How the raw sum of all live notes is scaled before output.
///
/// The policy is fixed when the synth is built. With no live notes the
/// output is silence under either policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixPolicy {
    /// Multiply the sum by a constant gain.
    Headroom(f64),
    /// Divide the sum by the number of live notes.
    Normalize,
}

impl MixPolicy {
    /// Gain used by [`MixPolicy::default`].
    pub const DEFAULT_HEADROOM: f64 = 0.2;

    /// Scales a raw sum of `count` notes.
    ///
    /// # Examples
    ///
    /// ```
    /// use polysynth::MixPolicy;
    ///
    /// assert_eq!(MixPolicy::Headroom(0.5).apply(1.0, 2), 0.5);
    /// assert_eq!(MixPolicy::Normalize.apply(1.5, 3), 0.5);
    /// assert_eq!(MixPolicy::Normalize.apply(0.0, 0), 0.0);
    /// ```
    pub fn apply(&self, sum: f64, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        match self {
            MixPolicy::Headroom(gain) => sum * gain,
            MixPolicy::Normalize => sum / count as f64,
        }
    }
}

impl Default for MixPolicy {
    fn default() -> Self {
        MixPolicy::Headroom(Self::DEFAULT_HEADROOM)
    }
}

/// Adds up every note's contribution at `time`, unscaled.
///
/// `k` identical notes give exactly `k` times the single-note value.
pub fn mix<S: Sound + ?Sized>(sound: &S, notes: &[Note], time: f64) -> f64 {
    notes.iter().map(|note| sound.sound(note, time)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::Instrument;
    use crate::music::NoteId;

    #[test]
    fn test_empty_mix_is_silent() {
        let bell = Instrument::bell();
        assert_eq!(mix(&bell, &[], 0.3), 0.0);
        assert_eq!(MixPolicy::Normalize.apply(mix(&bell, &[], 0.3), 0), 0.0);
        assert_eq!(MixPolicy::default().apply(0.0, 0), 0.0);
    }

    #[test]
    fn test_identical_notes_scale_linearly() {
        let bell = Instrument::bell();
        let note = Note::new(NoteId(4), 164.814, 0.0);
        let t = 0.123;
        let single = mix(&bell, &[note], t);
        assert!(single != 0.0);
        for k in 1..=4 {
            let notes = vec![note; k];
            assert!((mix(&bell, &notes, t) - k as f64 * single).abs() < 1e-12);
        }
    }

    #[test]
    fn test_policies() {
        assert_eq!(MixPolicy::Headroom(0.25).apply(2.0, 7), 0.5);
        assert_eq!(MixPolicy::Normalize.apply(2.0, 4), 0.5);
        assert_eq!(MixPolicy::default(), MixPolicy::Headroom(0.2));
    }
}
