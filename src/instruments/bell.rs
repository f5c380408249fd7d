use super::{Instrument, Partial};
use crate::envelopes::EnvelopeConfig;
use crate::oscillators::{Vibrato, Waveform};

const ENVELOPE: EnvelopeConfig = EnvelopeConfig::from_parts(0.01, 1.0, 1.0, 0.0, 1.0);

// Fundamental itself is absent; the strike sits an octave up.
const PARTIALS: [Partial; 3] = [
    Partial::new(2.0, 1.0, Waveform::Sine).with_vibrato(Vibrato::new(5.0, 0.001)),
    Partial::new(3.0, 0.5, Waveform::Sine),
    Partial::new(4.0, 0.25, Waveform::Sine),
];

pub(super) fn recipe() -> Instrument {
    Instrument::from_parts(ENVELOPE, PARTIALS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::Sound;
    use crate::music::{Note, NoteId};

    #[test]
    fn test_bell_envelope() {
        let bell = recipe();
        let env = bell.envelope();
        assert_eq!(env.attack(), 0.01);
        assert_eq!(env.decay(), 1.0);
        assert_eq!(env.start_amplitude(), 1.0);
        assert_eq!(env.sustain_level(), 0.0);
        assert_eq!(env.release(), 1.0);
        assert_eq!(bell.total_gain(), 1.75);
    }

    #[test]
    fn test_bell_is_deterministic() {
        let bell = recipe();
        let note = Note::new(NoteId(12), 261.626, 0.25);
        for i in 0..200 {
            let t = 0.25 + i as f64 * 0.003;
            assert_eq!(bell.sound(&note, t), bell.sound(&note, t));
        }
    }

    #[test]
    fn test_bell_dies_out_while_held() {
        let bell = recipe();
        let note = Note::new(NoteId(0), 130.813, 0.0);
        assert!(note.is_held());
        // Sustain level is 0, so after attack + decay the bell is silent
        assert_eq!(bell.sound(&note, 1.5), 0.0);
        assert_eq!(bell.sound(&note, 30.0), 0.0);
    }
}
