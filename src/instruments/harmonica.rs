use super::{Instrument, Partial};
use crate::envelopes::EnvelopeConfig;
use crate::oscillators::{Vibrato, Waveform};

const ENVELOPE: EnvelopeConfig = EnvelopeConfig::from_parts(0.05, 1.0, 1.0, 0.9, 0.1);

const PARTIALS: [Partial; 4] = [
    Partial::new(1.0, 1.0, Waveform::Square).with_vibrato(Vibrato::new(5.0, 0.001)),
    Partial::new(1.5, 0.5, Waveform::Square),
    Partial::new(2.0, 0.25, Waveform::Square),
    // breath
    Partial::new(0.0, 0.05, Waveform::Noise),
];

pub(super) fn recipe() -> Instrument {
    Instrument::from_parts(ENVELOPE, PARTIALS.to_vec())
}
