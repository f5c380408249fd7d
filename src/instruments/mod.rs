//! Instruments: an envelope plus a weighted recipe of harmonic partials.
//!
//! Every instrument shares the same mixing algorithm. A new timbre is a new
//! recipe, not new code: pick an [`EnvelopeConfig`] and list the partials.

mod bell;
mod harmonica;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::envelopes::EnvelopeConfig;
use crate::error::{Result, SynthError};
use crate::music::Note;
use crate::oscillators::{SAW_HARMONICS_MAX, Vibrato, Waveform, oscillate};

/// Anything that can voice a note at a point in time.
///
/// Implementors are shared read-only between the control loop and the audio
/// thread, hence the `Send + Sync` bound.
pub trait Sound: Send + Sync {
    /// Returns the note's contribution at `time`, in `[-1, 1]`.
    fn sound(&self, note: &Note, time: f64) -> f64;

    /// Envelope used to decide when a released note has fallen silent.
    fn envelope(&self) -> &EnvelopeConfig;
}

/// One oscillator in an instrument recipe.
///
/// The oscillator runs at `multiplier` times the note's fundamental and is
/// weighted by `gain` in the mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub multiplier: f64,
    pub gain: f64,
    pub waveform: Waveform,
    pub vibrato: Option<Vibrato>,
}

impl Partial {
    pub const fn new(multiplier: f64, gain: f64, waveform: Waveform) -> Self {
        Self {
            multiplier,
            gain,
            waveform,
            vibrato: None,
        }
    }

    pub const fn with_vibrato(mut self, vibrato: Vibrato) -> Self {
        self.vibrato = Some(vibrato);
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason| Err(SynthError::InvalidPartial { index, reason });
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return invalid("multiplier must be finite and non-negative");
        }
        if !self.gain.is_finite() {
            return invalid("gain must be finite");
        }
        if let Some(vibrato) = self.vibrato
            && !(vibrato.depth.is_finite() && vibrato.rate.is_finite())
        {
            return invalid("vibrato depth and rate must be finite");
        }
        if let Waveform::Sawtooth { harmonics } = self.waveform
            && harmonics > SAW_HARMONICS_MAX
        {
            return invalid("too many sawtooth harmonics");
        }
        Ok(())
    }
}

/// An immutable instrument recipe.
///
/// The output for a note is
/// `envelope(t) × Σ gainᵢ · oscillator(multiplierᵢ · f, t) / Σ |gainᵢ|`,
/// so the oscillator mix stays within `[-1, 1]` before the envelope applies.
///
/// # Examples
///
/// ```
/// use polysynth::{EnvelopeConfig, Instrument, Note, NoteId, Partial, Sound, Waveform};
///
/// let envelope = EnvelopeConfig::new(0.01, 0.2, 0.6, 0.3).unwrap();
/// let organ = Instrument::builder(envelope)
///     .partial(Partial::new(1.0, 1.0, Waveform::Sine))
///     .partial(Partial::new(2.0, 0.5, Waveform::Sine))
///     .partial(Partial::new(4.0, 0.25, Waveform::Triangle))
///     .build()
///     .unwrap();
///
/// let note = Note::new(NoteId(9), 220.0, 0.0);
/// let sample = organ.sound(&note, 0.5);
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    envelope: EnvelopeConfig,
    partials: Vec<Partial>,
    total_gain: f64,
}

impl Instrument {
    /// Creates an instrument from an envelope and a list of partials.
    ///
    /// # Errors
    ///
    /// - [`SynthError::EmptyRecipe`] if `partials` is empty
    /// - [`SynthError::InvalidPartial`] for a non-finite or negative value, or
    ///   more than [`SAW_HARMONICS_MAX`] sawtooth harmonics
    /// - [`SynthError::SilentRecipe`] if the absolute gains sum to zero
    pub fn new(envelope: EnvelopeConfig, partials: Vec<Partial>) -> Result<Self> {
        if partials.is_empty() {
            return Err(SynthError::EmptyRecipe);
        }
        for (index, partial) in partials.iter().enumerate() {
            partial.validate(index)?;
        }
        let instrument = Self::from_parts(envelope, partials);
        if instrument.total_gain <= 0.0 {
            return Err(SynthError::SilentRecipe);
        }
        debug!(partials = instrument.partials.len(), "instrument built");
        Ok(instrument)
    }

    /// Starts a recipe with the given envelope.
    pub fn builder(envelope: EnvelopeConfig) -> InstrumentBuilder {
        InstrumentBuilder {
            envelope,
            partials: Vec::new(),
        }
    }

    /// Bell: a few sine partials above the fundamental, fast attack, long
    /// decay and release, silent sustain.
    pub fn bell() -> Self {
        bell::recipe()
    }

    /// Harmonica: square partials at the fundamental, near-fifth and octave
    /// with a touch of breath noise; high sustain and a short release.
    pub fn harmonica() -> Self {
        harmonica::recipe()
    }

    /// Assembles a recipe whose values are already known to be valid.
    fn from_parts(envelope: EnvelopeConfig, partials: Vec<Partial>) -> Self {
        let total_gain = partials.iter().map(|p| p.gain.abs()).sum();
        Self {
            envelope,
            partials,
            total_gain,
        }
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    /// Sum of the absolute partial gains, used to normalize the mix.
    pub fn total_gain(&self) -> f64 {
        self.total_gain
    }
}

impl Sound for Instrument {
    fn sound(&self, note: &Note, time: f64) -> f64 {
        let level = self
            .envelope
            .amplitude(time, note.time_on(), note.time_off());
        if level == 0.0 {
            return 0.0;
        }

        let fundamental = note.frequency();
        let sum: f64 = self
            .partials
            .iter()
            .map(|p| p.gain * oscillate(p.multiplier * fundamental, time, p.waveform, p.vibrato))
            .sum();
        level * sum / self.total_gain
    }

    fn envelope(&self) -> &EnvelopeConfig {
        &self.envelope
    }
}

/// Builder for custom instrument recipes.
#[derive(Debug, Clone)]
pub struct InstrumentBuilder {
    envelope: EnvelopeConfig,
    partials: Vec<Partial>,
}

impl InstrumentBuilder {
    /// Appends a partial to the recipe.
    pub fn partial(mut self, partial: Partial) -> Self {
        self.partials.push(partial);
        self
    }

    /// Validates the recipe. See [`Instrument::new`].
    pub fn build(self) -> Result<Instrument> {
        Instrument::new(self.envelope, self.partials)
    }
}

/// Built-in instruments, selectable by name at startup.
///
/// # Examples
///
/// ```
/// use polysynth::Preset;
///
/// let preset: Preset = "harmonica".parse().unwrap();
/// assert_eq!(preset, Preset::Harmonica);
/// assert_eq!(preset.to_string(), "harmonica");
/// assert!("kazoo".parse::<Preset>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Bell,
    Harmonica,
}

impl Preset {
    /// Every built-in preset.
    pub const ALL: [Preset; 2] = [Preset::Bell, Preset::Harmonica];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Bell => "bell",
            Preset::Harmonica => "harmonica",
        }
    }

    /// Builds the instrument for this preset.
    pub fn build(&self) -> Instrument {
        debug!(preset = self.name(), "building preset instrument");
        match self {
            Preset::Bell => Instrument::bell(),
            Preset::Harmonica => Instrument::harmonica(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| SynthError::UnknownPreset(s.to_string()))
    }
}
