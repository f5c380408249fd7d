//! Stateless oscillators.
//!
//! Every waveform is a pure function of frequency and absolute time, so the
//! same note can be evaluated at any point of its lifetime without carrying a
//! running phase between render calls.

mod noise;
mod sawtooth;

pub use noise::{seed_noise, white_noise, white_noise_with};
pub use sawtooth::{SAW_HARMONICS_MAX, SAW_HARMONICS_RICH, SAW_HARMONICS_SIMPLE};

use std::f64::consts::{FRAC_2_PI, TAU};

/// Waveform shapes understood by [`oscillate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine.
    Sine,
    /// Hard-edged square, `+1` while the sine is positive and `-1` otherwise.
    Square,
    /// Triangle built from `asin(sin θ)`.
    Triangle,
    /// Band-limited sawtooth summed from `harmonics` sine partials.
    Sawtooth { harmonics: u32 },
    /// Phase-wrapped ramp. Sharper than [`Waveform::Sawtooth`] but aliases.
    SawtoothDirect,
    /// Uniform white noise, ignoring frequency and time.
    Noise,
}

/// Slow frequency modulation applied to an oscillator's phase.
///
/// `depth` scales the modulation term and `rate` is the LFO frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    pub depth: f64,
    pub rate: f64,
}

impl Vibrato {
    /// Creates a vibrato with the given depth and LFO rate.
    pub const fn new(depth: f64, rate: f64) -> Self {
        Self { depth, rate }
    }
}

/// Returns the instantaneous phase `θ` in radians.
///
/// Without vibrato this is `2π·f·t`. With vibrato the term
/// `depth·f·t·sin(2π·rate·t)` is added.
pub fn phase(frequency: f64, time: f64, vibrato: Option<Vibrato>) -> f64 {
    let base = TAU * frequency * time;
    match vibrato {
        None => base,
        Some(Vibrato { depth, rate }) => base + depth * frequency * time * (TAU * rate * time).sin(),
    }
}

/// Samples a waveform at an absolute time.
///
/// The result always lies in `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use polysynth::oscillators::{oscillate, Waveform};
/// use std::f64::consts::TAU;
///
/// let value = oscillate(440.0, 0.25, Waveform::Sine, None);
/// assert_eq!(value, (TAU * 440.0 * 0.25).sin());
///
/// // Square maps a non-positive sine to -1
/// assert_eq!(oscillate(440.0, 0.0, Waveform::Square, None), -1.0);
/// ```
pub fn oscillate(frequency: f64, time: f64, waveform: Waveform, vibrato: Option<Vibrato>) -> f64 {
    let theta = phase(frequency, time, vibrato);
    match waveform {
        Waveform::Sine => theta.sin(),
        Waveform::Square => {
            if theta.sin() > 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => (FRAC_2_PI * theta.sin().asin()).clamp(-1.0, 1.0),
        Waveform::Sawtooth { harmonics } => sawtooth::additive(theta, harmonics),
        Waveform::SawtoothDirect => sawtooth::direct(frequency, time, theta),
        Waveform::Noise => white_noise(),
    }
}
