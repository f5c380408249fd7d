//! Sawtooth waveforms.
//!
//! Two flavours exist. The additive one sums sine partials and stays
//! band-limited. The direct one wraps a linear ramp every period, which is
//! sharper but aliases at high frequencies.

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI, TAU};

/// Partial count for a light, cheap sawtooth.
pub const SAW_HARMONICS_SIMPLE: u32 = 10;

/// Partial count for a richer sawtooth timbre.
pub const SAW_HARMONICS_RICH: u32 = 100;

/// Largest partial count an instrument recipe may ask for.
pub const SAW_HARMONICS_MAX: u32 = SAW_HARMONICS_RICH * 10;

/// Sums `harmonics` sine partials of phase `theta`, scaled by `2/π`.
///
/// The partial sum overshoots near the ramp edge (Gibbs), so the result is
/// clamped to `[-1, 1]`.
pub(crate) fn additive(theta: f64, harmonics: u32) -> f64 {
    let sum: f64 = (1..=harmonics)
        .map(|n| {
            let n = f64::from(n);
            (n * theta).sin() / n
        })
        .sum();
    (FRAC_2_PI * sum).clamp(-1.0, 1.0)
}

/// Wraps a linear ramp once per period.
///
/// The effective frequency is recovered from `theta` so vibrato carries over.
/// At `time == 0` the nominal `frequency` is used instead. A non-positive or
/// non-finite effective frequency produces silence.
pub(crate) fn direct(frequency: f64, time: f64, theta: f64) -> f64 {
    let effective = if time == 0.0 {
        frequency
    } else {
        theta / (TAU * time)
    };
    if !effective.is_finite() || effective <= 0.0 {
        return 0.0;
    }

    let wrapped = time % (1.0 / effective);
    (FRAC_2_PI * (effective * PI * wrapped - FRAC_PI_2)).clamp(-1.0, 1.0)
}
