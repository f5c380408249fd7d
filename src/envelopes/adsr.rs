//! ADSR (Attack, Decay, Sustain, Release) envelope evaluated from timestamps.

use crate::error::{Result, SynthError};

/// Amplitudes at or below this value are reported as exact silence.
pub const SILENCE_THRESHOLD: f64 = 1e-4;

/// Phase of an envelope at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The queried time lies before the note was pressed
    Idle,
    /// Ramping from 0 to the start amplitude
    Attack,
    /// Ramping from the start amplitude to the sustain level
    Decay,
    /// Holding at the sustain level while the key is down
    Sustain,
    /// Ramping from the level reached at key-up down to 0
    Release,
    /// Release has completed
    Finished,
}

/// ADSR envelope configuration.
///
/// Unlike a sample-stepped envelope this one keeps no running clock. The level
/// is recomputed on every call from the current time and the note's on/off
/// timestamps, so the same configuration can be shared by every sounding note
/// and by both the control and audio threads.
///
/// - **Attack**: ramps from 0 to `start_amplitude`
/// - **Decay**: ramps from `start_amplitude` to `sustain_level`
/// - **Sustain**: holds at `sustain_level` until key-up
/// - **Release**: ramps from the level actually reached at key-up to 0
///
/// # Examples
///
/// ```
/// use polysynth::EnvelopeConfig;
///
/// // 10ms attack, 1s decay, silent sustain, 1s release
/// let env = EnvelopeConfig::new(0.01, 1.0, 0.0, 1.0).unwrap();
///
/// // Halfway through the attack
/// assert!((env.amplitude(0.005, 0.0, None) - 0.5).abs() < 1e-9);
///
/// // Fully released
/// assert_eq!(env.amplitude(4.0, 0.0, Some(3.0)), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    attack: f64,
    decay: f64,
    start_amplitude: f64,
    sustain_level: f64,
    release: f64,
}

impl EnvelopeConfig {
    /// Creates an envelope with a start amplitude of 1.0.
    ///
    /// # Arguments
    ///
    /// * `attack` - Attack time in seconds (strictly positive)
    /// * `decay` - Decay time in seconds (strictly positive)
    /// * `sustain_level` - Sustain level in `[0, 1]`
    /// * `release` - Release time in seconds (strictly positive)
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::InvalidDuration`] for a zero, negative or
    /// non-finite time and [`SynthError::InvalidLevel`] for a level outside
    /// `[0, 1]`.
    pub fn new(attack: f64, decay: f64, sustain_level: f64, release: f64) -> Result<Self> {
        Ok(Self {
            attack: duration("attack", attack)?,
            decay: duration("decay", decay)?,
            start_amplitude: 1.0,
            sustain_level: level("sustain level", sustain_level)?,
            release: duration("release", release)?,
        })
    }

    /// Builds a configuration from values already known to be valid.
    pub(crate) const fn from_parts(
        attack: f64,
        decay: f64,
        start_amplitude: f64,
        sustain_level: f64,
        release: f64,
    ) -> Self {
        Self {
            attack,
            decay,
            start_amplitude,
            sustain_level,
            release,
        }
    }

    /// Sets the peak reached at the end of the attack phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use polysynth::EnvelopeConfig;
    ///
    /// let env = EnvelopeConfig::new(0.1, 0.1, 0.5, 0.1)
    ///     .and_then(|env| env.with_start_amplitude(0.8))
    ///     .unwrap();
    /// assert_eq!(env.start_amplitude(), 0.8);
    /// ```
    pub fn with_start_amplitude(mut self, start_amplitude: f64) -> Result<Self> {
        self.start_amplitude = level("start amplitude", start_amplitude)?;
        Ok(self)
    }

    pub fn attack(&self) -> f64 {
        self.attack
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn start_amplitude(&self) -> f64 {
        self.start_amplitude
    }

    pub fn sustain_level(&self) -> f64 {
        self.sustain_level
    }

    pub fn release(&self) -> f64 {
        self.release
    }

    /// Returns the envelope level at `time`.
    ///
    /// `time_off` is `None` while the key is held. Once released, the release
    /// ramp starts from the attack/decay/sustain level evaluated at the
    /// release instant, so letting go mid-attack never jumps.
    ///
    /// Levels at or below [`SILENCE_THRESHOLD`] come back as exactly `0.0`.
    /// A NaN, infinite or greater-than-one level is a computation fault and
    /// also comes back as `0.0`.
    pub fn amplitude(&self, time: f64, time_on: f64, time_off: Option<f64>) -> f64 {
        let raw = match time_off {
            Some(off) if time >= off => {
                let elapsed = time - off;
                if elapsed >= self.release {
                    0.0
                } else {
                    let start = self.held_amplitude(off - time_on);
                    start * (1.0 - elapsed / self.release)
                }
            }
            _ => self.held_amplitude(time - time_on),
        };
        sanitize(raw)
    }

    /// Returns the phase the envelope is in at `time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use polysynth::{EnvelopeConfig, Phase};
    ///
    /// let env = EnvelopeConfig::new(0.1, 0.2, 0.7, 0.3).unwrap();
    /// assert_eq!(env.phase(0.05, 0.0, None), Phase::Attack);
    /// assert_eq!(env.phase(5.0, 0.0, None), Phase::Sustain);
    /// assert_eq!(env.phase(5.1, 0.0, Some(5.0)), Phase::Release);
    /// assert_eq!(env.phase(6.0, 0.0, Some(5.0)), Phase::Finished);
    /// ```
    pub fn phase(&self, time: f64, time_on: f64, time_off: Option<f64>) -> Phase {
        match time_off {
            Some(off) if time >= off => {
                if time - off >= self.release {
                    Phase::Finished
                } else {
                    Phase::Release
                }
            }
            _ => {
                let lifetime = time - time_on;
                if lifetime < 0.0 {
                    Phase::Idle
                } else if lifetime <= self.attack {
                    Phase::Attack
                } else if lifetime <= self.attack + self.decay {
                    Phase::Decay
                } else {
                    Phase::Sustain
                }
            }
        }
    }

    /// Level of the attack/decay/sustain segments `lifetime` seconds after key-down.
    fn held_amplitude(&self, lifetime: f64) -> f64 {
        if lifetime < 0.0 {
            0.0
        } else if lifetime <= self.attack {
            lifetime / self.attack * self.start_amplitude
        } else if lifetime <= self.attack + self.decay {
            let progress = (lifetime - self.attack) / self.decay;
            self.start_amplitude - progress * (self.start_amplitude - self.sustain_level)
        } else {
            self.sustain_level
        }
    }
}

fn sanitize(amplitude: f64) -> f64 {
    if !amplitude.is_finite() || amplitude.abs() > 1.0 || amplitude <= SILENCE_THRESHOLD {
        0.0
    } else {
        amplitude
    }
}

fn duration(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SynthError::InvalidDuration { name, value })
    }
}

fn level(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SynthError::InvalidLevel { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn bell() -> EnvelopeConfig {
        EnvelopeConfig::new(0.01, 1.0, 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_creation() {
        let env = EnvelopeConfig::new(0.1, 0.2, 0.7, 0.3).unwrap();
        assert_eq!(env.attack(), 0.1);
        assert_eq!(env.decay(), 0.2);
        assert_eq!(env.sustain_level(), 0.7);
        assert_eq!(env.release(), 0.3);
        assert_eq!(env.start_amplitude(), 1.0);
    }

    #[test]
    fn test_rejects_non_positive_durations() {
        assert!(matches!(
            EnvelopeConfig::new(0.0, 0.1, 0.5, 0.1),
            Err(SynthError::InvalidDuration { name: "attack", .. })
        ));
        assert!(matches!(
            EnvelopeConfig::new(0.1, -1.0, 0.5, 0.1),
            Err(SynthError::InvalidDuration { name: "decay", .. })
        ));
        assert!(matches!(
            EnvelopeConfig::new(0.1, 0.1, 0.5, f64::NAN),
            Err(SynthError::InvalidDuration { name: "release", .. })
        ));
    }

    #[test]
    fn test_rejects_levels_out_of_range() {
        assert!(matches!(
            EnvelopeConfig::new(0.1, 0.1, 1.5, 0.1),
            Err(SynthError::InvalidLevel { .. })
        ));
        let env = EnvelopeConfig::new(0.1, 0.1, 0.5, 0.1).unwrap();
        assert!(env.with_start_amplitude(-0.1).is_err());
        assert!(env.with_start_amplitude(f64::NAN).is_err());
    }

    #[test]
    fn test_before_note_on_is_silent() {
        let env = EnvelopeConfig::new(0.1, 0.1, 0.5, 0.1).unwrap();
        assert_eq!(env.amplitude(0.5, 1.0, None), 0.0);
        assert_eq!(env.phase(0.5, 1.0, None), Phase::Idle);
    }

    #[test]
    fn test_attack_phase_linear() {
        let env = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0)
            .unwrap()
            .with_start_amplitude(0.8)
            .unwrap();
        assert!(approx_eq(env.amplitude(0.25, 0.0, None), 0.2));
        assert!(approx_eq(env.amplitude(0.5, 0.0, None), 0.4));
        assert!(approx_eq(env.amplitude(1.0, 0.0, None), 0.8));
    }

    #[test]
    fn test_decay_phase_linear() {
        let env = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0).unwrap();
        assert!(approx_eq(env.amplitude(1.5, 0.0, None), 0.75));
        assert!(approx_eq(env.amplitude(2.0, 0.0, None), 0.5));
    }

    #[test]
    fn test_sustain_phase() {
        let env = EnvelopeConfig::new(0.1, 0.1, 0.6, 0.1).unwrap();
        for i in 0..100 {
            let t = 0.3 + i as f64 * 0.5;
            assert!(approx_eq(env.amplitude(t, 0.0, None), 0.6));
        }
    }

    #[test]
    fn test_continuity_at_phase_boundaries() {
        let configs = [
            EnvelopeConfig::new(0.01, 1.0, 0.0, 1.0).unwrap(),
            EnvelopeConfig::new(0.05, 1.0, 0.9, 0.1).unwrap(),
            EnvelopeConfig::new(0.3, 0.2, 0.4, 0.5)
                .unwrap()
                .with_start_amplitude(0.7)
                .unwrap(),
        ];
        let h = 1e-9;
        for env in configs {
            let attack_end = env.attack();
            let decay_end = env.attack() + env.decay();
            for boundary in [attack_end, decay_end] {
                let before = env.amplitude(boundary - h, 0.0, None);
                let after = env.amplitude(boundary + h, 0.0, None);
                assert!(
                    (before - after).abs() < 1e-6,
                    "jump at {boundary}: {before} -> {after}"
                );
            }
        }
    }

    #[test]
    fn test_release_from_sustain() {
        let env = EnvelopeConfig::new(0.1, 0.1, 0.8, 1.0).unwrap();
        assert!(approx_eq(env.amplitude(5.0, 0.0, Some(5.0)), 0.8));
        assert!(approx_eq(env.amplitude(5.5, 0.0, Some(5.0)), 0.4));
        assert_eq!(env.amplitude(6.0, 0.0, Some(5.0)), 0.0);
    }

    #[test]
    fn test_release_during_attack_starts_from_partial_level() {
        let env = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0).unwrap();
        // Released a quarter of the way into the attack
        let partial = env.amplitude(0.25, 0.0, None);
        assert!(approx_eq(partial, 0.25));

        let at_release = env.amplitude(0.25, 0.0, Some(0.25));
        assert!(approx_eq(at_release, partial));
        assert!(!approx_eq(at_release, env.start_amplitude()));
        assert!(!approx_eq(at_release, env.sustain_level()));

        // Halfway through the release ramp
        assert!(approx_eq(env.amplitude(0.75, 0.0, Some(0.25)), 0.125));
    }

    #[test]
    fn test_release_during_decay_starts_from_partial_level() {
        let env = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0).unwrap();
        let partial = env.amplitude(1.5, 0.0, None);
        assert!(approx_eq(env.amplitude(1.5, 0.0, Some(1.5)), partial));
        assert!(approx_eq(env.amplitude(2.0, 0.0, Some(1.5)), partial / 2.0));
    }

    #[test]
    fn test_query_before_release_uses_held_level() {
        let env = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0).unwrap();
        assert!(approx_eq(
            env.amplitude(0.5, 0.0, Some(3.0)),
            env.amplitude(0.5, 0.0, None)
        ));
    }

    #[test]
    fn test_silent_after_release() {
        let env = bell();
        for i in 0..50 {
            let t = 4.0 + i as f64 * 0.37;
            assert_eq!(env.amplitude(t, 0.0, Some(3.0)), 0.0);
        }
        assert_eq!(env.phase(4.0, 0.0, Some(3.0)), Phase::Finished);
    }

    #[test]
    fn test_small_levels_clamp_to_zero() {
        // Sustain below the threshold reads as silence
        let env = EnvelopeConfig::new(0.1, 0.1, SILENCE_THRESHOLD / 2.0, 0.1).unwrap();
        assert_eq!(env.amplitude(10.0, 0.0, None), 0.0);
        // The very first instant of the attack is silent too
        assert_eq!(env.amplitude(0.0, 0.0, None), 0.0);
    }

    #[test]
    fn test_sanitize_faults() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(1.5), 0.0);
        assert_eq!(sanitize(-0.3), 0.0);
        assert_eq!(sanitize(1.0), 1.0);
        assert_eq!(sanitize(0.5), 0.5);
    }

    #[test]
    fn test_full_start_amplitude_survives_attack_peak() {
        let env = EnvelopeConfig::new(0.01, 1.0, 0.0, 1.0).unwrap();
        assert_eq!(env.start_amplitude(), 1.0);
        assert_eq!(env.amplitude(0.01, 0.0, None), 1.0);
        assert_eq!(env.amplitude(0.01, 0.0, Some(0.01)), 1.0);
        assert!(env.amplitude(0.0099, 0.0, None) > 0.98);
        assert!(env.amplitude(0.0101, 0.0, None) > 0.98);
    }

    #[test]
    fn test_bell_timeline() {
        let env = bell();
        assert!(approx_eq(env.amplitude(0.005, 0.0, None), 0.5));
        assert_eq!(env.amplitude(2.5, 0.0, None), 0.0);
        assert_eq!(env.amplitude(3.5, 0.0, Some(3.0)), 0.0);
        assert_eq!(env.amplitude(4.0, 0.0, Some(3.0)), 0.0);
    }

    #[test]
    fn test_phase_sequence() {
        let env = EnvelopeConfig::new(0.1, 0.1, 0.6, 0.1).unwrap();
        assert_eq!(env.phase(0.05, 0.0, None), Phase::Attack);
        assert_eq!(env.phase(0.15, 0.0, None), Phase::Decay);
        assert_eq!(env.phase(0.5, 0.0, None), Phase::Sustain);
        assert_eq!(env.phase(0.55, 0.0, Some(0.5)), Phase::Release);
        assert_eq!(env.phase(0.7, 0.0, Some(0.5)), Phase::Finished);
    }
}
