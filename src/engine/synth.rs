//! The render callback and its control-side handle.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::clock::PlaybackClock;
use super::mixer::{MixPolicy, mix};
use crate::config::SynthConfig;
use crate::envelopes::EnvelopeConfig;
use crate::error::Result;
use crate::instruments::{Instrument, Sound};
use crate::music::{NoteEvent, NoteId, NoteRegistry, Trigger};

/// A polyphonic synthesizer: one instrument voicing every live note.
///
/// The synth is the audio thread's half. It reads the shared
/// [`NoteRegistry`] under a single lock per block, sums every note through
/// the instrument, scales by the [`MixPolicy`] and advances the
/// [`PlaybackClock`]. The control thread gets its half from
/// [`Synth::controller`].
///
/// Rendering never allocates, logs or fails. A non-finite mix becomes
/// silence and the output is clamped to `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use polysynth::{Instrument, NoteId, Synth, SynthConfig};
///
/// let synth = Synth::new(SynthConfig::default(), Instrument::bell()).unwrap();
/// let controller = synth.controller();
///
/// controller.press(NoteId(12));
///
/// let mut buffer = [0.0f32; 512];
/// synth.render(&mut buffer, 2);
///
/// assert!(buffer.iter().any(|s| *s != 0.0));
/// assert_eq!(synth.clock().frames(), 256);
/// ```
pub struct Synth<S: Sound = Instrument> {
    registry: Arc<NoteRegistry>,
    sound: Arc<S>,
    clock: Arc<PlaybackClock>,
    mix: MixPolicy,
}

impl<S: Sound> Synth<S> {
    /// Builds a synth voicing every note with `sound`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`SynthConfig::validate`].
    pub fn new(config: SynthConfig, sound: S) -> Result<Self> {
        config.validate()?;
        debug!(
            sample_rate = config.sample_rate,
            mix = ?config.mix,
            base_frequency = config.tuning.base_frequency(),
            "synth created"
        );
        Ok(Self {
            registry: Arc::new(NoteRegistry::with_capacity(
                config.tuning,
                config.note_capacity,
            )),
            sound: Arc::new(sound),
            clock: Arc::new(PlaybackClock::new(config.sample_rate as f64)),
            mix: config.mix,
        })
    }

    /// Returns a handle for pressing and releasing keys from another thread.
    pub fn controller(&self) -> Controller {
        Controller {
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
            envelope: *self.sound.envelope(),
        }
    }

    pub fn registry(&self) -> &Arc<NoteRegistry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<PlaybackClock> {
        &self.clock
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn mix_policy(&self) -> MixPolicy {
        self.mix
    }

    /// Computes the output at an arbitrary playback time.
    ///
    /// The clock is not touched; use this to pull samples on your own
    /// schedule.
    pub fn sample(&self, time: f64) -> f64 {
        self.registry.with_notes(|notes| {
            let sum = mix(self.sound.as_ref(), notes, time);
            finish(self.mix.apply(sum, notes.len()))
        })
    }

    /// Fills an interleaved buffer starting at the clock's current frame.
    ///
    /// Every channel of a frame gets the same value. The clock advances by
    /// the number of whole frames written; trailing samples that do not make
    /// up a full frame are zeroed. A `channels` of zero is treated as mono.
    pub fn render(&self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let start = self.clock.frames();

        let mut frames = buffer.chunks_exact_mut(channels);
        let written = self.registry.with_notes(|notes| {
            let mut written = 0u64;
            for frame in frames.by_ref() {
                let time = self.clock.time_at(start + written);
                let sum = mix(self.sound.as_ref(), notes, time);
                frame.fill(finish(self.mix.apply(sum, notes.len())) as f32);
                written += 1;
            }
            written
        });
        frames.into_remainder().fill(0.0);

        self.clock.advance(written);
    }
}

impl<S: Sound> Clone for Synth<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            sound: Arc::clone(&self.sound),
            clock: Arc::clone(&self.clock),
            mix: self.mix,
        }
    }
}

impl<S: Sound> fmt::Debug for Synth<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synth")
            .field("registry", &self.registry)
            .field("clock", &self.clock)
            .field("mix", &self.mix)
            .finish_non_exhaustive()
    }
}

fn finish(sample: f64) -> f64 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Control-loop handle to a running [`Synth`].
///
/// Events are stamped with the shared playback clock, so they land on the
/// next rendered block.
#[derive(Debug, Clone)]
pub struct Controller {
    registry: Arc<NoteRegistry>,
    clock: Arc<PlaybackClock>,
    envelope: EnvelopeConfig,
}

impl Controller {
    /// Current playback time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn press(&self, id: NoteId) -> Trigger {
        self.registry.note_on(id, self.now())
    }

    pub fn release(&self, id: NoteId) -> bool {
        self.registry.note_off(id, self.now())
    }

    /// Applies an event at the time it carries.
    pub fn handle(&self, event: NoteEvent) {
        self.registry.apply(event);
    }

    /// Drops released notes that have gone silent. Call once per control tick.
    pub fn prune(&self) -> usize {
        let removed = self.registry.prune(self.now(), &self.envelope);
        if removed > 0 {
            trace!(removed, live = self.registry.len(), "pruned silent notes");
        }
        removed
    }

    pub fn active_ids(&self) -> Vec<NoteId> {
        self.registry.active_ids()
    }

    /// Releases every held key.
    pub fn all_notes_off(&self) -> usize {
        self.registry.all_notes_off(self.now())
    }

    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }
}
