//! Polysynth - a small polyphonic software synthesizer core
//!
//! Notes are pressed and released on a control thread and stored in a shared
//! [`NoteRegistry`]. The audio thread pulls samples from a [`Synth`], which
//! voices every live note through an [`Instrument`]: a weighted recipe of
//! oscillator partials shaped by an ADSR [`EnvelopeConfig`].
//!
//! Everything is computed from timestamps. A note only records when it was
//! pressed and released; the envelope and oscillators are pure functions of
//! the playback time.
//!
//! # Examples
//!
//! ```
//! use polysynth::{NoteId, Preset, Synth, SynthConfig};
//!
//! let synth = Synth::new(SynthConfig::default(), Preset::Harmonica.build()).unwrap();
//! let keys = synth.controller();
//!
//! keys.press(NoteId(0));
//! keys.press(NoteId(4));
//! keys.press(NoteId(7));
//!
//! let mut block = vec![0.0f32; 1024];
//! synth.render(&mut block, 2);
//! assert!(block.iter().all(|s| (-1.0..=1.0).contains(s)));
//!
//! keys.all_notes_off();
//! ```

pub mod config;
pub mod engine;
pub mod envelopes;
pub mod error;
pub mod instruments;
pub mod music;
pub mod oscillators;

// Re-export commonly used types at the crate root
pub use config::{DEFAULT_SAMPLE_RATE, SynthConfig};
pub use engine::{Controller, MixPolicy, PlaybackClock, Synth, mix};
pub use envelopes::{EnvelopeConfig, Phase, SILENCE_THRESHOLD};
pub use error::{Result, SynthError};
pub use instruments::{Instrument, InstrumentBuilder, Partial, Preset, Sound};
pub use music::{Edge, KeyPoller, Note, NoteEvent, NoteId, NoteRegistry, Trigger, Tuning};
pub use oscillators::{Vibrato, Waveform, oscillate};
