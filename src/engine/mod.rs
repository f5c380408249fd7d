//! The audio-facing side: mixing, the playback clock and the render callback.

mod clock;
mod mixer;
mod synth;

pub use clock::PlaybackClock;
pub use mixer::{MixPolicy, mix};
pub use synth::{Controller, Synth};
