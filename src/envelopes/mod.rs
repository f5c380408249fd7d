//! Amplitude envelopes.
//!
//! Envelopes here are pure functions of the note's timestamps: nothing advances
//! per sample, so a note can be evaluated at any time by any thread.

mod adsr;

pub use adsr::{EnvelopeConfig, Phase, SILENCE_THRESHOLD};
