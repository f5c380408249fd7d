//! Shared playback clock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts rendered frames and converts them to playback seconds.
///
/// The audio thread is the only writer: it calls [`advance`](Self::advance)
/// after each block. The control thread reads [`now`](Self::now) to stamp
/// key events, so a note pressed between two blocks starts at the first
/// frame of the next block.
///
/// # Examples
///
/// ```
/// use polysynth::PlaybackClock;
///
/// let clock = PlaybackClock::new(48_000.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance(24_000);
/// assert_eq!(clock.now(), 0.5);
/// assert_eq!(clock.frames(), 24_000);
/// ```
#[derive(Debug)]
pub struct PlaybackClock {
    sample_rate: f64,
    frames: AtomicU64,
}

impl PlaybackClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            frames: AtomicU64::new(0),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Current playback time in seconds.
    pub fn now(&self) -> f64 {
        self.time_at(self.frames())
    }

    /// Playback time of an absolute frame index.
    pub fn time_at(&self, frame: u64) -> f64 {
        frame as f64 / self.sample_rate
    }

    /// Moves the clock forward by `frames` and returns the new frame count.
    pub fn advance(&self, frames: u64) -> u64 {
        self.frames.fetch_add(frames, Ordering::AcqRel) + frames
    }
}
