//! A sounding note.

use super::frequency::NoteId;

/// A note that is held or still ringing out its release.
///
/// `time_on` is fixed when the key goes down. `time_off` stays `None` while
/// the key is held and is set exactly once on key-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    id: NoteId,
    frequency: f64,
    time_on: f64,
    time_off: Option<f64>,
}

impl Note {
    /// Creates a held note pressed at `time_on` seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use polysynth::{Note, NoteId};
    ///
    /// let mut note = Note::new(NoteId(0), 130.813, 1.0);
    /// assert!(note.is_held());
    ///
    /// assert!(note.release(1.5));
    /// assert_eq!(note.time_off(), Some(1.5));
    ///
    /// // A second key-up is ignored
    /// assert!(!note.release(2.0));
    /// assert_eq!(note.time_off(), Some(1.5));
    /// ```
    pub fn new(id: NoteId, frequency: f64, time_on: f64) -> Self {
        Self {
            id,
            frequency,
            time_on,
            time_off: None,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Fundamental frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn time_on(&self) -> f64 {
        self.time_on
    }

    pub fn time_off(&self) -> Option<f64> {
        self.time_off
    }

    pub fn is_held(&self) -> bool {
        self.time_off.is_none()
    }

    /// Marks the key as released at `time`.
    ///
    /// Returns `false` without changing anything if the note was already
    /// released.
    pub fn release(&mut self, time: f64) -> bool {
        if self.is_held() {
            self.time_off = Some(time);
            true
        } else {
            false
        }
    }
}
