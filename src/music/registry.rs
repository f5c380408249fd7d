//! Registry of the notes currently sounding.
//!
//! # Design Overview
//!
//! The `NoteRegistry` is the only mutable state shared between the control
//! loop and the audio thread. The control loop presses and releases keys and
//! prunes finished notes; the render callback reads every live note once per
//! buffer.
//!
//! ## Locking
//!
//! Notes live in a `Vec` behind a `Mutex`. The vector is preallocated so that
//! ordinary playing never reallocates while the lock is held, and every
//! critical section is a short scan over at most a few dozen notes. The render
//! side takes the lock once per buffer through [`NoteRegistry::with_notes`].
//!
//! A poisoned lock is recovered rather than propagated: a panic on one thread
//! must never silence the other.
//!
//! ## Lifecycle
//!
//! 1. `note_on` creates a held note (at most one per id)
//! 2. `note_off` stamps the release time; the note keeps sounding
//! 3. `prune` drops released notes once their envelope has reached zero
//!
//! Notes are never removed on key-up, which would cut the waveform mid-cycle
//! and click.
//!
//! ## Re-pressing during the release tail
//!
//! Pressing a key whose previous note is still ringing out replaces that note
//! with a fresh one starting at the new press time. Holding a key never
//! retriggers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use super::frequency::{NoteId, Tuning};
use super::input::{Edge, NoteEvent};
use super::note::Note;
use crate::envelopes::EnvelopeConfig;

/// Number of notes the registry holds before its storage has to grow.
pub const DEFAULT_NOTE_CAPACITY: usize = 32;

/// What a call to [`NoteRegistry::note_on`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A new note was created
    Started,
    /// A note in its release tail was replaced by a fresh one
    Restarted,
    /// The key was already held; nothing changed
    AlreadyHeld,
}

/// Thread-safe set of live notes keyed by [`NoteId`].
///
/// # Examples
///
/// ```
/// use polysynth::{EnvelopeConfig, NoteId, NoteRegistry, Tuning};
///
/// let registry = NoteRegistry::new(Tuning::default());
/// let envelope = EnvelopeConfig::new(0.01, 0.1, 0.5, 0.2).unwrap();
///
/// registry.note_on(NoteId(0), 0.0);
/// registry.note_on(NoteId(4), 0.0);
/// assert_eq!(registry.len(), 2);
///
/// registry.note_off(NoteId(0), 1.0);
/// // Still ringing out
/// assert_eq!(registry.prune(1.1, &envelope), 0);
/// // Release finished
/// assert_eq!(registry.prune(1.3, &envelope), 1);
/// assert_eq!(registry.active_ids(), vec![NoteId(4)]);
/// ```
#[derive(Debug)]
pub struct NoteRegistry {
    tuning: Tuning,
    notes: Mutex<Vec<Note>>,
}

impl NoteRegistry {
    /// Creates an empty registry with [`DEFAULT_NOTE_CAPACITY`] slots reserved.
    pub fn new(tuning: Tuning) -> Self {
        Self::with_capacity(tuning, DEFAULT_NOTE_CAPACITY)
    }

    /// Creates an empty registry with room for `capacity` notes.
    pub fn with_capacity(tuning: Tuning, capacity: usize) -> Self {
        Self {
            tuning,
            notes: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Note>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Presses a key at `time`.
    ///
    /// A held key is left untouched so its envelope keeps running. A key still
    /// in its release tail is restarted from `time`.
    pub fn note_on(&self, id: NoteId, time: f64) -> Trigger {
        let frequency = self.tuning.frequency(id);
        let outcome = {
            let mut notes = self.lock();
            match notes.iter_mut().find(|note| note.id() == id) {
                Some(note) if note.is_held() => Trigger::AlreadyHeld,
                Some(note) => {
                    *note = Note::new(id, frequency, time);
                    Trigger::Restarted
                }
                None => {
                    notes.push(Note::new(id, frequency, time));
                    Trigger::Started
                }
            }
        };
        trace!(%id, time, ?outcome, "note on");
        outcome
    }

    /// Releases a key at `time`.
    ///
    /// Returns `false` if no held note exists for `id`.
    pub fn note_off(&self, id: NoteId, time: f64) -> bool {
        let released = self
            .lock()
            .iter_mut()
            .find(|note| note.id() == id)
            .is_some_and(|note| note.release(time));
        trace!(%id, time, released, "note off");
        released
    }

    /// Applies a key edge.
    pub fn apply(&self, event: NoteEvent) {
        match event.edge {
            Edge::Pressed => {
                self.note_on(event.id, event.time);
            }
            Edge::Released => {
                self.note_off(event.id, event.time);
            }
        }
    }

    /// Releases every held note at `time` and returns how many were released.
    pub fn all_notes_off(&self, time: f64) -> usize {
        let released = self
            .lock()
            .iter_mut()
            .map(|note| note.release(time))
            .filter(|&released| released)
            .count();
        trace!(time, released, "all notes off");
        released
    }

    /// Drops every released note whose envelope is silent at `time`.
    ///
    /// Held notes are never dropped, whatever their level. Returns the number
    /// of notes removed.
    pub fn prune(&self, time: f64, envelope: &EnvelopeConfig) -> usize {
        let removed = {
            let mut notes = self.lock();
            let before = notes.len();
            notes.retain(|note| {
                note.is_held() || envelope.amplitude(time, note.time_on(), note.time_off()) > 0.0
            });
            before - notes.len()
        };
        if removed > 0 {
            trace!(time, removed, "pruned notes");
        }
        removed
    }

    /// Visits every live note, held or releasing.
    ///
    /// The lock is held for the whole visit, so the visitor must be short and
    /// must not call back into the registry.
    pub fn for_each_active<F: FnMut(&Note)>(&self, mut visitor: F) {
        for note in self.lock().iter() {
            visitor(note);
        }
    }

    /// Runs `f` over the live notes under a single lock.
    pub fn with_notes<R>(&self, f: impl FnOnce(&[Note]) -> R) -> R {
        let notes = self.lock();
        f(notes.as_slice())
    }

    /// Returns the ids of every live note in press order.
    pub fn active_ids(&self) -> Vec<NoteId> {
        self.lock().iter().map(Note::id).collect()
    }

    /// Returns a copy of the live note for `id`, if any.
    pub fn get(&self, id: NoteId) -> Option<Note> {
        self.lock().iter().find(|note| note.id() == id).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NoteRegistry {
        NoteRegistry::new(Tuning::default())
    }

    fn envelope() -> EnvelopeConfig {
        EnvelopeConfig::new(0.1, 0.1, 0.5, 0.5).unwrap()
    }

    #[test]
    fn test_creation() {
        let registry = registry();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_note_on_creates_held_note() {
        let registry = registry();
        assert_eq!(registry.note_on(NoteId(3), 1.0), Trigger::Started);

        let note = registry.get(NoteId(3)).unwrap();
        assert!(note.is_held());
        assert_eq!(note.time_on(), 1.0);
        assert_eq!(note.frequency(), Tuning::default().frequency(NoteId(3)));
    }

    #[test]
    fn test_duplicate_note_on_keeps_time_on() {
        let registry = registry();
        registry.note_on(NoteId(0), 1.0);
        assert_eq!(registry.note_on(NoteId(0), 2.0), Trigger::AlreadyHeld);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(NoteId(0)).unwrap().time_on(), 1.0);
    }

    #[test]
    fn test_note_off_sets_time_off_once() {
        let registry = registry();
        registry.note_on(NoteId(0), 1.0);
        assert!(registry.note_off(NoteId(0), 2.0));
        assert!(!registry.note_off(NoteId(0), 3.0));

        let note = registry.get(NoteId(0)).unwrap();
        assert!(!note.is_held());
        assert_eq!(note.time_off(), Some(2.0));
    }

    #[test]
    fn test_note_off_without_note_is_noop() {
        let registry = registry();
        assert!(!registry.note_off(NoteId(9), 1.0));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_repress_in_release_tail_restarts() {
        let registry = registry();
        registry.note_on(NoteId(0), 0.0);
        registry.note_off(NoteId(0), 1.0);
        assert_eq!(registry.note_on(NoteId(0), 1.2), Trigger::Restarted);

        let note = registry.get(NoteId(0)).unwrap();
        assert!(note.is_held());
        assert_eq!(note.time_on(), 1.2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_prune_keeps_held_notes() {
        let registry = registry();
        // Sustain of zero makes a held note silent after decay
        let silent_sustain = EnvelopeConfig::new(0.01, 0.01, 0.0, 0.1).unwrap();
        registry.note_on(NoteId(0), 0.0);
        assert_eq!(silent_sustain.amplitude(10.0, 0.0, None), 0.0);
        assert_eq!(registry.prune(10.0, &silent_sustain), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_prune_waits_for_release_to_finish() {
        let registry = registry();
        let envelope = envelope();
        registry.note_on(NoteId(0), 0.0);
        registry.note_off(NoteId(0), 1.0);

        assert_eq!(registry.prune(1.25, &envelope), 0);
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.prune(1.5, &envelope), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prune_only_removes_finished() {
        let registry = registry();
        let envelope = envelope();
        registry.note_on(NoteId(0), 0.0);
        registry.note_on(NoteId(1), 0.0);
        registry.note_on(NoteId(2), 0.0);
        registry.note_off(NoteId(1), 1.0);

        assert_eq!(registry.prune(2.0, &envelope), 1);
        assert_eq!(registry.active_ids(), vec![NoteId(0), NoteId(2)]);
    }

    #[test]
    fn test_all_notes_off() {
        let registry = registry();
        registry.note_on(NoteId(0), 0.0);
        registry.note_on(NoteId(1), 0.0);
        registry.note_on(NoteId(2), 0.0);
        registry.note_off(NoteId(2), 0.5);

        assert_eq!(registry.all_notes_off(1.0), 2);
        registry.for_each_active(|note| assert!(!note.is_held()));
        assert_eq!(registry.get(NoteId(2)).unwrap().time_off(), Some(0.5));
    }

    #[test]
    fn test_apply_events() {
        let registry = registry();
        registry.apply(NoteEvent::pressed(NoteId(5), 0.0));
        assert!(registry.get(NoteId(5)).unwrap().is_held());
        registry.apply(NoteEvent::released(NoteId(5), 0.5));
        assert_eq!(registry.get(NoteId(5)).unwrap().time_off(), Some(0.5));
    }

    #[test]
    fn test_for_each_active_visits_all() {
        let registry = registry();
        for id in 0..5 {
            registry.note_on(NoteId(id), 0.0);
        }
        let mut count = 0;
        registry.for_each_active(|_| count += 1);
        assert_eq!(count, 5);
        assert_eq!(registry.with_notes(|notes| notes.len()), 5);
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let registry = std::sync::Arc::new(registry());
        registry.note_on(NoteId(0), 0.0);

        let poisoner = std::sync::Arc::clone(&registry);
        let _ = std::thread::spawn(move || {
            poisoner.with_notes(|_| panic!("poison the registry lock"));
        })
        .join();

        assert_eq!(registry.len(), 1);
        registry.note_on(NoteId(1), 0.0);
        assert_eq!(registry.len(), 2);
    }
}
