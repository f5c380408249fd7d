//! Key edges fed into the note registry.

use super::frequency::NoteId;

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// A key transition stamped with the playback time it happened at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub id: NoteId,
    pub edge: Edge,
    pub time: f64,
}

impl NoteEvent {
    pub fn pressed(id: impl Into<NoteId>, time: f64) -> Self {
        Self {
            id: id.into(),
            edge: Edge::Pressed,
            time,
        }
    }

    pub fn released(id: impl Into<NoteId>, time: f64) -> Self {
        Self {
            id: id.into(),
            edge: Edge::Released,
            time,
        }
    }
}

/// Turns polled key states into edges.
///
/// Input layers that can only ask "is this key down right now?" once per
/// frame hand the full state array to [`KeyPoller::poll`], which reports
/// only the keys that changed since the previous poll. Key `i` maps to
/// `NoteId(i)`.
///
/// # Examples
///
/// ```
/// use polysynth::{Edge, KeyPoller, NoteId};
///
/// let mut poller = KeyPoller::<4>::new();
///
/// let events = poller.poll(&[false, true, false, false], 0.0);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].id, NoteId(1));
/// assert_eq!(events[0].edge, Edge::Pressed);
///
/// // Holding the key produces nothing new
/// assert!(poller.poll(&[false, true, false, false], 0.1).is_empty());
///
/// let events = poller.poll(&[false, false, false, false], 0.2);
/// assert_eq!(events[0].edge, Edge::Released);
/// ```
#[derive(Debug, Clone)]
pub struct KeyPoller<const KEYS: usize> {
    previous: [bool; KEYS],
}

impl<const KEYS: usize> KeyPoller<KEYS> {
    pub fn new() -> Self {
        Self {
            previous: [false; KEYS],
        }
    }

    /// Compares `states` with the last poll and returns one event per change.
    pub fn poll(&mut self, states: &[bool; KEYS], time: f64) -> Vec<NoteEvent> {
        let events = self
            .previous
            .iter()
            .zip(states.iter())
            .enumerate()
            .filter(|(_, (was, is))| was != is)
            .map(|(key, (_, &is_down))| {
                let id = NoteId(key as u32);
                if is_down {
                    NoteEvent::pressed(id, time)
                } else {
                    NoteEvent::released(id, time)
                }
            })
            .collect();
        self.previous = *states;
        events
    }

    /// Returns true if the key was down at the last poll.
    pub fn is_down(&self, key: usize) -> bool {
        self.previous.get(key).copied().unwrap_or(false)
    }
}

impl<const KEYS: usize> Default for KeyPoller<KEYS> {
    fn default() -> Self {
        Self::new()
    }
}
