//! Notes, tuning, key input and the live-note registry.

pub mod frequency;
mod input;
mod note;
mod registry;

pub use frequency::{NoteId, Tuning};
pub use input::{Edge, KeyPoller, NoteEvent};
pub use note::Note;
pub use registry::{DEFAULT_NOTE_CAPACITY, NoteRegistry, Trigger};
