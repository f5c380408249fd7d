//! Play a polyphonic instrument from the computer keyboard.
//!
//! ## Controls
//!
//! Sixteen keys play successive semitones starting at C3, in this order:
//!
//! ```text
//! Z S X C F V G B N J M K , L . /
//! ```
//!
//! - SPACE: release every note
//! - Q or ESC: quit
//!
//! Pick the instrument with the first argument:
//!
//! ```text
//! cargo run --example keyboard -- harmonica
//! ```
//!
//! Key release events need a terminal that supports the kitty keyboard
//! protocol.

mod common;

use anyhow::Result;
use common::{KeyAction, KeyboardConfig, init_logging, is_quit_key, run_interactive_example};
use crossterm::{
    QueueableCommand,
    cursor::MoveTo,
    event::{KeyCode, KeyEvent, KeyEventKind},
    terminal::{Clear, ClearType},
};
use polysynth::{Controller, NoteId, Preset, SynthConfig};
use std::io::{Write, stdout};
use tracing::info;

const KEYS: [char; 16] = [
    'z', 's', 'x', 'c', 'f', 'v', 'g', 'b', 'n', 'j', 'm', 'k', ',', 'l', '.', '/',
];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn key_to_note(code: KeyCode) -> Option<NoteId> {
    match code {
        KeyCode::Char(c) => KEYS
            .iter()
            .position(|&k| k == c.to_ascii_lowercase())
            .map(|i| NoteId(i as u32)),
        _ => None,
    }
}

fn note_name(id: NoteId) -> String {
    format!("{}{}", NOTE_NAMES[id.0 as usize % 12], 3 + id.0 / 12)
}

fn handle_key(controller: &Controller, key_event: &KeyEvent) -> Result<KeyAction> {
    match key_event.code {
        code if is_quit_key(code) => return Ok(KeyAction::Exit),
        KeyCode::Char(' ') if key_event.kind == KeyEventKind::Press => {
            controller.all_notes_off();
            return Ok(KeyAction::Continue);
        }
        _ => {}
    }

    if let Some(id) = key_to_note(key_event.code) {
        match key_event.kind {
            KeyEventKind::Press => {
                controller.press(id);
            }
            KeyEventKind::Release => {
                controller.release(id);
            }
            KeyEventKind::Repeat => {}
        }
    }

    Ok(KeyAction::Continue)
}

fn draw(preset: Preset, controller: &Controller) -> Result<()> {
    let notes = controller.active_ids();
    let playing = if notes.is_empty() {
        "-".to_string()
    } else {
        notes
            .iter()
            .map(|&id| note_name(id))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut out = stdout();
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    write!(out, "polysynth keyboard - {preset}")?;
    out.queue(MoveTo(0, 2))?;
    write!(out, "Keys: Z S X C F V G B N J M K , L . /")?;
    out.queue(MoveTo(0, 3))?;
    write!(out, "SPACE = all notes off | Q/ESC = quit")?;
    out.queue(MoveTo(0, 5))?;
    write!(out, "t = {:>8.2}s  notes: {playing}", controller.now())?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging("warn");

    let preset = match std::env::args().nth(1) {
        Some(name) => name.parse::<Preset>()?,
        None => Preset::default(),
    };
    info!(%preset, "starting keyboard");

    run_interactive_example(
        preset.build(),
        SynthConfig::default(),
        KeyboardConfig::with_enhancements(),
        handle_key,
        |controller| draw(preset, controller),
    )
}
