//! Render a short phrase offline to a WAV file.
//!
//! ```text
//! cargo run --example render_wav -- bell phrase.wav
//! ```
//!
//! Key events are scheduled ahead of time and applied at block boundaries,
//! the same way a live control loop would feed the synth.

#[allow(dead_code)]
mod common;

use anyhow::{Context, Result};
use common::init_logging;
use polysynth::{MixPolicy, NoteEvent, NoteId, Preset, Synth, SynthConfig};
use tracing::info;

const SAMPLE_RATE: u32 = 44_100;
const BLOCK_FRAMES: usize = 512;

/// (key, pressed at, released at) in seconds.
const PHRASE: [(u32, f64, f64); 8] = [
    (0, 0.0, 0.4),
    (4, 0.5, 0.9),
    (7, 1.0, 1.4),
    (12, 1.5, 2.5),
    (0, 3.0, 4.5),
    (4, 3.0, 4.5),
    (7, 3.0, 4.5),
    (11, 3.25, 4.5),
];

const TAIL_SECONDS: f64 = 1.5;

fn schedule() -> Vec<NoteEvent> {
    let mut events: Vec<NoteEvent> = PHRASE
        .iter()
        .flat_map(|&(key, on, off)| {
            [
                NoteEvent::pressed(NoteId(key), on),
                NoteEvent::released(NoteId(key), off),
            ]
        })
        .collect();
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}

fn main() -> Result<()> {
    init_logging("info");

    let mut args = std::env::args().skip(1);
    let preset = match args.next() {
        Some(name) => name.parse::<Preset>()?,
        None => Preset::default(),
    };
    let path = args.next().unwrap_or_else(|| format!("{preset}.wav"));

    let config = SynthConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_mix(MixPolicy::Headroom(0.3));
    let synth = Synth::new(config, preset.build())?;
    let controller = synth.controller();

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(&path, spec).with_context(|| format!("creating {path}"))?;

    let events = schedule();
    let end = events.last().map_or(0.0, |e| e.time) + TAIL_SECONDS;
    let mut pending = events.into_iter().peekable();
    let mut block = [0.0f32; BLOCK_FRAMES];

    while controller.now() < end {
        let now = controller.now();
        while let Some(event) = pending.next_if(|e| e.time <= now) {
            controller.handle(event);
        }
        controller.prune();

        synth.render(&mut block, 1);
        for sample in block {
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
    }
    writer.finalize()?;

    info!(%preset, %path, seconds = end, "rendered");
    Ok(())
}
