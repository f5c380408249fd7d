//! Terminal and audio-device plumbing shared by the interactive demos.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyCode, KeyEvent, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use polysynth::{Controller, Instrument, Synth, SynthConfig};
use std::io::stdout;
use std::panic;
use std::time::Duration;
use tracing::{error, info};

/// Configuration for keyboard enhancements (needed for detecting key release).
#[derive(Default)]
pub struct KeyboardConfig {
    pub enable_enhancements: bool,
}

impl KeyboardConfig {
    pub fn with_enhancements() -> Self {
        Self {
            enable_enhancements: true,
        }
    }
}

/// Key handling result that controls the event loop
pub enum KeyAction {
    Continue,
    Exit,
}

/// Runs a synth on the default output device with a terminal key loop.
///
/// The synth is built at the device's sample rate; `config` supplies the
/// rest. Between key events the loop prunes silent notes and calls `tick`
/// so the demo can redraw.
///
/// # Arguments
///
/// * `instrument` - Instrument voicing every note
/// * `config` - Synth settings; the sample rate is replaced by the device's
/// * `keyboard_config` - Configuration for keyboard handling
/// * `key_handler` - Handles key events and returns whether to continue or exit
/// * `tick` - Called roughly every 50 ms with the controller
pub fn run_interactive_example<K, T>(
    instrument: Instrument,
    config: SynthConfig,
    keyboard_config: KeyboardConfig,
    mut key_handler: K,
    mut tick: T,
) -> Result<()>
where
    K: FnMut(&Controller, &KeyEvent) -> Result<KeyAction>,
    T: FnMut(&Controller) -> Result<()>,
{
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;

    let device_config = device.default_output_config()?;
    let config = config.with_sample_rate(device_config.sample_rate().0);
    let synth = Synth::new(config, instrument)?;
    let controller = synth.controller();
    info!(
        sample_rate = config.sample_rate,
        channels = device_config.channels(),
        "opened output device"
    );

    let _stream = match device_config.sample_format() {
        SampleFormat::F32 => create_audio_stream::<f32>(&device, &device_config.into(), synth)?,
        SampleFormat::I16 => create_audio_stream::<i16>(&device, &device_config.into(), synth)?,
        SampleFormat::U16 => create_audio_stream::<u16>(&device, &device_config.into(), synth)?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };

    // Keyboard enhancements MUST come before alternate screen
    if keyboard_config.enable_enhancements {
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(crossterm::cursor::Hide)?;

    let has_enhancements = keyboard_config.enable_enhancements;
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal(has_enhancements);
        original_hook(panic_info);
    }));

    let outcome = event_loop(&controller, &mut key_handler, &mut tick);

    controller.all_notes_off();
    cleanup_terminal(has_enhancements);
    outcome
}

fn event_loop<K, T>(controller: &Controller, key_handler: &mut K, tick: &mut T) -> Result<()>
where
    K: FnMut(&Controller, &KeyEvent) -> Result<KeyAction>,
    T: FnMut(&Controller) -> Result<()>,
{
    tick(controller)?;
    loop {
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key_event) = event::read()?
            && let KeyAction::Exit = key_handler(controller, &key_event)?
        {
            return Ok(());
        }
        controller.prune();
        tick(controller)?;
    }
}

/// Creates an output stream that pulls blocks from the synth.
fn create_audio_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    synth: Synth,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
{
    let channels = config.channels as usize;
    // Sized for a typical block; only grows if the driver asks for more
    let mut scratch = vec![0.0f32; 4096];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if scratch.len() < data.len() {
                scratch.resize(data.len(), 0.0);
            }
            let block = &mut scratch[..data.len()];
            synth.render(block, channels);
            for (out, sample) in data.iter_mut().zip(block.iter()) {
                *out = T::from_sample(*sample);
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}

/// Cleans up terminal state (cursor, alternate screen, raw mode).
fn cleanup_terminal(has_keyboard_enhancements: bool) {
    if has_keyboard_enhancements {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
    }
    let _ = stdout().execute(crossterm::cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Helper to check if a key code is a quit key (Q, ESC).
pub fn is_quit_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
}

/// Installs a `RUST_LOG`-driven subscriber writing to stderr.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
