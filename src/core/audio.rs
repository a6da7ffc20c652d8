//! Alert output: the `Beeper` seam, the terminal bell and tone synthesis

use std::io::{self, Write};

use tracing::debug;

use crate::types::Tone;
use crate::{Error, Result};

/// Plays an alert tone
pub trait Beeper {
    fn beep(&mut self, tone: Tone) -> Result<()>;
}

impl<B: Beeper + ?Sized> Beeper for Box<B> {
    fn beep(&mut self, tone: Tone) -> Result<()> {
        (**self).beep(tone)
    }
}

/// Rings the terminal bell (BEL). Pitch and length are up to the terminal.
pub struct TerminalBell<W: Write = io::Stdout> {
    out: W,
}

impl TerminalBell {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Beeper for TerminalBell<W> {
    fn beep(&mut self, tone: Tone) -> Result<()> {
        debug!(
            frequency_hz = tone.frequency_hz,
            duration_ms = tone.duration.as_millis() as u64,
            "beep"
        );
        self.out.write_all(b"\x07").map_err(Error::Audio)?;
        self.out.flush().map_err(Error::Audio)
    }
}

/// `--mute`
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBeeper;

impl Beeper for SilentBeeper {
    fn beep(&mut self, _tone: Tone) -> Result<()> {
        Ok(())
    }
}

/// Peak amplitude of synthesized tones, full scale is 1.0
pub const TONE_AMPLITUDE: f32 = 0.3;

/// Mono sine samples for `tone` at `sample_rate`
pub fn synthesize(tone: Tone, sample_rate: u32) -> Vec<f32> {
    let count = (tone.duration.as_secs_f64() * sample_rate as f64).round() as usize;
    let step = 2.0 * std::f64::consts::PI * tone.frequency_hz as f64 / sample_rate as f64;
    (0..count)
        .map(|i| (i as f64 * step).sin() as f32 * TONE_AMPLITUDE)
        .collect()
}
