//! Sine-tone alerts on the default output device (`audio` feature)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use tracing::{debug, info, warn};

use crate::core::audio::{synthesize, Beeper};
use crate::types::Tone;
use crate::{Error, Result};

/// Silence kept after the tone so the device drains before the stream drops
const STREAM_TAIL: Duration = Duration::from_millis(50);

/// Plays each beep at its exact pitch and length on a short-lived output
/// stream. A beep that arrives while one is still playing is dropped.
pub struct ToneBeeper {
    playing: Arc<AtomicBool>,
}

impl ToneBeeper {
    /// Fails when the host has no default output device
    pub fn open() -> Result<Self> {
        let device = default_device()?;
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!(device = %name, "audio output ready");
        Ok(Self {
            playing: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl Beeper for ToneBeeper {
    fn beep(&mut self, tone: Tone) -> Result<()> {
        if self.playing.swap(true, Ordering::SeqCst) {
            debug!("tone still playing, beep dropped");
            return Ok(());
        }

        let playing = self.playing.clone();
        let spawned = std::thread::Builder::new()
            .name("postureguard-tone".to_string())
            .spawn(move || {
                if let Err(e) = play(tone) {
                    warn!(error = %e, "alert tone failed");
                }
                playing.store(false, Ordering::SeqCst);
            });

        if let Err(e) = spawned {
            self.playing.store(false, Ordering::SeqCst);
            return Err(Error::Audio(e));
        }
        Ok(())
    }
}

fn device_error(e: impl std::fmt::Display) -> Error {
    Error::AudioDevice(e.to_string())
}

fn default_device() -> Result<cpal::Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| Error::AudioDevice("no default output device".to_string()))
}

fn play(tone: Tone) -> Result<()> {
    let device = default_device()?;
    let supported = device.default_output_config().map_err(device_error)?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    match format {
        SampleFormat::F32 => play_on::<f32>(&device, &config, tone),
        SampleFormat::I16 => play_on::<i16>(&device, &config, tone),
        SampleFormat::U16 => play_on::<u16>(&device, &config, tone),
        other => Err(Error::AudioDevice(format!("unsupported sample format {:?}", other))),
    }
}

fn play_on<T>(device: &cpal::Device, config: &cpal::StreamConfig, tone: Tone) -> Result<()>
where
    T: SizedSample + FromSample<f32>,
{
    let samples = synthesize(tone, config.sample_rate.0);
    let channels = config.channels.max(1) as usize;
    let mut cursor = 0usize;

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = samples.get(cursor).copied().unwrap_or(0.0);
                    cursor += 1;
                    let sample = T::from_sample(value);
                    frame.iter_mut().for_each(|out| *out = sample);
                }
            },
            |e| warn!(error = %e, "audio stream error"),
            None,
        )
        .map_err(device_error)?;

    stream.play().map_err(device_error)?;
    std::thread::sleep(tone.duration + STREAM_TAIL);
    debug!(
        frequency_hz = tone.frequency_hz,
        duration_ms = tone.duration.as_millis() as u64,
        "tone played"
    );
    Ok(())
}
