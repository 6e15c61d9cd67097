//! cpal output stream that plays a [`ToneSynth`].

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use quadtone_core::{AudioConfig, QuadtoneError, Result, ToneSynth};

/// Samples converted per pass when the device wants `f32`.
const SCRATCH_SAMPLES: usize = 1024;

/// An open output stream. Audio flows between [`ToneOutput::play`] and drop;
/// dropping the value stops callback delivery.
pub struct ToneOutput {
    stream: cpal::Stream,
    sample_rate: u32,
}

impl ToneOutput {
    /// Opens the default output device with the configured rate, channel
    /// count and buffer size. The stream starts paused.
    pub fn open(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| QuadtoneError::platform("audio open", "no output device available"))?;
        let format = device
            .default_output_config()
            .map(|c| c.sample_format())
            .unwrap_or(cpal::SampleFormat::I16);
        tracing::info!(
            host = host.id().name(),
            device = %device_label(&device),
            ?format,
            "opening audio output"
        );

        let mut stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_frames),
        };
        let stream = match build_stream(&device, &stream_config, format, config) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(
                    buffer_frames = config.buffer_frames,
                    error = %err,
                    "fixed buffer size rejected, retrying with the device default"
                );
                stream_config.buffer_size = cpal::BufferSize::Default;
                build_stream(&device, &stream_config, format, config)
                    .map_err(|e| QuadtoneError::platform("audio open", e.to_string()))?
            }
        };
        stream
            .pause()
            .map_err(|e| QuadtoneError::platform("audio open", e.to_string()))?;

        Ok(Self {
            stream,
            sample_rate: config.sample_rate,
        })
    }

    /// Starts callback delivery.
    pub fn play(&self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| QuadtoneError::platform("audio start", e.to_string()))?;
        tracing::info!(sample_rate = self.sample_rate, "audio output started");
        Ok(())
    }
}

impl Drop for ToneOutput {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            tracing::debug!(error = %err, "pausing audio output during shutdown failed");
        }
        tracing::info!("audio output stopped");
    }
}

impl std::fmt::Debug for ToneOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneOutput")
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

fn device_label(device: &cpal::Device) -> String {
    device
        .description()
        .map(|d| d.name().to_string())
        .unwrap_or_else(|_| "<unnamed>".to_string())
}

/// Builds the stream for the device's preferred sample format. The synth is
/// moved into the callback, which is its only owner from here on.
fn build_stream(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    format: cpal::SampleFormat,
    config: &AudioConfig,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError> {
    let channels = usize::from(stream_config.channels);
    let mut synth = ToneSynth::new(config.sample_rate, config.tone);
    let on_error = |err: cpal::StreamError| tracing::error!(error = %err, "audio stream error");

    match format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                fill_f32(&mut synth, data, channels);
            },
            on_error,
            None,
        ),
        _ => device.build_output_stream(
            stream_config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                synth.fill_interleaved(data, channels);
            },
            on_error,
            None,
        ),
    }
}

/// Renders through a stack scratch buffer so the callback never allocates.
fn fill_f32(synth: &mut ToneSynth, out: &mut [f32], channels: usize) {
    let mut scratch = [0_i16; SCRATCH_SAMPLES];
    let chunk = (SCRATCH_SAMPLES / channels.max(1)) * channels.max(1);
    for block in out.chunks_mut(chunk) {
        let scratch = &mut scratch[..block.len()];
        synth.fill_interleaved(scratch, channels);
        for (dst, &src) in block.iter_mut().zip(scratch.iter()) {
            *dst = f32::from(src) / 32_768.0;
        }
    }
}
