use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Bytes in one interleaved 16-bit stereo frame.
pub const STEREO_FRAME_BYTES: usize = 2 * std::mem::size_of::<i16>();

/// Pitch and loudness of the synthesised tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f64,
    /// Peak amplitude on the `i16` scale.
    pub amplitude: f64,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: 264.0,
            amplitude: 1000.0,
        }
    }
}

/// Stream-side timing state: the rate fixed at stream open and how many
/// frames have been produced since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioState {
    pub sample_rate: u32,
    pub samples_done: u64,
}

impl AudioState {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples_done: 0,
        }
    }

    /// Playback position of the next frame, in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.samples_done as f64 / f64::from(self.sample_rate)
    }
}

/// Value of `tone` at absolute frame `index` of a stream running at
/// `sample_rate`. Pure: the same inputs always give the same sample.
pub fn tone_sample(tone: &Tone, sample_rate: u32, index: u64) -> i16 {
    let time = index as f64 / f64::from(sample_rate);
    let value = (TAU * tone.frequency_hz * time).sin();
    (tone.amplitude * value) as i16
}

/// Sine generator driven by the audio device's fill requests.
///
/// The synth is moved into the output callback and owned by the audio
/// thread from then on. Filling never allocates or blocks, and the frame
/// counter only grows, so phase stays continuous whatever the buffer sizes.
#[derive(Debug, Clone)]
pub struct ToneSynth {
    state: AudioState,
    tone: Tone,
}

impl ToneSynth {
    pub fn new(sample_rate: u32, tone: Tone) -> Self {
        Self::from_state(AudioState::new(sample_rate), tone)
    }

    /// Resumes from an existing timing snapshot.
    pub fn from_state(state: AudioState, tone: Tone) -> Self {
        Self { state, tone }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Fills an interleaved buffer with `channels` channels, writing the same
    /// value to every channel of a frame. A trailing partial frame is
    /// silenced. Returns the number of whole frames written.
    pub fn fill_interleaved(&mut self, out: &mut [i16], channels: usize) -> usize {
        if channels == 0 {
            out.fill(0);
            return 0;
        }

        let mut frames = out.chunks_exact_mut(channels);
        let mut written = 0_u64;
        for frame in &mut frames {
            frame.fill(self.next_value(written));
            written += 1;
        }
        frames.into_remainder().fill(0);

        self.state.samples_done += written;
        written as usize
    }

    /// Fills a raw device buffer of native-endian 16-bit stereo frames.
    /// Trailing bytes that do not make a whole frame are zeroed. Returns the
    /// number of frames written.
    pub fn fill_stereo_bytes(&mut self, out: &mut [u8]) -> usize {
        let mut frames = out.chunks_exact_mut(STEREO_FRAME_BYTES);
        let mut written = 0_u64;
        for frame in &mut frames {
            let bytes = self.next_value(written).to_ne_bytes();
            frame[..2].copy_from_slice(&bytes);
            frame[2..].copy_from_slice(&bytes);
            written += 1;
        }
        frames.into_remainder().fill(0);

        self.state.samples_done += written;
        written as usize
    }

    fn next_value(&self, offset: u64) -> i16 {
        tone_sample(
            &self.tone,
            self.state.sample_rate,
            self.state.samples_done + offset,
        )
    }
}
