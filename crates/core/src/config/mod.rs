use serde::{Deserialize, Serialize};

use crate::audio::Tone;

/// Top-level configuration structure for the application.
///
/// The defaults are the demo's fixed constants; nothing reads them from
/// disk or the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub audio: AudioConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Compact JSON rendering for the startup log.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!("<unserialisable: {err}>"))
    }
}

/// Window and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wait for one display refresh per presented frame.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Quadtone".to_string(),
            width: 192 * 6,
            height: 108 * 6,
            vsync: true,
        }
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Requested device buffer size, in frames.
    pub buffer_frames: u32,
    pub tone: Tone,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            buffer_frames: 4096,
            tone: Tone::default(),
        }
    }
}

/// What the frame loop does with events queued behind a quit request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuitPolicy {
    /// Finish the current drain pass, applying every event in it, then stop.
    #[default]
    DrainBatch,
    /// Stop at the quit event; anything after it stays in the platform queue.
    Immediate,
}

/// Per-frame drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub srgb_framebuffer: bool,
    pub quit_policy: QuitPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            srgb_framebuffer: true,
            quit_policy: QuitPolicy::DrainBatch,
        }
    }
}
