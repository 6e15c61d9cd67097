//! Core library for the Quadtone demo.
//!
//! Quadtone opens a window, draws one coloured quad that jumps to wherever
//! the user clicks, and plays a steady sine tone. This crate holds all of
//! that logic and none of the platform code:
//!
//! - [`diagnostics`] names and logs graphics error codes.
//! - [`program`] compiles and links the shader pair.
//! - [`geometry`] owns the static quad vertices and their layout.
//! - [`audio`] fills device buffers with the tone.
//! - [`frame`] drains input, moves the quad and draws each frame.
//!
//! Graphics go through the [`Gl`] trait and input/presentation through
//! [`EventSource`] / [`Presenter`], so the desktop binary supplies the real
//! window, context and audio device while tests drive everything headless.

pub mod audio;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gfx;
pub mod interaction;
pub mod program;

pub use audio::{tone_sample, AudioState, Tone, ToneSynth};
pub use config::{AppConfig, AudioConfig, QuitPolicy, RenderConfig, WindowConfig};
pub use diagnostics::{check_errors, GlErrorKind};
pub use error::{QuadtoneError, Result};
pub use frame::{Event, EventSource, FrameLoop, LoopState, Presenter};
pub use geometry::{GeometryBuffer, Vertex, VertexAttribute, VertexLayout, QUAD_VERTICES};
pub use gfx::{Gl, ShaderStage};
pub use interaction::{InteractionState, Viewport};
pub use program::ShaderProgram;
