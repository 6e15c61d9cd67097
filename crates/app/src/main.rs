mod platform;

use std::process::ExitCode;

use quadtone_core::{AppConfig, FrameLoop};
use tracing_subscriber::EnvFilter;

use platform::{Display, EventPump, Frontend, ToneOutput};

fn main() -> ExitCode {
    init_tracing();

    let config = AppConfig::default();
    tracing::debug!(config = %config.to_log_string(), "effective configuration");

    match run(&config) {
        Ok(frames) => {
            tracing::info!(frames, "clean shutdown");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Acquires the platform in order (subsystem, audio, window and context),
/// runs the frame loop, then tears down: audio first, then GL objects, the
/// context and window, and finally the subsystem. An early `?` drops
/// whatever was already acquired in reverse order.
fn run(config: &AppConfig) -> quadtone_core::Result<u64> {
    let mut events = EventPump::new()?;
    let audio = ToneOutput::open(&config.audio)?;
    let display = Display::create(events.event_loop(), &config.window)?;

    let gl = display.gl();
    let mut frame_loop = FrameLoop::new(gl, &config.render, display.viewport())?;

    audio.play()?;
    let frames = frame_loop.run(gl, &mut Frontend::new(&mut events, &display));

    drop(audio);
    frame_loop.release(gl);
    drop(display);
    drop(events);
    Ok(frames)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
