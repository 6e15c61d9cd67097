//! Desktop platform layer: window, OpenGL context, input pump and audio
//! device. Everything here is acquired once at startup and released in a
//! fixed order after the frame loop exits.

mod audio;
mod gl;

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use quadtone_core::{Event, EventSource, Presenter, QuadtoneError, Result, Viewport, WindowConfig};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

pub use self::audio::ToneOutput;
use self::gl::GlowGl;

/// Translates winit window events into frame-loop [`Event`]s.
#[derive(Debug, Default)]
struct EventCollector {
    queue: VecDeque<Event>,
    cursor: PhysicalPosition<f64>,
}

impl EventCollector {
    fn handle(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.queue.push_back(Event::Quit),
            WindowEvent::CursorMoved { position, .. } => self.cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => self.queue.push_back(Event::PointerDown {
                x: self.cursor.x,
                y: self.cursor.y,
            }),
            _ => {}
        }
    }
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.handle(event);
    }
}

/// The windowing subsystem. Pumps the OS queue at most once per frame and
/// hands the collected events out one at a time.
pub struct EventPump {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    pumped: bool,
}

impl EventPump {
    pub fn new() -> Result<Self> {
        let event_loop =
            EventLoop::new().map_err(|e| QuadtoneError::platform("subsystem init", e.to_string()))?;
        Ok(Self {
            event_loop,
            collector: EventCollector::default(),
            pumped: false,
        })
    }

    pub fn event_loop(&self) -> &EventLoop<()> {
        &self.event_loop
    }

    fn poll_event(&mut self) -> Option<Event> {
        if !self.pumped {
            self.pumped = true;
            let status = self
                .event_loop
                .pump_app_events(Some(Duration::ZERO), &mut self.collector);
            if let PumpStatus::Exit(code) = status {
                tracing::debug!(code, "platform event loop exited");
                self.collector.queue.push_back(Event::Quit);
            }
        }
        self.collector.queue.pop_front()
    }

    /// Allows the next poll to pump the OS queue again.
    fn rearm(&mut self) {
        self.pumped = false;
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        tracing::debug!("windowing subsystem released");
    }
}

/// Window plus current OpenGL 4.1 core context.
///
/// Field order is teardown order: GL function table, context, surface, then
/// the window itself.
pub struct Display {
    gl: GlowGl,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

impl Display {
    /// Creates the window and makes a fresh context current on it.
    pub fn create(event_loop: &EventLoop<()>, config: &WindowConfig) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(false);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, ConfigTemplateBuilder::new(), pick_config)
            .map_err(|e| QuadtoneError::platform("window create", e.to_string()))?;
        let window = window
            .ok_or_else(|| QuadtoneError::platform("window create", "no window was created"))?;

        let raw_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 1))))
            .build(raw_handle);

        // SAFETY: the raw window handle comes from `window`, which outlives
        // the context because it is declared after it in `Display`.
        let context = unsafe { display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| QuadtoneError::platform("context create", e.to_string()))?;
        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::new().with_srgb(Some(true)))
            .map_err(|e| QuadtoneError::platform("context create", e.to_string()))?;
        // SAFETY: same window-outlives-surface ordering as above.
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| QuadtoneError::platform("context create", e.to_string()))?;
        let context = context
            .make_current(&surface)
            .map_err(|e| QuadtoneError::platform("context create", e.to_string()))?;

        if config.vsync {
            if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
                tracing::warn!(error = %err, "could not enable vsync");
            }
        }

        // SAFETY: the context was made current on this thread just above.
        let gl = GlowGl::new(unsafe {
            glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol))
        });
        tracing::info!(
            version = %gl.version(),
            srgb = gl_config.srgb_capable(),
            "graphics context ready"
        );

        Ok(Self {
            gl,
            context,
            surface,
            window,
        })
    }

    pub fn gl(&self) -> &GlowGl {
        &self.gl
    }

    /// Drawable size in physical pixels, the space cursor positions use.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    fn swap_buffers(&self) {
        if let Err(err) = self.surface.swap_buffers(&self.context) {
            tracing::warn!(error = %err, "buffer swap failed");
        }
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        tracing::debug!("graphics context and window released");
    }
}

/// Prefers sRGB-capable configs, then the fewest multisample buffers.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, candidate| {
            let rank = |c: &Config| (c.srgb_capable(), std::cmp::Reverse(c.num_samples()));
            if rank(&candidate) > rank(&best) {
                candidate
            } else {
                best
            }
        })
        .expect("glutin reports an error instead of offering zero configs")
}

/// What the frame loop sees of the platform for one run.
pub struct Frontend<'a> {
    events: &'a mut EventPump,
    display: &'a Display,
}

impl<'a> Frontend<'a> {
    pub fn new(events: &'a mut EventPump, display: &'a Display) -> Self {
        Self { events, display }
    }
}

impl EventSource for Frontend<'_> {
    fn poll_event(&mut self) -> Option<Event> {
        self.events.poll_event()
    }
}

impl Presenter for Frontend<'_> {
    fn present(&mut self) {
        self.display.swap_buffers();
        self.events.rearm();
    }
}
