use crate::{
    config::{QuitPolicy, RenderConfig},
    geometry::GeometryBuffer,
    gfx::Gl,
    gl_check,
    interaction::{InteractionState, Viewport},
    program::{ShaderProgram, OFFSET_UNIFORM},
    Result,
};

/// Input the platform layer hands to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The user asked to close the window.
    Quit,
    /// A pointer button went down at a pixel position, origin top-left.
    PointerDown { x: f64, y: f64 },
}

/// Where the frame loop pulls input from.
pub trait EventSource {
    /// Returns the next queued event, or `None` once this pass is drained.
    fn poll_event(&mut self) -> Option<Event>;
}

/// Where finished frames go.
pub trait Presenter {
    /// Shows the back buffer. Blocks for vsync when the platform enables it.
    fn present(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Owns everything drawn each frame and the single piece of interactive
/// state. Runs entirely on the thread that owns the graphics context.
#[derive(Debug)]
pub struct FrameLoop<G: Gl> {
    program: ShaderProgram<G>,
    geometry: GeometryBuffer<G>,
    offset_location: Option<G::UniformLocation>,
    interaction: InteractionState,
    viewport: Viewport,
    clear_color: [f32; 4],
    quit_policy: QuitPolicy,
    state: LoopState,
    frames: u64,
}

impl<G: Gl> FrameLoop<G> {
    /// Builds the quad program and uploads its geometry.
    pub fn new(gl: &G, config: &RenderConfig, viewport: Viewport) -> Result<Self> {
        let program = ShaderProgram::quad(gl)?;
        let geometry = match GeometryBuffer::quad(gl) {
            Ok(geometry) => geometry,
            Err(err) => {
                program.release(gl);
                return Err(err);
            }
        };

        let offset_location = program.uniform_location(gl, OFFSET_UNIFORM);
        if offset_location.is_none() {
            tracing::warn!(
                uniform = OFFSET_UNIFORM,
                "uniform not found, clicks will not move the quad"
            );
        }
        if config.srgb_framebuffer {
            gl_check!(gl, gl.enable_framebuffer_srgb());
        }

        Ok(Self {
            program,
            geometry,
            offset_location,
            interaction: InteractionState::new(),
            viewport,
            clear_color: config.clear_color,
            quit_policy: config.quit_policy,
            state: LoopState::Running,
            frames: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Applies one event to the loop state.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Quit => {
                if self.state == LoopState::Running {
                    tracing::info!("quit requested");
                }
                self.state = LoopState::Stopped;
            }
            Event::PointerDown { x, y } => self.interaction.pointer_down(self.viewport, x, y),
        }
    }

    /// Pulls events until the source runs dry and returns how many were
    /// applied. With [`QuitPolicy::Immediate`] the pass ends at the first
    /// quit instead.
    pub fn drain_events<E: EventSource + ?Sized>(&mut self, events: &mut E) -> usize {
        let mut applied = 0;
        while let Some(event) = events.poll_event() {
            self.handle_event(event);
            applied += 1;
            if self.quit_policy == QuitPolicy::Immediate && self.state == LoopState::Stopped {
                break;
            }
        }
        applied
    }

    /// Issues the clear and the quad draw. Graphics errors are reported and
    /// otherwise ignored.
    pub fn render(&self, gl: &G) {
        let [x, y] = self.interaction.translation();

        gl.clear_color(self.clear_color);
        gl_check!(gl, gl.clear_color_buffer());

        gl_check!(gl, self.program.activate(gl));
        gl_check!(gl, gl.uniform_2f(self.offset_location.as_ref(), x, y));

        gl_check!(gl, self.geometry.bind(gl));
        gl_check!(gl, gl.draw_triangle_strip(0, self.geometry.vertex_count() as i32));
        gl_check!(gl, self.geometry.unbind(gl));

        gl_check!(gl, self.program.deactivate(gl));
    }

    /// One loop iteration: drain input, then draw and present unless the
    /// drain stopped the loop.
    pub fn step<P>(&mut self, gl: &G, platform: &mut P) -> LoopState
    where
        P: EventSource + Presenter + ?Sized,
    {
        self.drain_events(platform);
        if self.state == LoopState::Running {
            self.render(gl);
            platform.present();
            self.frames += 1;
        }
        self.state
    }

    /// Steps until a quit event stops the loop. Returns the number of frames
    /// presented.
    pub fn run<P>(&mut self, gl: &G, platform: &mut P) -> u64
    where
        P: EventSource + Presenter + ?Sized,
    {
        tracing::info!(
            width = self.viewport.width,
            height = self.viewport.height,
            "frame loop running"
        );
        while self.step(gl, platform) == LoopState::Running {}
        tracing::info!(frames = self.frames, "frame loop stopped");
        self.frames
    }

    /// Deletes the program and geometry. Must run while the context is
    /// still alive.
    pub fn release(self, gl: &G) {
        self.geometry.release(gl);
        self.program.release(gl);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::gfx::fake::{Call, FakeGl};

    const VIEWPORT: Viewport = Viewport {
        width: 1152,
        height: 648,
    };

    /// Scripted platform: each inner vector is one poll batch.
    #[derive(Default)]
    struct Script {
        batches: VecDeque<VecDeque<Event>>,
        current: VecDeque<Event>,
        presented: usize,
        started: bool,
    }

    impl Script {
        fn new(batches: Vec<Vec<Event>>) -> Self {
            Self {
                batches: batches.into_iter().map(VecDeque::from).collect(),
                ..Self::default()
            }
        }

        fn next_batch(&mut self) {
            self.current = self.batches.pop_front().unwrap_or_default();
        }
    }

    impl EventSource for Script {
        fn poll_event(&mut self) -> Option<Event> {
            if !self.started {
                self.started = true;
                self.next_batch();
            }
            self.current.pop_front()
        }
    }

    impl Presenter for Script {
        fn present(&mut self) {
            self.presented += 1;
            self.next_batch();
        }
    }

    fn frame_loop(gl: &FakeGl, quit_policy: QuitPolicy) -> FrameLoop<FakeGl> {
        let config = RenderConfig {
            quit_policy,
            ..RenderConfig::default()
        };
        FrameLoop::new(gl, &config, VIEWPORT).expect("frame loop should build")
    }

    #[test]
    fn clicks_then_quit_end_to_end() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        let mut script = Script::new(vec![
            vec![Event::PointerDown { x: 576.0, y: 324.0 }],
            vec![Event::PointerDown { x: 0.0, y: 0.0 }],
            vec![Event::Quit],
        ]);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Running);
        assert_eq!(frame_loop.interaction().translation(), [0.0, 0.0]);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Running);
        assert_eq!(frame_loop.interaction().translation(), [-1.0, 1.0]);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Stopped);
        assert_eq!(script.presented, 2);
        assert_eq!(frame_loop.frames(), 2);
    }

    #[test]
    fn run_returns_after_quit() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        let mut script = Script::new(vec![vec![], vec![], vec![Event::Quit]]);

        assert_eq!(frame_loop.run(&gl, &mut script), 2);
        assert_eq!(frame_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn drain_batch_applies_clicks_queued_after_quit() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        let mut script = Script::new(vec![vec![
            Event::Quit,
            Event::PointerDown { x: 0.0, y: 0.0 },
        ]]);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Stopped);
        assert_eq!(frame_loop.interaction().translation(), [-1.0, 1.0]);
        assert!(script.current.is_empty());
        assert_eq!(script.presented, 0);
    }

    #[test]
    fn immediate_quit_leaves_later_events_queued() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::Immediate);
        let mut script = Script::new(vec![vec![
            Event::Quit,
            Event::PointerDown { x: 0.0, y: 0.0 },
        ]]);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Stopped);
        assert_eq!(frame_loop.interaction().translation(), [0.0, 0.0]);
        assert_eq!(script.current.len(), 1);
    }

    #[test]
    fn render_issues_the_frame_sequence_in_order() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        frame_loop.handle_event(Event::PointerDown { x: 864.0, y: 162.0 });
        gl.clear_calls();

        frame_loop.render(&gl);

        let program = frame_loop.program.handle();
        let location = frame_loop.offset_location;
        assert!(location.is_some());
        let calls = gl.calls();
        let vertex_array = match calls.get(4) {
            Some(Call::BindVertexArray(Some(id))) => *id,
            other => panic!("expected a vertex array bind, got {other:?}"),
        };
        assert_eq!(
            calls,
            vec![
                Call::ClearColor([1.0, 1.0, 1.0, 1.0]),
                Call::Clear,
                Call::UseProgram(Some(program)),
                Call::Uniform2f(location, [0.5, 0.5]),
                Call::BindVertexArray(Some(vertex_array)),
                Call::DrawTriangleStrip { first: 0, count: 4 },
                Call::BindVertexArray(None),
                Call::UseProgram(None),
            ]
        );
    }

    #[test]
    fn graphics_errors_do_not_interrupt_the_frame() {
        let gl = FakeGl::new();
        let mut frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        let mut script = Script::new(vec![vec![], vec![Event::Quit]]);
        gl.clear_calls();
        gl.push_error(0x0502);
        gl.push_error(0x0506);

        assert_eq!(frame_loop.step(&gl, &mut script), LoopState::Running);
        assert_eq!(gl.pending_errors(), 0);
        assert!(gl
            .calls()
            .contains(&Call::DrawTriangleStrip { first: 0, count: 4 }));
        assert_eq!(script.presented, 1);
    }

    #[test]
    fn setup_enables_srgb_when_configured() {
        let gl = FakeGl::new();
        let _frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        assert!(gl.calls().contains(&Call::EnableFramebufferSrgb));

        let gl = FakeGl::new();
        let config = RenderConfig {
            srgb_framebuffer: false,
            ..RenderConfig::default()
        };
        let _frame_loop = FrameLoop::new(&gl, &config, VIEWPORT).unwrap();
        assert!(!gl.calls().contains(&Call::EnableFramebufferSrgb));
    }

    #[test]
    fn release_frees_every_object() {
        let gl = FakeGl::new();
        let frame_loop = frame_loop(&gl, QuitPolicy::DrainBatch);
        frame_loop.release(&gl);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_buffers(), 0);
        assert_eq!(gl.live_shaders(), 0);
    }
}
