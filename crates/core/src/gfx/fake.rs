//! Recording, in-memory [`Gl`] used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use super::{Gl, ShaderStage};

/// Draw-side calls in the order they were issued.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ClearColor([f32; 4]),
    Clear,
    EnableFramebufferSrgb,
    UseProgram(Option<u32>),
    Uniform2f(Option<u32>, [f32; 2]),
    BindVertexArray(Option<u32>),
    BindArrayBuffer(Option<u32>),
    Upload(usize),
    VertexAttrib {
        index: u32,
        components: i32,
        stride: i32,
        offset: i32,
    },
    EnableAttrib(u32),
    DrawTriangleStrip { first: i32, count: i32 },
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    buffers: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    errors: VecDeque<u32>,
    calls: Vec<Call>,
    fail_link: bool,
    fail_buffer: bool,
    sticky_error: Option<u32>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeGl {
    state: RefCell<State>,
}

impl FakeGl {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Makes every `get_error` return `code`, like a lost context would.
    pub(crate) fn stick_error(&self, code: u32) {
        self.state.borrow_mut().sticky_error = Some(code);
    }

    pub(crate) fn pending_errors(&self) -> usize {
        self.state.borrow().errors.len()
    }

    pub(crate) fn fail_next_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    pub(crate) fn fail_buffers(&self) {
        self.state.borrow_mut().fail_buffer = true;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        let state = self.state.borrow();
        state.buffers.len() + state.vertex_arrays.len()
    }

    pub(crate) fn attached_shaders(&self, program: u32) -> usize {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(0, |p| p.attached.len())
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Accepts anything with a `main` entry point and balanced brackets.
fn compiles(source: &str) -> bool {
    let mut depth = 0_i32;
    for c in source.chars() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0 && source.contains("void main")
}

fn declared_uniforms(source: &str) -> Vec<String> {
    let words: Vec<&str> = source.split_whitespace().collect();
    words
        .windows(3)
        .filter(|w| w[0] == "uniform")
        .map(|w| w[2].trim_end_matches(';').to_string())
        .collect()
}

impl Gl for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = compiles(&s.source);
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.state.borrow().shaders.get(&shader) {
            Some(s) if !s.compiled => {
                format!("0:1(1): error: syntax error in {} shader\n", s.stage)
            }
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.programs.insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let fail = std::mem::take(&mut state.fail_link);
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let stages_ok = attached
            .iter()
            .all(|id| state.shaders.get(id).is_some_and(|s| s.compiled));
        let uniforms = attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .flat_map(|s| declared_uniforms(&s.source))
            .collect();
        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = !fail && stages_ok && attached.len() == 2;
            p.uniforms = uniforms;
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: linking with uncompiled/unspecialized shader\n".to_string()
        }
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let p = state.programs.get(&program).filter(|p| p.linked)?;
        p.uniforms
            .iter()
            .position(|u| u == name)
            .map(|index| program * 100 + index as u32)
    }

    fn uniform_2f(&self, location: Option<&u32>, x: f32, y: f32) {
        self.record(Call::Uniform2f(location.copied(), [x, y]));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_buffer {
            return Err("out of buffer names".to_string());
        }
        let id = state.allocate();
        state.buffers.insert(id);
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer(buffer));
    }

    fn upload_static_array_buffer(&self, data: &[u8]) {
        self.record(Call::Upload(data.len()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32) {
        self.record(Call::VertexAttrib {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::ClearColor(rgba));
    }

    fn clear_color_buffer(&self) {
        self.record(Call::Clear);
    }

    fn enable_framebuffer_srgb(&self) {
        self.record(Call::EnableFramebufferSrgb);
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangleStrip { first, count });
    }

    fn get_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if let Some(code) = state.sticky_error {
            return code;
        }
        state.errors.pop_front().unwrap_or(0)
    }
}
