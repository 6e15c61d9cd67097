use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
pub(crate) mod fake;

/// Programmable pipeline stage a shader object is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// The graphics capability surface the core consumes.
///
/// This is the narrow slice of an OpenGL 4.1 core context that the program
/// builder, the geometry buffer and the frame loop need. The desktop binary
/// implements it over `glow`; tests use a recording fake. Implementations are
/// expected to be called from the thread that owns the current context.
///
/// Object constructors return `Err` with the backend's message when the
/// driver cannot allocate a name. Every other call is fire-and-forget: errors
/// are queued on the backend and read back through [`Gl::get_error`].
pub trait Gl {
    type Shader: Copy + fmt::Debug + PartialEq;
    type Program: Copy + fmt::Debug + PartialEq;
    type Buffer: Copy + fmt::Debug + PartialEq;
    type VertexArray: Copy + fmt::Debug + PartialEq;
    type UniformLocation: Clone + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    /// Binds `program` for subsequent draws, or unbinds with `None`.
    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    /// Uploads a `vec2` to the currently bound program. `None` is a no-op on
    /// the GPU side, matching a location of `-1` in GL.
    fn uniform_2f(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Uploads `data` into the bound array buffer with a static-draw hint.
    fn upload_static_array_buffer(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// Declares a non-normalised float attribute sourced from the bound
    /// array buffer. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, index: u32);

    fn clear_color(&self, rgba: [f32; 4]);
    /// Clears the colour buffer of the default framebuffer.
    fn clear_color_buffer(&self);
    fn enable_framebuffer_srgb(&self);
    fn draw_triangle_strip(&self, first: i32, count: i32);

    /// Pops the oldest pending error code, `0` when none is queued.
    fn get_error(&self) -> u32;
}
