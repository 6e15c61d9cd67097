use glow::HasContext;
use quadtone_core::{Gl, ShaderStage};

/// [`Gl`] over a loaded `glow` context.
///
/// Every `glow` call is `unsafe` because it dereferences driver function
/// pointers. The wrapper is only constructed by [`super::Display`] right after
/// the context is made current, and the display keeps that context current
/// for as long as this value lives, which is the invariant those calls need.
pub struct GlowGl {
    context: glow::Context,
}

impl GlowGl {
    pub(super) fn new(context: glow::Context) -> Self {
        Self { context }
    }

    pub fn version(&self) -> String {
        let version = self.context.version();
        format!(
            "{}.{} {}",
            version.major, version.minor, version.vendor_info
        )
    }
}

impl std::fmt::Debug for GlowGl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowGl").finish_non_exhaustive()
    }
}

impl Gl for GlowGl {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Buffer = glow::NativeBuffer;
    type VertexArray = glow::NativeVertexArray;
    type UniformLocation = glow::NativeUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.context.create_shader(kind) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.context.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.context.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.context.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.context.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn uniform_2f(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32) {
        unsafe { self.context.uniform_2_f32(location, x, y) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.context.create_buffer() }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.context.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn upload_static_array_buffer(&self, data: &[u8]) {
        unsafe {
            self.context
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.context.delete_buffer(buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.context.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.context.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.context.delete_vertex_array(vertex_array) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            self.context
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, stride, offset)
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.context.enable_vertex_attrib_array(index) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { self.context.clear_color(r, g, b, a) }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.context.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn enable_framebuffer_srgb(&self) {
        unsafe { self.context.enable(glow::FRAMEBUFFER_SRGB) }
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        unsafe { self.context.draw_arrays(glow::TRIANGLE_STRIP, first, count) }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.context.get_error() }
    }
}
