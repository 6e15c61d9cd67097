use crate::{
    gfx::{Gl, ShaderStage},
    QuadtoneError, Result,
};

/// Largest diagnostic log carried into an error, in bytes.
pub const INFO_LOG_LIMIT: usize = 1024;

/// Name of the `vec2` uniform that offsets the quad in clip space.
pub const OFFSET_UNIFORM: &str = "model_offset";

/// Vertex stage for the quad: offsets every position by [`OFFSET_UNIFORM`].
pub const QUAD_VERTEX_SHADER: &str = "#version 410 core
layout(location = 0) in vec3 position;
layout(location = 1) in vec3 color;
out vec3 frag_color;
uniform vec2 model_offset;
void main() {
    frag_color = color;
    gl_Position = vec4(position + vec3(model_offset, 0.0), 1.0);
}
";

/// Fragment stage for the quad: passes the interpolated vertex colour through.
pub const QUAD_FRAGMENT_SHADER: &str = "#version 410 core
in vec3 frag_color;
out vec4 result;
void main() {
    result = vec4(frag_color, 1.0);
}
";

/// A linked, usable graphics program.
///
/// Only [`ShaderProgram::build`] produces one, so holding a value means the
/// link succeeded. The stage objects it was built from are already gone.
#[derive(Debug)]
pub struct ShaderProgram<G: Gl> {
    handle: G::Program,
}

impl<G: Gl> ShaderProgram<G> {
    /// Compiles both stages, links them and releases the stage objects.
    ///
    /// Every exit path releases what it created: a failed fragment compile
    /// deletes the vertex stage too, and a failed link deletes the program
    /// along with both stages.
    pub fn build(gl: &G, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(message) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                return Err(QuadtoneError::GlCreate(format!(
                    "create_program failed: {message}"
                )));
            }
        };
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        let linked = gl.program_link_status(program);

        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if !linked {
            let log = bounded_log(gl.program_info_log(program));
            gl.delete_program(program);
            tracing::error!(%log, "shader program failed to link");
            return Err(QuadtoneError::ProgramLink { log });
        }

        tracing::debug!(?program, "shader program linked");
        Ok(Self { handle: program })
    }

    /// Builds the quad program from [`QUAD_VERTEX_SHADER`] and
    /// [`QUAD_FRAGMENT_SHADER`].
    pub fn quad(gl: &G) -> Result<Self> {
        Self::build(gl, QUAD_VERTEX_SHADER, QUAD_FRAGMENT_SHADER)
    }

    pub fn handle(&self) -> G::Program {
        self.handle
    }

    pub fn activate(&self, gl: &G) {
        gl.use_program(Some(self.handle));
    }

    pub fn deactivate(&self, gl: &G) {
        gl.use_program(None);
    }

    pub fn uniform_location(&self, gl: &G, name: &str) -> Option<G::UniformLocation> {
        gl.uniform_location(self.handle, name)
    }

    /// Deletes the program. Consumes the handle so it cannot be used again.
    pub fn release(self, gl: &G) {
        gl.delete_program(self.handle);
    }
}

fn compile_stage<G: Gl>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader> {
    let shader = gl
        .create_shader(stage)
        .map_err(|e| QuadtoneError::GlCreate(format!("create_shader({stage}) failed: {e}")))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.shader_compile_status(shader) {
        let log = bounded_log(gl.shader_info_log(shader));
        gl.delete_shader(shader);
        tracing::error!(%stage, %log, "shader stage failed to compile");
        return Err(QuadtoneError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Caps a driver log at [`INFO_LOG_LIMIT`] bytes and guarantees it is not
/// empty, so a failure always carries some text.
fn bounded_log(log: String) -> String {
    let mut log = log;
    if log.len() > INFO_LOG_LIMIT {
        let mut end = INFO_LOG_LIMIT;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    let trimmed = log.trim_end_matches(['\0', '\n', '\r', ' ']);
    if trimmed.is_empty() {
        "driver returned an empty log".to_string()
    } else {
        trimmed.to_string()
    }
}
