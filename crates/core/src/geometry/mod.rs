use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::{diagnostics, gfx::Gl, QuadtoneError, Result};

/// One interleaved vertex: position followed by RGB colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// Corners of the quad in triangle-strip order: 0-1-2 and 1-2-3 share the
/// 1-2 diagonal.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0]),
    Vertex::new([-0.5, 0.5, 0.0], [1.0, 1.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
    Vertex::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
];

/// How one shader input is read out of the interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub index: u32,
    pub components: i32,
    /// Byte offset of the attribute inside a vertex.
    pub offset: i32,
}

/// Attribute bindings for a buffer of uniformly strided vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: i32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout for [`Vertex`]: position at location 0, colour at location 1.
    pub fn position_color() -> Self {
        Self {
            stride: size_of::<Vertex>() as i32,
            attributes: vec![
                VertexAttribute {
                    index: 0,
                    components: 3,
                    offset: offset_of!(Vertex, position) as i32,
                },
                VertexAttribute {
                    index: 1,
                    components: 3,
                    offset: offset_of!(Vertex, color) as i32,
                },
            ],
        }
    }
}

/// Static vertex data uploaded once, plus the vertex array that records its
/// attribute bindings. The vertex count never changes after construction.
#[derive(Debug)]
pub struct GeometryBuffer<G: Gl> {
    vertex_array: G::VertexArray,
    buffer: G::Buffer,
    vertex_count: usize,
    layout: VertexLayout,
}

impl<G: Gl> GeometryBuffer<G> {
    /// Allocates the backing store, uploads `vertices` and registers
    /// `layout` against it.
    pub fn new(gl: &G, vertices: &[Vertex], layout: VertexLayout) -> Result<Self> {
        if vertices.is_empty() {
            return Err(QuadtoneError::msg("geometry needs at least one vertex"));
        }

        let vertex_array = gl
            .create_vertex_array()
            .map_err(|e| QuadtoneError::GlCreate(format!("create_vertex_array failed: {e}")))?;
        let buffer = match gl.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                gl.delete_vertex_array(vertex_array);
                return Err(QuadtoneError::GlCreate(format!("create_buffer failed: {e}")));
            }
        };

        gl.bind_vertex_array(Some(vertex_array));
        gl.bind_array_buffer(Some(buffer));
        gl.upload_static_array_buffer(bytemuck::cast_slice(vertices));
        for attribute in &layout.attributes {
            gl.vertex_attrib_pointer_f32(
                attribute.index,
                attribute.components,
                layout.stride,
                attribute.offset,
            );
            gl.enable_vertex_attrib_array(attribute.index);
        }
        gl.bind_array_buffer(None);
        gl.bind_vertex_array(None);
        diagnostics::check_errors(gl, "upload geometry");

        tracing::debug!(
            vertices = vertices.len(),
            stride = layout.stride,
            "geometry uploaded"
        );
        Ok(Self {
            vertex_array,
            buffer,
            vertex_count: vertices.len(),
            layout,
        })
    }

    /// Uploads [`QUAD_VERTICES`] with the position/colour layout.
    pub fn quad(gl: &G) -> Result<Self> {
        Self::new(gl, &QUAD_VERTICES, VertexLayout::position_color())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn bind(&self, gl: &G) {
        gl.bind_vertex_array(Some(self.vertex_array));
    }

    pub fn unbind(&self, gl: &G) {
        gl.bind_vertex_array(None);
    }

    pub fn release(self, gl: &G) {
        gl.delete_buffer(self.buffer);
        gl.delete_vertex_array(self.vertex_array);
    }
}
