use web_sys::{WebGl2RenderingContext as GL, WebGlVertexArrayObject};

use crate::error::RenderError;

pub struct VertexArray {
    gl: GL,
    pub obj: WebGlVertexArrayObject,
}

impl VertexArray {
    pub fn new(gl: &GL) -> Result<Self, RenderError> {
        let obj = gl
            .create_vertex_array()
            .ok_or(RenderError::BufferAllocation("vertex array"))?;
        Ok(Self {
            gl: gl.clone(),
            obj,
        })
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(&self.obj));
    }

    /// Points `attrib_pos` at the currently bound array buffer.
    pub fn set_attribute(&self, attrib_pos: u32, components: i32, stride: i32, offset: i32) {
        self.bind();
        self.gl.vertex_attrib_pointer_with_i32(
            attrib_pos,
            components,
            GL::FLOAT,
            false,
            stride,
            offset,
        );
        self.gl.enable_vertex_attrib_array(attrib_pos);
    }

    /// Detaches `attrib_pos` from any buffer so the shader reads the
    /// constant attribute value instead.
    pub fn disable_attribute(&self, attrib_pos: u32) {
        self.bind();
        self.gl.disable_vertex_attrib_array(attrib_pos);
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.obj));
    }
}
