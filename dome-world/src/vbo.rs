use js_sys::Float32Array;
use web_sys::{WebGl2RenderingContext as GL, WebGlBuffer};

use crate::error::RenderError;

pub struct Buffer {
    gl: GL,
    pub obj: WebGlBuffer,
    target: u32,
}

impl Buffer {
    pub fn new(gl: &GL, target: u32, label: &'static str) -> Result<Self, RenderError> {
        let obj = gl
            .create_buffer()
            .ok_or(RenderError::BufferAllocation(label))?;
        Ok(Self {
            gl: gl.clone(),
            obj,
            target,
        })
    }

    pub fn bind(&self) {
        self.gl.bind_buffer(self.target, Some(&self.obj));
    }

    /// Binds the buffer and replaces its contents.
    ///
    /// # Safety
    /// The view aliases wasm memory; nothing may allocate between creating
    /// it and the upload below.
    pub unsafe fn set_data(&self, data: &[f32], usage: u32) {
        self.bind();
        let js_array = Float32Array::view(data);
        self.gl
            .buffer_data_with_array_buffer_view(self.target, &js_array, usage);
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.gl.delete_buffer(Some(&self.obj));
    }
}
