//! The single draw primitive every shape goes through, and the WebGL target
//! that implements it.

use std::collections::HashMap;

use cgmath::Matrix4;
use web_sys::WebGl2RenderingContext as GL;

use crate::error::RenderError;
use crate::lighting::{LightingUniforms, TextureSelector};
use crate::matrix::{matrix4_to_array, normal_matrix};
use crate::shader::{attribute_location, ShaderProgram};
use crate::vao::VertexArray;
use crate::vbo::Buffer;
use crate::vertex::{AttributeKind, TriangleBatch};

/// Constant normal fed to the shader when a batch carries none.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
/// Constant uv fed to the shader when a batch carries none.
pub const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Everything the frame loop and the shapes need from the GPU.
pub trait DrawTarget {
    fn set_camera(
        &mut self,
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
        global_rotation: &Matrix4<f32>,
    );

    fn clear(&mut self);

    fn set_lighting(&mut self, uniforms: &LightingUniforms);

    fn set_material(&mut self, color: [f32; 4], texture: TextureSelector);

    /// Uploads the model matrix together with its normal matrix.
    fn set_model(&mut self, model: &Matrix4<f32>);

    /// Draws the batch as a triangle list and returns the triangle count.
    fn submit(&mut self, batch: &TriangleBatch) -> Result<usize, RenderError>;
}

/// Uploads triangle batches through one vertex array and a pool of dynamic
/// buffers, one per attribute kind. Buffers are created on first use and
/// rewritten on every submit.
pub struct BatchSubmitter {
    gl: GL,
    vao: VertexArray,
    buffers: HashMap<AttributeKind, Buffer>,
}

impl BatchSubmitter {
    pub fn new(gl: &GL) -> Result<Self, RenderError> {
        Ok(Self {
            gl: gl.clone(),
            vao: VertexArray::new(gl)?,
            buffers: HashMap::new(),
        })
    }

    pub fn submit(&mut self, batch: &TriangleBatch) -> Result<usize, RenderError> {
        batch.validate()?;
        let count = batch.vertex_count();
        if count == 0 {
            return Ok(0);
        }

        self.vao.bind();
        for kind in AttributeKind::ALL {
            let location = attribute_location(kind);
            match batch.stream(kind) {
                Some(data) => {
                    if !self.buffers.contains_key(&kind) {
                        let buffer = Buffer::new(&self.gl, GL::ARRAY_BUFFER, kind.name())?;
                        self.buffers.insert(kind, buffer);
                    }
                    let buffer = &self.buffers[&kind];
                    unsafe { buffer.set_data(data, GL::DYNAMIC_DRAW) };
                    self.vao
                        .set_attribute(location, kind.components() as i32, 0, 0);
                }
                None => {
                    self.vao.disable_attribute(location);
                    match kind {
                        AttributeKind::Uv => {
                            self.gl.vertex_attrib2f(location, DEFAULT_UV[0], DEFAULT_UV[1])
                        }
                        AttributeKind::Normal => self.gl.vertex_attrib3f(
                            location,
                            DEFAULT_NORMAL[0],
                            DEFAULT_NORMAL[1],
                            DEFAULT_NORMAL[2],
                        ),
                        AttributeKind::Position => {}
                    }
                }
            }
        }

        self.gl.draw_arrays(GL::TRIANGLES, 0, count as i32);
        Ok(count / 3)
    }
}

pub struct WebGlTarget {
    gl: GL,
    shader: ShaderProgram,
    submitter: BatchSubmitter,
    clear_color: [f32; 4],
}

impl WebGlTarget {
    pub fn new(gl: GL, shader: ShaderProgram, clear_color: [f32; 4]) -> Result<Self, RenderError> {
        let submitter = BatchSubmitter::new(&gl)?;
        gl.enable(GL::DEPTH_TEST);
        gl.depth_func(GL::LESS);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        Ok(Self {
            gl,
            shader,
            submitter,
            clear_color,
        })
    }
}

impl DrawTarget for WebGlTarget {
    fn set_camera(
        &mut self,
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
        global_rotation: &Matrix4<f32>,
    ) {
        let u = &self.shader.uniforms;
        self.gl.use_program(Some(&self.shader.program));
        self.gl.uniform_matrix4fv_with_f32_array(
            u.projection.as_ref(),
            false,
            &matrix4_to_array(projection),
        );
        self.gl
            .uniform_matrix4fv_with_f32_array(u.view.as_ref(), false, &matrix4_to_array(view));
        self.gl.uniform_matrix4fv_with_f32_array(
            u.global_rotate.as_ref(),
            false,
            &matrix4_to_array(global_rotation),
        );
    }

    fn clear(&mut self) {
        let [r, g, b, a] = self.clear_color;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    fn set_lighting(&mut self, l: &LightingUniforms) {
        let u = &self.shader.uniforms;
        let gl = &self.gl;
        gl.uniform3fv_with_f32_array(u.camera_pos.as_ref(), &l.camera_pos);
        gl.uniform3fv_with_f32_array(u.light_pos.as_ref(), &l.light_pos);
        gl.uniform3fv_with_f32_array(u.light_color.as_ref(), &l.light_color);
        gl.uniform1i(u.light_on.as_ref(), l.light_on as i32);
        gl.uniform1i(u.normal_visualization.as_ref(), l.normal_visualization as i32);
        gl.uniform1i(u.spotlight_on.as_ref(), l.spotlight_on as i32);
        gl.uniform3fv_with_f32_array(u.spotlight_dir.as_ref(), &l.spotlight_dir);
        gl.uniform1f(u.spotlight_cutoff.as_ref(), l.spotlight_cutoff);
    }

    fn set_material(&mut self, color: [f32; 4], texture: TextureSelector) {
        let u = &self.shader.uniforms;
        self.gl
            .uniform1i(u.which_texture.as_ref(), texture.as_uniform());
        self.gl
            .uniform4f(u.frag_color.as_ref(), color[0], color[1], color[2], color[3]);
    }

    fn set_model(&mut self, model: &Matrix4<f32>) {
        let u = &self.shader.uniforms;
        self.gl
            .uniform_matrix4fv_with_f32_array(u.model.as_ref(), false, &matrix4_to_array(model));
        self.gl.uniform_matrix4fv_with_f32_array(
            u.normal.as_ref(),
            false,
            &matrix4_to_array(&normal_matrix(model)),
        );
    }

    fn submit(&mut self, batch: &TriangleBatch) -> Result<usize, RenderError> {
        self.submitter.submit(batch)
    }
}
