//! Procedural dome mesh: a latitude/longitude tessellated polar cap whose
//! rim is pulled in and flattened so the shell has no sharp edge.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use cgmath::{Matrix4, SquareMatrix};

use crate::draw::DrawTarget;
use crate::error::{GeometryError, RenderError};
use crate::frame::Renderable;
use crate::lighting::TextureSelector;
use crate::vertex::{Mesh, Pos, TriangleBatch, Vertex};

/// Polar progress past which the rim morph kicks in.
const MORPH_START: f32 = 0.7;
/// Horizontal extent lost at full polar progress.
const MAX_FADE: f32 = 0.4;
/// Vertical extent lost at full polar progress.
const MAX_SQUISH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomeParams {
    pub segments: u32,
    pub radius: f32,
    pub max_theta: f32,
}

impl Default for DomeParams {
    fn default() -> Self {
        Self {
            segments: 30,
            radius: 0.5,
            max_theta: PI * 0.7,
        }
    }
}

impl DomeParams {
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.segments < 2 || self.segments % 2 != 0 {
            return Err(GeometryError::InvalidSegments(self.segments));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(self.radius));
        }
        if !(self.max_theta > 0.0 && self.max_theta <= PI) {
            return Err(GeometryError::InvalidMaxTheta(self.max_theta));
        }
        Ok(())
    }

    /// Number of triangles a tessellation of these parameters produces.
    pub fn triangle_count(&self) -> usize {
        let s = self.segments as usize;
        s * (s / 2) * 2
    }

    fn cache_key(&self) -> (u32, u32, u32) {
        (self.segments, self.radius.to_bits(), self.max_theta.to_bits())
    }
}

pub fn spherical_to_cartesian(theta: f32, phi: f32, r: f32) -> Pos {
    [
        r * theta.sin() * phi.cos(),
        r * theta.cos(),
        r * theta.sin() * phi.sin(),
    ]
}

/// Rim deformation for normalized polar progress `t = theta / (pi/2)`.
///
/// Returns `(fade, squish)`: the factors applied to the horizontal (x, z)
/// and vertical (y) extent. Both are 1 up to `t = 0.7`, fall linearly to
/// 0.6 and 0.5 at `t = 1` and hold there for caps reaching past the equator.
pub fn pole_morph(t: f32) -> (f32, f32) {
    if t <= MORPH_START {
        return (1.0, 1.0);
    }
    let u = ((t - MORPH_START) / (1.0 - MORPH_START)).min(1.0);
    (1.0 - MAX_FADE * u, 1.0 - MAX_SQUISH * u)
}

/// One grid corner: morphed position, pre-morph unit normal and uv.
fn corner(params: &DomeParams, theta: f32, phi: f32) -> Vertex {
    let [x, y, z] = spherical_to_cartesian(theta, phi, params.radius);
    let normal = spherical_to_cartesian(theta, phi, 1.0);
    let (fade, squish) = pole_morph(theta / FRAC_PI_2);
    Vertex::new(
        [x * fade, y * squish, z * fade],
        normal,
        [phi / TAU, (theta / params.max_theta).min(1.0)],
    )
}

/// Generates the dome triangle list.
///
/// The azimuth runs over `segments` columns whose last edge lands exactly on
/// 2pi, so the ring is closed with no duplicated or missing wedge.
pub fn tessellate(params: &DomeParams) -> Result<Mesh, GeometryError> {
    params.validate()?;

    let seg = params.segments;
    let bands = seg / 2;
    let mut mesh = Mesh::with_capacity(params.triangle_count());

    for i in 0..bands {
        let theta1 = i as f32 * params.max_theta / bands as f32;
        let theta2 = (i + 1) as f32 * params.max_theta / bands as f32;

        for j in 0..seg {
            let phi1 = j as f32 * TAU / seg as f32;
            let phi2 = if j + 1 == seg {
                TAU
            } else {
                (j + 1) as f32 * TAU / seg as f32
            };

            let p1 = corner(params, theta1, phi1);
            let p2 = corner(params, theta2, phi1);
            let p3 = corner(params, theta1, phi2);
            let p4 = corner(params, theta2, phi2);

            mesh.push_triangle(p1, p2, p4);
            mesh.push_triangle(p1, p4, p3);
        }
    }

    Ok(mesh)
}

/// Keeps the last tessellation, and its flattened batch, and regenerates
/// only when parameters change.
#[derive(Debug, Default)]
pub struct DomeMeshCache {
    key: Option<(u32, u32, u32)>,
    mesh: Mesh,
    batch: TriangleBatch,
}

impl DomeMeshCache {
    pub fn get(&mut self, params: &DomeParams) -> Result<&Mesh, GeometryError> {
        self.refresh(params)?;
        Ok(&self.mesh)
    }

    /// The cached mesh as a ready-to-submit batch.
    pub fn batch(&mut self, params: &DomeParams) -> Result<&TriangleBatch, GeometryError> {
        self.refresh(params)?;
        Ok(&self.batch)
    }

    fn refresh(&mut self, params: &DomeParams) -> Result<(), GeometryError> {
        let key = params.cache_key();
        if self.key != Some(key) {
            self.mesh = tessellate(params)?;
            self.batch = self.mesh.to_batch();
            self.key = Some(key);
            log::debug!(
                "dome tessellated: {} segments, {} triangles",
                params.segments,
                self.mesh.triangle_count()
            );
        }
        Ok(())
    }

    pub fn is_cached(&self, params: &DomeParams) -> bool {
        self.key == Some(params.cache_key())
    }
}

pub struct Dome {
    pub matrix: Matrix4<f32>,
    pub color: [f32; 4],
    pub texture: TextureSelector,
    pub params: DomeParams,
    cache: DomeMeshCache,
}

impl Dome {
    pub fn new(params: DomeParams) -> Self {
        Self {
            matrix: Matrix4::identity(),
            color: [1.0, 1.0, 1.0, 1.0],
            texture: TextureSelector::Solid,
            params,
            cache: DomeMeshCache::default(),
        }
    }

    /// Issues the dome with an explicit transform, used when the dome is a
    /// part inside a larger model.
    pub fn render_with(
        &mut self,
        target: &mut dyn DrawTarget,
        matrix: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        let batch = self.cache.batch(&self.params)?;
        target.set_material(self.color, self.texture);
        target.set_model(matrix);
        target.submit(batch)?;
        Ok(())
    }
}

impl Renderable for Dome {
    fn name(&self) -> &str {
        "dome"
    }

    fn render(&mut self, target: &mut dyn DrawTarget) -> Result<(), RenderError> {
        let matrix = self.matrix;
        self.render_with(target, &matrix)
    }
}
