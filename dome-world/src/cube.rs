use cgmath::{Matrix4, SquareMatrix};

use crate::draw::DrawTarget;
use crate::error::RenderError;
use crate::frame::Renderable;
use crate::lighting::TextureSelector;
use crate::vertex::{Mesh, Norm, Pos, TriangleBatch, Vertex};

// Each face as two triangles over the unit cube, with its outward normal.
// The front face is the one at z = 0.
const FACES: [([Pos; 6], Norm); 6] = [
    // front
    (
        [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        [0.0, 0.0, -1.0],
    ),
    // back
    (
        [[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        [0.0, 0.0, 1.0],
    ),
    // top
    (
        [[0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        [0.0, 1.0, 0.0],
    ),
    // bottom
    (
        [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        [0.0, -1.0, 0.0],
    ),
    // right
    (
        [[1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
        [1.0, 0.0, 0.0],
    ),
    // left
    (
        [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
        [-1.0, 0.0, 0.0],
    ),
];

const FACE_UVS: [[f32; 2]; 6] = [[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// The 36-vertex unit cube with per-face normals and uvs.
pub fn cube_mesh() -> Mesh {
    let mut mesh = Mesh::with_capacity(12);
    for (corners, normal) in FACES.iter() {
        let v: Vec<Vertex> = corners
            .iter()
            .zip(FACE_UVS.iter())
            .map(|(p, uv)| Vertex::new(*p, *normal, *uv))
            .collect();
        mesh.push_triangle(v[0], v[1], v[2]);
        mesh.push_triangle(v[3], v[4], v[5]);
    }
    mesh
}

/// How a cube is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeMode {
    /// Positions, uvs and normals.
    Full,
    /// Positions only, through the persistent position buffer. The shader
    /// sees the default normal and uv, so only flat solid color is right.
    Fast,
}

pub struct Cube {
    pub matrix: Matrix4<f32>,
    pub color: [f32; 4],
    pub texture: TextureSelector,
    pub mode: CubeMode,
    name: String,
    full: TriangleBatch,
    positions: TriangleBatch,
}

impl Cube {
    pub fn new(name: impl Into<String>) -> Self {
        let mesh = cube_mesh();
        Self {
            matrix: Matrix4::identity(),
            color: [1.0, 1.0, 1.0, 1.0],
            texture: TextureSelector::Solid,
            mode: CubeMode::Full,
            name: name.into(),
            full: mesh.to_batch(),
            positions: TriangleBatch::positions_only(mesh.positions()),
        }
    }

    pub fn with_matrix(mut self, matrix: Matrix4<f32>) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn render_with(
        &self,
        target: &mut dyn DrawTarget,
        matrix: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        target.set_material(self.color, self.texture);
        target.set_model(matrix);
        match self.mode {
            CubeMode::Full => target.submit(&self.full)?,
            CubeMode::Fast => target.submit(&self.positions)?,
        };
        Ok(())
    }
}

impl Renderable for Cube {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&mut self, target: &mut dyn DrawTarget) -> Result<(), RenderError> {
        self.render_with(target, &self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::recording::{Call, RecordingTarget};
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn cube_has_twelve_triangles_in_unit_box() {
        let mesh = cube_mesh();
        assert_eq!(mesh.triangle_count(), 12);
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| *c == 0.0 || *c == 1.0));
        }
    }

    #[test]
    fn normals_point_out_of_their_face() {
        let center = Vector3::new(0.5, 0.5, 0.5);
        for tri in cube_mesh().triangles() {
            let n = Vector3::from(tri[0].normal);
            let centroid = tri
                .iter()
                .map(|v| Vector3::from(v.position))
                .fold(Vector3::new(0.0, 0.0, 0.0), |a, b| a + b)
                / 3.0;
            assert!((centroid - center).dot(n) > 0.0, "normal {:?} points inward", n);
            assert_eq!(n.magnitude(), 1.0);
        }
    }

    #[test]
    fn full_mode_submits_all_streams() {
        let mut cube = Cube::new("ground").with_color([0.3, 0.3, 0.3, 1.0]);
        let mut target = RecordingTarget::default();
        cube.render(&mut target).unwrap();
        assert_eq!(target.materials(), vec![[0.3, 0.3, 0.3, 1.0]]);
        assert_eq!(
            target.calls.last(),
            Some(&Call::Submit { triangles: 12, uv: true, normal: true })
        );
    }

    #[test]
    fn fast_mode_submits_positions_only() {
        let mut cube = Cube::new("marker");
        cube.mode = CubeMode::Fast;
        let mut target = RecordingTarget::default();
        cube.render(&mut target).unwrap();
        assert_eq!(
            target.calls.last(),
            Some(&Call::Submit { triangles: 12, uv: false, normal: false })
        );
    }
}
