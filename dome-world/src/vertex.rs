use crate::error::RenderError;

// vertex data types
pub type Pos = [f32; 3];
pub type Norm = [f32; 3];
pub type Uv = [f32; 2];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Pos,
    pub normal: Norm,
    pub uv: Uv,
}

impl Vertex {
    pub fn new(position: Pos, normal: Norm, uv: Uv) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// One per-vertex channel uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Uv,
    Normal,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [AttributeKind::Position, AttributeKind::Uv, AttributeKind::Normal];

    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position | AttributeKind::Normal => 3,
            AttributeKind::Uv => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Position => "position",
            AttributeKind::Uv => "uv",
            AttributeKind::Normal => "normal",
        }
    }
}

/// Which attribute streams a batch carries. Position is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLayout {
    pub uv: bool,
    pub normal: bool,
}

impl AttributeLayout {
    pub fn contains(&self, kind: AttributeKind) -> bool {
        match kind {
            AttributeKind::Position => true,
            AttributeKind::Uv => self.uv,
            AttributeKind::Normal => self.normal,
        }
    }
}

/// A flat triangle list with separate attribute streams, as handed to the
/// draw primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBatch {
    pub positions: Vec<f32>,
    pub uvs: Option<Vec<f32>>,
    pub normals: Option<Vec<f32>>,
}

impl TriangleBatch {
    pub fn positions_only(positions: Vec<f32>) -> Self {
        Self {
            positions,
            uvs: None,
            normals: None,
        }
    }

    pub fn with_attributes(positions: Vec<f32>, uvs: Vec<f32>, normals: Vec<f32>) -> Self {
        Self {
            positions,
            uvs: Some(uvs),
            normals: Some(normals),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn layout(&self) -> AttributeLayout {
        AttributeLayout {
            uv: self.uvs.is_some(),
            normal: self.normals.is_some(),
        }
    }

    pub fn stream(&self, kind: AttributeKind) -> Option<&[f32]> {
        match kind {
            AttributeKind::Position => Some(&self.positions),
            AttributeKind::Uv => self.uvs.as_deref(),
            AttributeKind::Normal => self.normals.as_deref(),
        }
    }

    /// Checks that the batch is a whole number of triangles and that every
    /// present stream has one entry per vertex.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.positions.len() % 3 != 0 {
            return Err(RenderError::MalformedBatch(format!(
                "{} position floats is not a whole number of vertices",
                self.positions.len()
            )));
        }
        let n = self.vertex_count();
        if n % 3 != 0 {
            return Err(RenderError::MalformedBatch(format!(
                "{} vertices is not a whole number of triangles",
                n
            )));
        }
        for kind in [AttributeKind::Uv, AttributeKind::Normal] {
            if let Some(stream) = self.stream(kind) {
                let expected = n * kind.components();
                if stream.len() != expected {
                    return Err(RenderError::MalformedBatch(format!(
                        "{} stream has {} floats, expected {}",
                        kind.name(),
                        stream.len(),
                        expected
                    )));
                }
            }
        }
        Ok(())
    }
}

/// An owned triangle list. Every three consecutive vertices form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn push_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        self.vertices.extend_from_slice(&[a, b, c]);
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }

    /// Flattens the mesh into a batch carrying all three streams.
    pub fn to_batch(&self) -> TriangleBatch {
        let n = self.vertices.len();
        let mut positions = Vec::with_capacity(n * 3);
        let mut uvs = Vec::with_capacity(n * 2);
        let mut normals = Vec::with_capacity(n * 3);
        for v in &self.vertices {
            positions.extend_from_slice(&v.position);
            uvs.extend_from_slice(&v.uv);
            normals.extend_from_slice(&v.normal);
        }
        TriangleBatch::with_attributes(positions, uvs, normals)
    }

    pub fn positions(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }
}
