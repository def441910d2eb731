use bytemuck::{Pod, Zeroable};

use super::MeshError;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Red/green/blue triangle in clip space.
    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                Vertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0]),
                Vertex::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
                Vertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
            ],
            indices: vec![0, 1, 2],
        }
    }

    /// Unit cube centred on the origin, one flat colour per face.
    pub fn cube() -> Self {
        // (corners, CCW seen from outside; face colour)
        const FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
            // +Z
            (
                [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
                [1.0, 0.3, 0.3],
            ),
            // -Z
            (
                [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]],
                [0.3, 1.0, 0.3],
            ),
            // +X
            (
                [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
                [0.3, 0.3, 1.0],
            ),
            // -X
            (
                [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]],
                [1.0, 1.0, 0.3],
            ),
            // +Y
            (
                [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
                [0.3, 1.0, 1.0],
            ),
            // -Y
            (
                [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
                [1.0, 0.3, 1.0],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (corners, color) in FACES {
            let base = vertices.len() as u32;
            vertices.extend(corners.iter().map(|&p| Vertex::new(p, color)));
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn builtins_satisfy_mesh_invariants() {
        for mesh in [Mesh::triangle(), Mesh::cube()] {
            let rebuilt = Mesh::new(mesh.vertices.clone(), mesh.indices.clone()).unwrap();
            assert_eq!(rebuilt, mesh);
        }
    }

    #[test]
    fn cube_has_24_vertices_and_12_triangles() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices().len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube
            .vertices()
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = Mesh::cube();
        for tri in cube.indices().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(cube.vertices()[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn rejects_empty_index_list() {
        assert_eq!(Mesh::new(vec![], vec![]), Err(MeshError::Empty));
    }

    #[test]
    fn rejects_partial_triangles() {
        let verts = Mesh::triangle().vertices().to_vec();
        assert_eq!(Mesh::new(verts, vec![0, 1]), Err(MeshError::NotTriangles(2)));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let verts = Mesh::triangle().vertices().to_vec();
        assert_eq!(
            Mesh::new(verts, vec![0, 1, 3]),
            Err(MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );
    }
}
