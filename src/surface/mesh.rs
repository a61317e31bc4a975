//! Surface mesh types
//!
//! `IsoSurface` is the indexed output of marching cubes; `Mesh` is the
//! triangle soup handed to renderers, with every triangle owning its three
//! vertex positions.

/// Indexed isosurface: shared vertices plus per-vertex attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IsoSurface {
    /// Vertex positions in voxel-index space (x, y, z)
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as indices into `vertices`
    pub faces: Vec<[usize; 3]>,
    /// Outward unit normal at each vertex
    pub normals: Vec<[f64; 3]>,
    /// Largest field value at the two ends of each vertex's cube edge
    pub values: Vec<f64>,
}

impl IsoSurface {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Copy each face's vertices into a triangle soup
    pub fn to_mesh(&self) -> Mesh {
        Mesh::from_isosurface(self)
    }

    /// Mean edge length in voxels (1.0 for an empty surface)
    pub fn mean_edge_length(&self) -> f64 {
        compute_mean_edge_length(&self.vertices, &self.faces)
    }
}

/// Triangle soup in voxel-index space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<[[f32; 3]; 3]>,
}

impl Mesh {
    pub fn new(triangles: Vec<[[f32; 3]; 3]>) -> Self {
        Self { triangles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a triangle soup from indexed faces
    pub fn from_isosurface(surface: &IsoSurface) -> Self {
        let to_f32 = |v: [f64; 3]| [v[0] as f32, v[1] as f32, v[2] as f32];
        let triangles = surface
            .faces
            .iter()
            .map(|&[a, b, c]| {
                [
                    to_f32(surface.vertices[a]),
                    to_f32(surface.vertices[b]),
                    to_f32(surface.vertices[c]),
                ]
            })
            .collect();
        Self { triangles }
    }

    pub fn triangles(&self) -> &[[[f32; 3]; 3]] {
        &self.triangles
    }

    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All vertex positions, three per triangle
    pub fn vertices(&self) -> impl Iterator<Item = &[f32; 3]> + '_ {
        self.triangles.iter().flat_map(|t| t.iter())
    }

    pub fn into_triangles(self) -> Vec<[[f32; 3]; 3]> {
        self.triangles
    }

    /// Axis-aligned bounding box `(min, max)`, `None` when empty
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut vertices = self.vertices();
        let first = *vertices.next()?;
        let (mut min, mut max) = (first, first);
        for v in vertices {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        Some((min, max))
    }

    /// Enclosed volume by the divergence theorem (meaningful for closed meshes)
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|v| [v[0] as f64, v[1] as f64, v[2] as f64]);
                let cross = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]
            })
            .sum::<f64>()
            / 6.0
    }
}

/// Unit normal of a triangle from its winding, zero if degenerate
pub fn triangle_normal(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> [f64; 3] {
    let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let norm = (n[0].powi(2) + n[1].powi(2) + n[2].powi(2)).sqrt();
    if norm > 1e-10 {
        [n[0] / norm, n[1] / norm, n[2] / norm]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Compute vertex normals by averaging the unit normals of adjacent faces
pub fn compute_vertex_normals(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> Vec<[f64; 3]> {
    let mut normals: Vec<[f64; 3]> = vec![[0.0, 0.0, 0.0]; vertices.len()];

    for &[i0, i1, i2] in faces {
        let face_normal = triangle_normal(vertices[i0], vertices[i1], vertices[i2]);
        for &idx in &[i0, i1, i2] {
            normals[idx][0] += face_normal[0];
            normals[idx][1] += face_normal[1];
            normals[idx][2] += face_normal[2];
        }
    }

    for n in normals.iter_mut() {
        let norm = (n[0].powi(2) + n[1].powi(2) + n[2].powi(2)).sqrt();
        if norm > 1e-10 {
            n[0] /= norm;
            n[1] /= norm;
            n[2] /= norm;
        }
    }

    normals
}

/// Mean edge length over all face edges
pub fn compute_mean_edge_length(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> f64 {
    let mut total_length = 0.0;
    let mut count = 0;

    for &[i0, i1, i2] in faces {
        for &(a, b) in &[(i0, i1), (i1, i2), (i2, i0)] {
            let dx = vertices[b][0] - vertices[a][0];
            let dy = vertices[b][1] - vertices[a][1];
            let dz = vertices[b][2] - vertices[a][2];
            total_length += (dx * dx + dy * dy + dz * dz).sqrt();
            count += 1;
        }
    }

    if count > 0 {
        total_length / count as f64
    } else {
        1.0
    }
}
