//! Marching cubes isosurface extraction
//!
//! Reference:
//! Lorensen, W.E., Cline, H.E. (1987). "Marching cubes: A high resolution 3D
//! surface construction algorithm." SIGGRAPH Comput. Graph. 21(4):163-169.
//! https://doi.org/10.1145/37402.37422

use std::collections::HashMap;

use tracing::debug;

use super::cases::{case_triangles, CORNERS, EDGES};
use super::mesh::{compute_vertex_normals, IsoSurface};
use crate::error::{PipelineError, PipelineResult};
use crate::volume::{idx3d, BinaryVolume, Dims, VolumetricImage};

/// Scalar samples on a regular grid
pub trait ScalarField {
    fn dims(&self) -> Dims;

    /// Sample at grid point (x, y, z)
    fn value(&self, x: usize, y: usize, z: usize) -> f64;
}

impl ScalarField for BinaryVolume {
    fn dims(&self) -> Dims {
        BinaryVolume::dims(self)
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        if self.get(x, y, z) { 1.0 } else { 0.0 }
    }
}

impl ScalarField for VolumetricImage {
    fn dims(&self) -> Dims {
        VolumetricImage::dims(self)
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.get(x, y, z)
    }
}

/// Extract the `level` isosurface of `field`
///
/// A grid point is inside when its value is strictly greater than `level`.
/// Vertices sit on crossed grid edges, linearly interpolated, and are shared
/// by all cubes touching that edge.
/// NaN samples count as outside; edges touching them get a midpoint vertex.
///
/// # Errors
/// * `Dimension` if any axis has fewer than 2 samples
/// * `Value` if `level` is not finite
pub fn marching_cubes<F>(field: &F, level: f64) -> PipelineResult<IsoSurface>
where
    F: ScalarField + ?Sized,
{
    marching_cubes_with_progress(field, level, |_, _| {})
}

/// Marching cubes with a progress callback
///
/// `progress_callback(done, total)` is called after every z-slab of cubes;
/// the final call has `done == total`.
pub fn marching_cubes_with_progress<F, P>(
    field: &F,
    level: f64,
    mut progress_callback: P,
) -> PipelineResult<IsoSurface>
where
    F: ScalarField + ?Sized,
    P: FnMut(usize, usize),
{
    let dims = field.dims();
    let (nx, ny, nz) = dims;
    if nx < 2 || ny < 2 || nz < 2 {
        return Err(PipelineError::Dimension(format!(
            "Isosurface extraction needs at least 2 voxels per axis, got {}x{}x{}",
            nx, ny, nz
        )));
    }
    if !level.is_finite() {
        return Err(PipelineError::Value(format!("level must be finite, got {}", level)));
    }

    let mut vertices: Vec<[f64; 3]> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    // key: grid index of the edge's lower end * 3 + axis
    let mut edge_vertices: HashMap<usize, usize> = HashMap::new();

    let total_slabs = nz - 1;
    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                let mut corner_values = [0.0f64; 8];
                let mut case = 0u8;
                for (c, offset) in CORNERS.iter().enumerate() {
                    let v = field.value(x + offset[0], y + offset[1], z + offset[2]);
                    corner_values[c] = v;
                    if v > level {
                        case |= 1 << c;
                    }
                }
                if case == 0 || case == 255 {
                    continue;
                }

                let mut cube_vertices = [usize::MAX; 12];
                for triangle in case_triangles(case) {
                    let mut face = [0usize; 3];
                    for (slot, &edge) in face.iter_mut().zip(triangle.iter()) {
                        let edge = edge as usize;
                        if cube_vertices[edge] == usize::MAX {
                            let (a, b) = EDGES[edge];
                            let pa = CORNERS[a];
                            let pb = CORNERS[b];
                            let axis = (0..3).find(|&i| pa[i] != pb[i]).unwrap_or(0);
                            let origin = [x + pa[0], y + pa[1], z + pa[2]];
                            let key = idx3d(origin[0], origin[1], origin[2], dims) * 3 + axis;

                            cube_vertices[edge] = *edge_vertices.entry(key).or_insert_with(|| {
                                let (va, vb) = (corner_values[a], corner_values[b]);
                                let mut position = [origin[0] as f64, origin[1] as f64, origin[2] as f64];
                                position[axis] += interpolate(va, vb, level);
                                vertices.push(position);
                                values.push(va.max(vb));
                                vertices.len() - 1
                            });
                        }
                        *slot = cube_vertices[edge];
                    }
                    faces.push(face);
                }
            }
        }
        progress_callback(z + 1, total_slabs);
    }

    let normals = compute_vertex_normals(&vertices, &faces);
    debug!(
        level,
        vertices = vertices.len(),
        faces = faces.len(),
        "marching cubes complete"
    );

    Ok(IsoSurface {
        vertices,
        faces,
        normals,
        values,
    })
}

/// Fraction along the edge from `va` to `vb` where the field equals `level`
#[inline]
fn interpolate(va: f64, vb: f64, level: f64) -> f64 {
    let denom = vb - va;
    if denom.abs() < f64::EPSILON {
        return 0.5;
    }
    let t = (level - va) / denom;
    // NaN or infinite samples give an undefined crossing
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.5
    }
}
