//! Common test utilities for brainmesh-core integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use brainmesh_core::nifti_io::save_nifti_to_file;
use brainmesh_core::{BinaryVolume, Dims, IsoSurface, Mesh, VolumetricImage};

pub const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Write `image` as a float32 NIfTI under the temp dir and return its path
pub fn write_fixture(name: &str, image: &VolumetricImage) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    save_nifti_to_file(&path, image.data(), image.dims(), (1.0, 1.0, 1.0), &IDENTITY)
        .expect("fixture should be writable");
    path
}

/// Deterministic pseudo-random mask (xorshift), with roughly `density` foreground
pub fn noise_mask(dims: Dims, seed: u64, density: f64, clear_border: bool) -> BinaryVolume {
    let mut state = seed.max(1);
    let (nx, ny, nz) = dims;
    BinaryVolume::from_fn(dims, |x, y, z| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let on_border = x == 0 || y == 0 || z == 0 || x == nx - 1 || y == ny - 1 || z == nz - 1;
        if clear_border && on_border {
            return false;
        }
        (state % 10_000) as f64 / 10_000.0 < density
    })
    .expect("dims are valid")
}

/// Every directed edge a→b is matched by the same number of b→a
///
/// Holds for any consistently oriented surface without boundary.
pub fn is_balanced(surface: &IsoSurface) -> bool {
    let mut directed: HashMap<(usize, usize), i64> = HashMap::new();
    for f in &surface.faces {
        for i in 0..3 {
            let (a, b) = (f[i], f[(i + 1) % 3]);
            *directed.entry((a, b)).or_insert(0) += 1;
            *directed.entry((b, a)).or_insert(0) -= 1;
        }
    }
    directed.values().all(|&n| n == 0)
}

/// Every undirected edge is shared by exactly two faces
pub fn is_two_manifold(surface: &IsoSurface) -> bool {
    let mut undirected: HashMap<(usize, usize), usize> = HashMap::new();
    for f in &surface.faces {
        for i in 0..3 {
            let (a, b) = (f[i], f[(i + 1) % 3]);
            *undirected.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    undirected.values().all(|&n| n == 2)
}

/// Number of distinct undirected edges
pub fn edge_count(surface: &IsoSurface) -> usize {
    let mut edges = std::collections::HashSet::new();
    for f in &surface.faces {
        for i in 0..3 {
            let (a, b) = (f[i], f[(i + 1) % 3]);
            edges.insert((a.min(b), a.max(b)));
        }
    }
    edges.len()
}

/// All triangle coordinates lie within `[0, dim - 1]` per axis
pub fn within_grid(mesh: &Mesh, dims: Dims) -> bool {
    let limits = [dims.0 as f32 - 1.0, dims.1 as f32 - 1.0, dims.2 as f32 - 1.0];
    mesh.vertices()
        .all(|v| (0..3).all(|i| v[i] >= 0.0 && v[i] <= limits[i]))
}
