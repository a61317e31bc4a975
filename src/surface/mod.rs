//! Surface extraction
//!
//! Marching cubes over a binary structure mask, followed by triangle-soup
//! assembly for the renderer.

mod cases;
pub mod marching_cubes;
pub mod mesh;
pub mod stl;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineResult;
use crate::volume::{BinaryVolume, VolumetricImage};

pub use marching_cubes::{marching_cubes, marching_cubes_with_progress, ScalarField};
pub use mesh::{IsoSurface, Mesh};
pub use stl::{save_stl, write_stl_ascii, write_stl_binary, StlFormat};

/// Parameters for `extract_with`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Isovalue; 0 traces the boundary of the mask's 1-voxels
    pub level: f64,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self { level: 0.0 }
    }
}

/// Extract the surface of `mask` as a triangle soup
///
/// An all-false or all-true mask gives an empty mesh.
///
/// # Errors
/// `Dimension` if any axis of `mask` is shorter than 2 voxels.
pub fn extract(mask: &BinaryVolume, level: f64) -> PipelineResult<Mesh> {
    let surface = marching_cubes(mask, level)?;
    let mesh = Mesh::from_isosurface(&surface);
    debug!(faces = mesh.num_faces(), "assembled triangle soup");
    Ok(mesh)
}

/// `extract` with a parameter struct
pub fn extract_with(mask: &BinaryVolume, params: &ExtractParams) -> PipelineResult<Mesh> {
    extract(mask, params.level)
}

/// Contour a scalar probability map directly, without thresholding
pub fn extract_field(image: &VolumetricImage, level: f64) -> PipelineResult<Mesh> {
    Ok(marching_cubes(image, level)?.to_mesh())
}
