//! brainmesh-core: brain-structure surfaces from NIfTI probability maps
//!
//! The pipeline has three stages, each a pure function of its inputs:
//!
//! ```text
//! path -> load -> VolumetricImage -> preprocess -> BinaryVolume -> extract -> Mesh
//! ```
//!
//! # Modules
//! - `nifti_io`: NIfTI reading and writing
//! - `loader`: volume loading in voxel-index space
//! - `preprocess`: Gaussian smoothing and thresholding
//! - `surface`: marching cubes, triangle-soup assembly, STL export
//! - `session`: viewer state with cached masks
//! - `config`: TOML pipeline configuration
//! - `utils`: smoothing kernels, connected components, phantoms

// Core types
pub mod error;
pub mod volume;

// Pipeline stages
pub mod loader;
pub mod preprocess;
pub mod surface;

// I/O modules
pub mod nifti_io;

// Application state
pub mod config;
pub mod session;

pub mod utils;

use std::path::Path;

pub use config::{PipelineConfig, Rgb};
pub use error::{PipelineError, PipelineResult};
pub use loader::load;
pub use preprocess::{preprocess, preprocess_with, PreprocessParams};
pub use session::{Hemisphere, Session};
pub use surface::{extract, extract_with, ExtractParams, IsoSurface, Mesh};
pub use volume::{BinaryVolume, Dims, VolumetricImage};

/// Load a probability map and binarize it in one step
pub fn load_and_preprocess<P: AsRef<Path>>(path: P, params: &PreprocessParams) -> PipelineResult<BinaryVolume> {
    let image = load(path)?;
    preprocess_with(&image, params)
}
