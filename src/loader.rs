//! Volume loading
//!
//! Reads a probability map from disk into voxel-index space. Spacing and
//! orientation metadata are discarded.

use std::path::Path;

use tracing::debug;

use crate::error::PipelineResult;
use crate::nifti_io::read_nifti_file;
use crate::volume::VolumetricImage;

/// Load a 3D scalar field from a `.nii` or `.nii.gz` file
///
/// # Errors
/// * `NotFound` if the path does not exist or cannot be read
/// * `Format` if the file is not a single 3D NIfTI volume
pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<VolumetricImage> {
    let path = path.as_ref();
    let nifti = read_nifti_file(path)?;
    debug!(path = %path.display(), dims = ?nifti.dims, "volume loaded");
    nifti.into_image()
}
