//! Smoothing and thresholding
//!
//! Turns a probability map into a binary structure mask: an isotropic
//! Gaussian removes voxel noise, then every voxel strictly above `cutoff`
//! becomes foreground. No rescaling is applied, so `cutoff` is compared
//! against the data's native scale.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::utils::gaussian::gaussian_smooth_3d;
use crate::volume::{BinaryVolume, VolumetricImage};

/// Parameters for `preprocess_with`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Gaussian standard deviation in voxels (0 disables smoothing)
    pub sigma: f64,
    /// Foreground iff smoothed value > cutoff
    pub cutoff: f64,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            sigma: 0.5,
            cutoff: 0.5,
        }
    }
}

impl PreprocessParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(PipelineError::Value(format!(
                "sigma must be a finite value >= 0, got {}",
                self.sigma
            )));
        }
        if !self.cutoff.is_finite() {
            return Err(PipelineError::Value(format!("cutoff must be finite, got {}", self.cutoff)));
        }
        Ok(())
    }
}

/// Smooth `image` with a Gaussian of width `sigma` and threshold at `cutoff`
///
/// # Errors
/// `Value` if `sigma < 0` or either parameter is not finite. The image is
/// only borrowed and never modified.
pub fn preprocess(image: &VolumetricImage, sigma: f64, cutoff: f64) -> PipelineResult<BinaryVolume> {
    preprocess_with(image, &PreprocessParams { sigma, cutoff })
}

/// `preprocess` with a parameter struct
pub fn preprocess_with(image: &VolumetricImage, params: &PreprocessParams) -> PipelineResult<BinaryVolume> {
    params.validate()?;

    let (nx, ny, nz) = image.dims();
    let smoothed = gaussian_smooth_3d(image.data(), nx, ny, nz, params.sigma);
    let mask: Vec<bool> = smoothed.iter().map(|&v| v > params.cutoff).collect();

    let binary = BinaryVolume::new(mask, image.dims())?;
    debug!(
        sigma = params.sigma,
        cutoff = params.cutoff,
        foreground = binary.count_foreground(),
        "preprocessed volume"
    );
    Ok(binary)
}
