//! Voxel grid value types
//!
//! Both grids are flattened in NIfTI (Fortran) order so that x varies fastest:
//! index = x + y*nx + z*nx*ny.

use crate::error::{PipelineError, PipelineResult};

/// Grid dimensions (nx, ny, nz)
pub type Dims = (usize, usize, usize);

/// Flat index of voxel (x, y, z) in a grid of the given dimensions
#[inline(always)]
pub fn idx3d(x: usize, y: usize, z: usize, dims: Dims) -> usize {
    x + y * dims.0 + z * dims.0 * dims.1
}

/// Validated voxel count for `dims`
fn voxel_count(dims: Dims) -> PipelineResult<usize> {
    let (nx, ny, nz) = dims;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(PipelineError::Format(format!(
            "Volume dimensions must be at least 1 per axis, got {}x{}x{}",
            nx, ny, nz
        )));
    }
    nx.checked_mul(ny)
        .and_then(|n| n.checked_mul(nz))
        .ok_or_else(|| {
            PipelineError::Format(format!("Volume dimensions {}x{}x{} overflow the voxel count", nx, ny, nz))
        })
}

fn check_dims(dims: Dims, len: usize) -> PipelineResult<()> {
    let count = voxel_count(dims)?;
    if count != len {
        return Err(PipelineError::Format(format!(
            "Voxel count {} does not match dimensions {}x{}x{}",
            len, dims.0, dims.1, dims.2
        )));
    }
    Ok(())
}

/// Immutable 3D grid of floating-point intensities (a probability map)
#[derive(Clone, Debug, PartialEq)]
pub struct VolumetricImage {
    data: Vec<f64>,
    dims: Dims,
}

impl VolumetricImage {
    /// Wrap flattened voxel data, validating it against `dims`
    pub fn new(data: Vec<f64>, dims: Dims) -> PipelineResult<Self> {
        check_dims(dims, data.len())?;
        Ok(Self { data, dims })
    }

    /// All-zero image
    pub fn zeros(dims: Dims) -> PipelineResult<Self> {
        Self::new(vec![0.0; voxel_count(dims)?], dims)
    }

    /// Build an image by evaluating `f(x, y, z)` at every voxel
    pub fn from_fn<F>(dims: Dims, mut f: F) -> PipelineResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(voxel_count(dims)?);
        let (nx, ny, nz) = dims;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(data, dims)
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at voxel (x, y, z)
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f64 {
        self.data[idx3d(x, y, z, self.dims)]
    }

    /// Minimum and maximum intensity
    pub fn value_range(&self) -> (f64, f64) {
        let min = self.data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
}

/// Immutable 3D boolean grid marking voxels inside a structure
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryVolume {
    data: Vec<bool>,
    dims: Dims,
}

impl BinaryVolume {
    pub fn new(data: Vec<bool>, dims: Dims) -> PipelineResult<Self> {
        check_dims(dims, data.len())?;
        Ok(Self { data, dims })
    }

    /// Build a mask by evaluating `f(x, y, z)` at every voxel
    pub fn from_fn<F>(dims: Dims, mut f: F) -> PipelineResult<Self>
    where
        F: FnMut(usize, usize, usize) -> bool,
    {
        let mut data = Vec::with_capacity(voxel_count(dims)?);
        let (nx, ny, nz) = dims;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(data, dims)
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.data[idx3d(x, y, z, self.dims)]
    }

    /// Number of `true` voxels
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Mask as 0.0/1.0 floats in flat order (for NIfTI export)
    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect()
    }
}
