//! Separable Gaussian smoothing for 3D volumes
//!
//! Kernel radius follows the usual `truncate * sigma` rule with truncate = 4,
//! and edges use replicate (nearest) padding so the output grid never shrinks.

use crate::volume::{idx3d, Dims};

/// Kernel extent in standard deviations
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Volume axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Normalized 1D Gaussian kernel of radius `floor(truncate * sigma + 0.5)`
///
/// Returns `[1.0]` for `sigma == 0`.
pub fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    let radius = (truncate * sigma + 0.5) as usize;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Convolve along one axis with replicate padding
pub fn convolve_axis(data: &[f64], dims: Dims, kernel: &[f64], axis: Axis) -> Vec<f64> {
    let (nx, ny, nz) = dims;
    let radius = (kernel.len() / 2) as isize;
    let (len, stride) = match axis {
        Axis::X => (nx, 1),
        Axis::Y => (ny, nx),
        Axis::Z => (nz, nx * ny),
    };
    let last = len as isize - 1;

    let mut result = vec![0.0f64; data.len()];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let center = idx3d(i, j, k, dims);
                let pos = match axis {
                    Axis::X => i,
                    Axis::Y => j,
                    Axis::Z => k,
                } as isize;
                // index of the first voxel on this line
                let line_start = center - pos as usize * stride;

                let mut sum = 0.0;
                for (ki, &w) in kernel.iter().enumerate() {
                    let p = (pos + ki as isize - radius).clamp(0, last) as usize;
                    sum += data[line_start + p * stride] * w;
                }
                result[center] = sum;
            }
        }
    }
    result
}

/// Isotropic 3D Gaussian smoothing
///
/// # Arguments
/// * `data` - Input volume, x varies fastest
/// * `nx`, `ny`, `nz` - Volume dimensions
/// * `sigma` - Standard deviation in voxels; `0` returns a copy
pub fn gaussian_smooth_3d(data: &[f64], nx: usize, ny: usize, nz: usize, sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return data.to_vec();
    }

    let dims = (nx, ny, nz);
    let kernel = gaussian_kernel_1d(sigma, DEFAULT_TRUNCATE);
    let smoothed_x = convolve_axis(data, dims, &kernel, Axis::X);
    let smoothed_xy = convolve_axis(&smoothed_x, dims, &kernel, Axis::Y);
    convolve_axis(&smoothed_xy, dims, &kernel, Axis::Z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel_1d(1.3, DEFAULT_TRUNCATE);
        let sum: f64 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        let n = kernel.len();
        for i in 0..n / 2 {
            assert_eq!(kernel[i], kernel[n - 1 - i]);
        }
    }

    #[test]
    fn test_kernel_radius_for_half_sigma() {
        // floor(4 * 0.5 + 0.5) = 2
        let kernel = gaussian_kernel_1d(0.5, DEFAULT_TRUNCATE);
        assert_eq!(kernel.len(), 5);
        let expected_center = 1.0 / (1.0 + 2.0 * (-2.0f64).exp() + 2.0 * (-8.0f64).exp());
        assert!((kernel[2] - expected_center).abs() < 1e-12);
    }

    #[test]
    fn test_constant_volume_unchanged() {
        let data = vec![0.25; 6 * 5 * 4];
        let out = gaussian_smooth_3d(&data, 6, 5, 4, 1.5);
        assert_eq!(out.len(), data.len());
        for v in out {
            assert!((v - 0.25).abs() < 1e-12, "Replicate padding should preserve constants");
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let data: Vec<f64> = (0..27).map(|i| i as f64).collect();
        assert_eq!(gaussian_smooth_3d(&data, 3, 3, 3, 0.0), data);
    }

    #[test]
    fn test_impulse_mass_preserved_in_interior() {
        let n = 11;
        let mut data = vec![0.0; n * n * n];
        data[idx3d(5, 5, 5, (n, n, n))] = 1.0;
        let out = gaussian_smooth_3d(&data, n, n, n, 1.0);
        let total: f64 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "Interior impulse should keep unit mass, got {}", total);
        assert!(out[idx3d(5, 5, 5, (n, n, n))] > out[idx3d(6, 5, 5, (n, n, n))]);
    }

    #[test]
    fn test_axis_convolution_only_touches_its_axis() {
        let dims = (4, 4, 4);
        let mut data = vec![0.0; 64];
        data[idx3d(1, 2, 3, dims)] = 1.0;
        let kernel = gaussian_kernel_1d(1.0, DEFAULT_TRUNCATE);
        let out = convolve_axis(&data, dims, &kernel, Axis::Y);
        for k in 0..4 {
            for j in 0..4 {
                for i in 0..4 {
                    let v = out[idx3d(i, j, k, dims)];
                    if i != 1 || k != 3 {
                        assert_eq!(v, 0.0);
                    } else {
                        assert!(v > 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_voxel_axis() {
        // an axis of length 1 clamps every tap onto the same voxel
        let data = vec![0.0, 1.0, 0.0, 0.0];
        let out = gaussian_smooth_3d(&data, 4, 1, 1, 0.5);
        assert_eq!(out.len(), 4);
        assert!(out[1] < 1.0 && out[0] > 0.0);
    }
}
