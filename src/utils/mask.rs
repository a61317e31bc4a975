//! Synthetic phantoms
//!
//! Geometric probability maps and masks for tests, benchmarks and demos.

use crate::error::PipelineResult;
use crate::volume::{BinaryVolume, Dims, VolumetricImage};

/// Create a binary sphere mask
///
/// Voxels within `radius` of `center` (voxel coordinates) are `true`.
pub fn create_sphere_mask(dims: Dims, center: [f64; 3], radius: f64) -> PipelineResult<BinaryVolume> {
    let r2 = radius * radius;
    BinaryVolume::from_fn(dims, |x, y, z| {
        let dx = x as f64 - center[0];
        let dy = y as f64 - center[1];
        let dz = z as f64 - center[2];
        dx * dx + dy * dy + dz * dz <= r2
    })
}

/// Sphere probability map: 1.0 inside `radius`, 0.0 outside
pub fn sphere_image(dims: Dims, center: [f64; 3], radius: f64) -> PipelineResult<VolumetricImage> {
    let mask = create_sphere_mask(dims, center, radius)?;
    VolumetricImage::new(mask.to_f64(), dims)
}

/// Axis-aligned box probability map: `value` for voxels in `[min, max)`
pub fn box_image(dims: Dims, min: [usize; 3], max: [usize; 3], value: f64) -> PipelineResult<VolumetricImage> {
    VolumetricImage::from_fn(dims, |x, y, z| {
        let inside = (min[0]..max[0]).contains(&x)
            && (min[1]..max[1]).contains(&y)
            && (min[2]..max[2]).contains(&z);
        if inside { value } else { 0.0 }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_mask_basic() {
        let mask = create_sphere_mask((10, 10, 10), [5.0, 5.0, 5.0], 3.0).unwrap();
        assert_eq!(mask.len(), 1000);
        assert!(mask.get(5, 5, 5));
        assert!(!mask.get(0, 0, 0));

        let count = mask.count_foreground();
        assert!(count > 50 && count < 200, "Sphere voxel count {} seems wrong", count);
    }

    #[test]
    fn test_sphere_zero_radius() {
        let mask = create_sphere_mask((5, 5, 5), [2.0, 2.0, 2.0], 0.0).unwrap();
        assert_eq!(mask.count_foreground(), 1);
    }

    #[test]
    fn test_box_image_extent() {
        let image = box_image((6, 6, 6), [1, 2, 3], [3, 4, 5], 0.9).unwrap();
        let inside = image.data().iter().filter(|&&v| v > 0.0).count();
        assert_eq!(inside, 2 * 2 * 2);
        assert_eq!(image.get(1, 2, 3), 0.9);
        assert_eq!(image.get(3, 2, 3), 0.0);
    }
}
