//! End-to-end tests for load → preprocess → extract

mod common;

use brainmesh_core::surface::{marching_cubes, save_stl, StlFormat};
use brainmesh_core::utils::{box_image, count_components, sphere_image, Connectivity};
use brainmesh_core::{
    extract, load, load_and_preprocess, preprocess, BinaryVolume, PipelineError, PreprocessParams,
    VolumetricImage,
};

use common::{edge_count, is_balanced, is_two_manifold, noise_mask, within_grid, write_fixture};

fn center_impulse() -> VolumetricImage {
    VolumetricImage::from_fn((5, 5, 5), |x, y, z| {
        if (x, y, z) == (2, 2, 2) { 1.0 } else { 0.0 }
    })
    .unwrap()
}

#[test]
fn test_all_zero_volume() {
    let image = VolumetricImage::zeros((5, 5, 5)).unwrap();
    let mask = preprocess(&image, 0.5, 0.5).unwrap();
    assert_eq!(mask.count_foreground(), 0);
    let mesh = extract(&mask, 0.0).unwrap();
    assert_eq!(mesh.num_faces(), 0, "All-zero input must give an empty surface");
}

#[test]
fn test_single_voxel_smoothed_away() {
    let mask = preprocess(&center_impulse(), 0.5, 0.5).unwrap();
    assert_eq!(mask.count_foreground(), 0);
    assert!(extract(&mask, 0.0).unwrap().is_empty());
}

#[test]
fn test_single_voxel_unsmoothed_is_closed() {
    let mask = preprocess(&center_impulse(), 0.0, 0.5).unwrap();
    assert_eq!(mask.count_foreground(), 1);

    let surface = marching_cubes(&mask, 0.0).unwrap();
    assert_eq!(surface.num_faces(), 8);
    assert!(is_two_manifold(&surface), "Isolated voxel surface should be closed");
    let euler = surface.num_vertices() as i64 - edge_count(&surface) as i64 + surface.num_faces() as i64;
    assert_eq!(euler, 2, "Closed surface should be a topological sphere");

    let mesh = extract(&mask, 0.0).unwrap();
    assert_eq!(mesh.num_faces(), surface.num_faces());
    // octahedron with unit half-diagonal, wound outward
    assert!((mesh.signed_volume() - 4.0 / 3.0).abs() < 1e-6, "volume {}", mesh.signed_volume());
}

#[test]
fn test_nonexistent_path() {
    let result = load("/tmp/brainmesh_definitely_missing_structure_R.nii");
    assert!(matches!(result, Err(PipelineError::NotFound { .. })));
}

#[test]
fn test_negative_sigma() {
    let image = center_impulse();
    let snapshot = image.clone();
    let result = preprocess(&image, -1.0, 0.5);
    assert!(matches!(result, Err(PipelineError::Value(_))));
    assert_eq!(image, snapshot, "Input must be left untouched");
}

#[test]
fn test_shape_invariant_across_sigmas() {
    let image = VolumetricImage::from_fn((11, 6, 8), |x, y, z| ((x + 2 * y + 3 * z) % 5) as f64 / 4.0).unwrap();
    for sigma in [0.0, 0.25, 0.5, 1.0, 3.0] {
        let mask = preprocess(&image, sigma, 0.5).unwrap();
        assert_eq!(mask.dims(), image.dims(), "sigma {}", sigma);
    }
}

#[test]
fn test_smoothing_never_adds_regions() {
    // two 4x4x4 blobs plus three isolated noise voxels
    let mut image = box_image((16, 16, 16), [2, 2, 2], [6, 6, 6], 1.0).unwrap().into_data();
    let blob_b = box_image((16, 16, 16), [9, 9, 9], [13, 13, 13], 1.0).unwrap();
    for (v, &b) in image.iter_mut().zip(blob_b.data()) {
        *v += b;
    }
    for &(x, y, z) in &[(14usize, 14usize, 14usize), (1, 14, 1), (14, 1, 8)] {
        image[x + y * 16 + z * 256] = 1.0;
    }
    let image = VolumetricImage::new(image, (16, 16, 16)).unwrap();

    let counts: Vec<usize> = [0.0, 0.5, 1.0]
        .iter()
        .map(|&sigma| count_components(&preprocess(&image, sigma, 0.5).unwrap(), Connectivity::Face))
        .collect();

    assert_eq!(counts[0], 5, "Unsmoothed: two blobs and three noise voxels");
    assert_eq!(counts[1], 2, "Noise should be smoothed away");
    for w in counts.windows(2) {
        assert!(w[1] <= w[0], "Region count grew with sigma: {:?}", counts);
    }
}

#[test]
fn test_vertices_within_grid_for_noisy_masks() {
    for seed in 1..6u64 {
        let dims = (10, 8, 6);
        let mask = noise_mask(dims, seed, 0.4, false);
        let mesh = extract(&mask, 0.0).unwrap();
        assert!(!mesh.is_empty());
        assert!(within_grid(&mesh, dims), "Seed {} produced an out-of-grid vertex", seed);
    }
}

#[test]
fn test_interior_noise_surfaces_are_watertight() {
    for seed in 11..16u64 {
        let mask = noise_mask((9, 9, 9), seed, 0.5, true);
        for level in [0.0, 0.5] {
            let surface = marching_cubes(&mask, level).unwrap();
            assert!(is_balanced(&surface), "Seed {} level {} left a crack", seed, level);
        }
    }
}

#[test]
fn test_extract_deterministic_on_noise() {
    let mask = noise_mask((12, 10, 9), 99, 0.45, false);
    let a = extract(&mask, 0.0).unwrap();
    let b = extract(&mask, 0.0).unwrap();
    assert_eq!(a.num_faces(), b.num_faces());
    assert_eq!(a, b);
}

#[test]
fn test_full_mask_has_no_surface() {
    let mask = BinaryVolume::from_fn((4, 4, 4), |_, _, _| true).unwrap();
    assert!(extract(&mask, 0.0).unwrap().is_empty());
}

#[test]
fn test_one_voxel_thick_mask_is_dimension_error() {
    let image = VolumetricImage::new(vec![1.0; 16], (4, 4, 1)).unwrap();
    let mask = preprocess(&image, 0.5, 0.5).unwrap();
    assert!(matches!(extract(&mask, 0.0), Err(PipelineError::Dimension(_))));
}

#[test]
fn test_sphere_file_to_stl() {
    let dims = (16, 16, 16);
    let image = sphere_image(dims, [8.0, 7.5, 8.0], 4.0).unwrap();
    let path = write_fixture("brainmesh_it_sphere.nii.gz", &image);

    let mask = load_and_preprocess(&path, &PreprocessParams::default()).unwrap();
    assert_eq!(mask.dims(), dims);
    let foreground = mask.count_foreground();

    let surface = marching_cubes(&mask, 0.5).unwrap();
    assert!(is_balanced(&surface));
    let mesh = surface.to_mesh();
    assert!(within_grid(&mesh, dims));
    let volume = mesh.signed_volume();
    assert!(
        volume > 0.5 * foreground as f64 && volume < 1.5 * foreground as f64,
        "Enclosed volume {} far from voxel count {}",
        volume, foreground
    );

    let stl_path = std::env::temp_dir().join("brainmesh_it_sphere.stl");
    save_stl(&stl_path, &mesh, StlFormat::Binary).unwrap();
    let size = std::fs::metadata(&stl_path).unwrap().len() as usize;
    assert_eq!(size, 84 + 50 * mesh.num_faces());

    std::fs::remove_file(&path).ok();
    std::fs::remove_file(&stl_path).ok();
}

#[test]
fn test_repeated_pipeline_runs_identical() {
    let image = sphere_image((14, 12, 10), [6.0, 6.0, 5.0], 3.5).unwrap();
    let path = write_fixture("brainmesh_it_repeat.nii", &image);

    let run = || {
        let mask = load_and_preprocess(&path, &PreprocessParams::default()).unwrap();
        extract(&mask, 0.0).unwrap()
    };
    assert_eq!(run(), run());

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_failed_load_stops_pipeline() {
    let result = load_and_preprocess("/tmp/brainmesh_it_missing.nii", &PreprocessParams::default());
    assert!(matches!(result, Err(PipelineError::NotFound { .. })));
}

#[test]
fn test_mask_shared_across_threads() {
    let mask = std::sync::Arc::new(noise_mask((10, 10, 10), 7, 0.5, false));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mask = std::sync::Arc::clone(&mask);
            std::thread::spawn(move || extract(&mask, 0.0).unwrap())
        })
        .collect();
    let meshes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(meshes.windows(2).all(|w| w[0] == w[1]));
}
