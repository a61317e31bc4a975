//! Volume utilities
//!
//! - `gaussian`: separable Gaussian smoothing
//! - `components`: connected-component labelling
//! - `mask`: synthetic phantoms

pub mod components;
pub mod gaussian;
pub mod mask;

pub use components::{count_components, label_components, Connectivity};
pub use gaussian::{convolve_axis, gaussian_kernel_1d, gaussian_smooth_3d, Axis};
pub use mask::{box_image, create_sphere_mask, sphere_image};
