//! Connected-component labelling of binary volumes

use std::collections::VecDeque;

use crate::volume::{idx3d, BinaryVolume};

/// Voxel adjacency used when growing regions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// 6 face neighbours
    #[default]
    Face,
    /// 26 face, edge and corner neighbours
    Full,
}

impl Connectivity {
    fn offsets(self) -> Vec<(isize, isize, isize)> {
        let mut offsets = Vec::with_capacity(26);
        for dz in -1..=1isize {
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let manhattan = dx.abs() + dy.abs() + dz.abs();
                    let keep = match self {
                        Connectivity::Face => manhattan == 1,
                        Connectivity::Full => manhattan > 0,
                    };
                    if keep {
                        offsets.push((dx, dy, dz));
                    }
                }
            }
        }
        offsets
    }
}

/// Label foreground regions
///
/// Returns one label per voxel (0 = background, regions numbered from 1 in
/// scan order) and the number of regions.
pub fn label_components(mask: &BinaryVolume, connectivity: Connectivity) -> (Vec<u32>, usize) {
    let dims = mask.dims();
    let (nx, ny, nz) = dims;
    let data = mask.data();
    let offsets = connectivity.offsets();

    let mut labels = vec![0u32; data.len()];
    let mut n_regions = 0usize;
    let mut queue = VecDeque::new();

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let start = idx3d(x, y, z, dims);
                if !data[start] || labels[start] != 0 {
                    continue;
                }

                n_regions += 1;
                let label = n_regions as u32;
                labels[start] = label;
                queue.push_back((x, y, z));

                while let Some((cx, cy, cz)) = queue.pop_front() {
                    for &(dx, dy, dz) in &offsets {
                        let px = cx as isize + dx;
                        let py = cy as isize + dy;
                        let pz = cz as isize + dz;
                        if px < 0 || py < 0 || pz < 0
                            || px >= nx as isize || py >= ny as isize || pz >= nz as isize
                        {
                            continue;
                        }
                        let (px, py, pz) = (px as usize, py as usize, pz as usize);
                        let n = idx3d(px, py, pz, dims);
                        if data[n] && labels[n] == 0 {
                            labels[n] = label;
                            queue.push_back((px, py, pz));
                        }
                    }
                }
            }
        }
    }

    (labels, n_regions)
}

/// Number of foreground regions
pub fn count_components(mask: &BinaryVolume, connectivity: Connectivity) -> usize {
    label_components(mask, connectivity).1
}
